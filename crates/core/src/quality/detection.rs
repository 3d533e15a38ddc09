//! Alert detection for hard threshold breaches.
//!
//! Detection is stateless: a metric that stays out of range on consecutive
//! ticks yields a fresh alert every time. There is no cooldown.

use std::sync::Arc;

use crate::alert::{Alert, IdGenerator};
use crate::metrics::MetricVector;
use crate::quality::thresholds::{MetricRule, RULES};
use crate::types::Timestamp;

/// Builds [`Alert`] records for every metric outside its hard band.
#[derive(Clone)]
pub struct AlertGenerator {
    ids: Arc<dyn IdGenerator>,
}

impl AlertGenerator {
    pub fn new(ids: Arc<dyn IdGenerator>) -> Self {
        Self { ids }
    }

    /// Id source used for new alerts, also used to reissue colliding ids.
    pub fn ids(&self) -> &dyn IdGenerator {
        self.ids.as_ref()
    }

    /// Inspect `m` and return one alert per breached metric, ordered
    /// turbidity, tds, temp, pH, dissolved oxygen.
    pub fn detect(&self, station_id: &str, m: &MetricVector, now: Timestamp) -> Vec<Alert> {
        RULES
            .iter()
            .filter_map(|rule| {
                let value = rule.value(m);
                rule.is_violated(value)
                    .then(|| self.build_alert(station_id, rule, value, now))
            })
            .collect()
    }

    fn build_alert(&self, station_id: &str, rule: &MetricRule, value: f64, now: Timestamp) -> Alert {
        Alert {
            id: self.ids.next_id(),
            station_id: station_id.to_string(),
            metric: rule.metric.to_string(),
            value,
            threshold: rule.threshold(),
            message: format!("{} threshold breach", rule.metric),
            level: rule.level,
            timestamp: now,
            resolved: false,
        }
    }
}

impl std::fmt::Debug for AlertGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AlertGenerator").finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
