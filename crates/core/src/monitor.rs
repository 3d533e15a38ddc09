//! The monitoring core as seen by the service layer.
//!
//! [`Monitor`] wires the registry, reading store, alert log and tick engine
//! together from seed data and exposes the read operations the HTTP layer
//! needs.

use std::sync::Arc;

use chrono::Duration;
use serde::Serialize;

use crate::alert::{Alert, IdGenerator};
use crate::alert_log::{AlertFilter, AlertLog, DEFAULT_ALERT_LIST_LIMIT};
use crate::error::CoreError;
use crate::metrics::Reading;
use crate::monitor_event::MonitorEvent;
use crate::quality::detection::AlertGenerator;
use crate::quality::simulator::MetricSource;
use crate::quality::thresholds::{ThresholdEvaluator, DEFAULT_CAUTION_MARGIN};
use crate::registry::StationRegistry;
use crate::simulation::{LoopState, SimulationLoop};
use crate::station::Station;
use crate::timeseries::{ReadingQuery, RetentionPolicy, TimeSeriesStore};
use crate::types::Timestamp;

/// Window used for the "alerts today" KPI.
pub const KPI_ALERT_WINDOW_HOURS: i64 = 24;

/// Uptime figure shown on the dashboard. Not measured.
pub const UPTIME_DISPLAY: &str = "99.2%";

/// Tunables for a [`Monitor`].
#[derive(Debug, Clone, Copy)]
pub struct MonitorConfig {
    pub caution_margin: f64,
    pub retention: RetentionPolicy,
    /// Alerts kept in memory; the oldest are evicted beyond this.
    pub max_alerts: Option<usize>,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            caution_margin: DEFAULT_CAUTION_MARGIN,
            retention: RetentionPolicy::unbounded(),
            max_alerts: None,
        }
    }
}

/// Initial stations and alerts.
#[derive(Debug, Clone, Default)]
pub struct Seed {
    pub stations: Vec<Station>,
    pub alerts: Vec<Alert>,
}

/// Dashboard headline numbers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Kpis {
    pub active_stations: usize,
    pub alerts_in_window: usize,
    pub uptime: String,
}

/// A station together with its most recent reading.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StationDetail {
    #[serde(flatten)]
    pub station: Station,
    pub latest: Option<Reading>,
}

pub struct Monitor {
    registry: Arc<StationRegistry>,
    store: Arc<TimeSeriesStore>,
    alerts: Arc<AlertLog>,
    simulation: SimulationLoop,
}

impl Monitor {
    /// Build the core from seed data.
    ///
    /// Fails with `CoreError::Validation` on duplicate station or alert ids
    /// or an out-of-range caution margin.
    pub fn new(
        config: MonitorConfig,
        seed: Seed,
        source: Box<dyn MetricSource>,
        ids: Arc<dyn IdGenerator>,
    ) -> Result<Self, CoreError> {
        let evaluator = ThresholdEvaluator::new(config.caution_margin)?;
        let registry = Arc::new(StationRegistry::new(seed.stations)?);
        let store = Arc::new(TimeSeriesStore::new(registry.ids(), config.retention));
        let alerts = Arc::new(AlertLog::new(seed.alerts, config.max_alerts)?);
        let simulation = SimulationLoop::new(
            Arc::clone(&registry),
            Arc::clone(&store),
            Arc::clone(&alerts),
            evaluator,
            AlertGenerator::new(ids),
            source,
        );
        Ok(Self {
            registry,
            store,
            alerts,
            simulation,
        })
    }

    pub fn list_stations(&self) -> Vec<Station> {
        self.registry.list()
    }

    pub fn get_station(&self, id: &str) -> Result<Station, CoreError> {
        self.registry.get(id).ok_or_else(|| CoreError::NotFound {
            entity: "Station",
            id: id.to_string(),
        })
    }

    /// Station record plus its latest reading.
    pub fn station_detail(&self, id: &str) -> Result<StationDetail, CoreError> {
        let station = self.get_station(id)?;
        let latest = self.store.latest(id);
        Ok(StationDetail { station, latest })
    }

    /// Range query over a station's history. `station_id` is required.
    pub fn query_readings(
        &self,
        station_id: Option<&str>,
        query: ReadingQuery,
    ) -> Result<Vec<Reading>, CoreError> {
        let station_id = station_id
            .filter(|id| !id.is_empty())
            .ok_or_else(|| CoreError::BadRequest("stationId required".to_string()))?;
        Ok(self.store.query(station_id, query))
    }

    /// The newest alerts matching `filter`, oldest first.
    pub fn list_alerts(&self, filter: &AlertFilter) -> Vec<Alert> {
        self.alerts.list(filter, DEFAULT_ALERT_LIST_LIMIT)
    }

    pub fn resolve_alert(&self, id: &str) -> Result<Alert, CoreError> {
        let alert = self.alerts.resolve(id)?;
        tracing::info!(alert_id = %id, station_id = %alert.station_id, "Alert resolved");
        Ok(alert)
    }

    pub fn compute_kpis(&self, now: Timestamp) -> Kpis {
        let cutoff = now - Duration::hours(KPI_ALERT_WINDOW_HOURS);
        Kpis {
            active_stations: self.registry.len(),
            alerts_in_window: self.alerts.count_since(cutoff),
            uptime: UPTIME_DISPLAY.to_string(),
        }
    }

    /// See [`SimulationLoop::prime`].
    pub fn prime(&self, at: Timestamp) -> usize {
        self.simulation.prime(at)
    }

    /// See [`SimulationLoop::tick`].
    pub fn tick(&self, now: Timestamp) -> Vec<MonitorEvent> {
        self.simulation.tick(now)
    }

    /// Whether a tick is running right now.
    pub fn loop_state(&self) -> LoopState {
        self.simulation.state()
    }

    /// Apply the age bound of the retention policy relative to `now`.
    /// Returns the number of readings removed.
    pub fn enforce_retention(&self, now: Timestamp) -> usize {
        match self.store.policy().max_age {
            Some(max_age) => self.store.prune_older_than(now - max_age),
            None => 0,
        }
    }

    pub fn station_count(&self) -> usize {
        self.registry.len()
    }
}

impl std::fmt::Debug for Monitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Monitor")
            .field("stations", &self.registry.len())
            .field("alerts", &self.alerts.len())
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
