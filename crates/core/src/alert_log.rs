//! Alert history with unique ids and an optional size cap.

use std::collections::{HashSet, VecDeque};
use std::sync::{PoisonError, RwLock};

use serde::Deserialize;

use crate::alert::{Alert, IdGenerator};
use crate::error::CoreError;
use crate::types::Timestamp;

/// Number of alerts returned by [`AlertLog::list`] when no limit is given.
pub const DEFAULT_ALERT_LIST_LIMIT: usize = 200;

/// Resolution-state filter for alert listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertStatusFilter {
    /// `resolved == false`
    Open,
    Resolved,
}

impl AlertStatusFilter {
    fn matches(self, alert: &Alert) -> bool {
        match self {
            AlertStatusFilter::Open => !alert.resolved,
            AlertStatusFilter::Resolved => alert.resolved,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AlertFilter {
    pub station_id: Option<String>,
    pub status: Option<AlertStatusFilter>,
}

impl AlertFilter {
    fn matches(&self, alert: &Alert) -> bool {
        self.station_id
            .as_deref()
            .map_or(true, |id| alert.station_id == id)
            && self.status.map_or(true, |s| s.matches(alert))
    }
}

/// Attempts at drawing a fresh id before an append is abandoned.
pub const MAX_ID_ATTEMPTS: usize = 8;

#[derive(Debug, Default)]
struct Entries {
    alerts: VecDeque<Alert>,
    ids: HashSet<String>,
}

impl Entries {
    fn push(&mut self, alert: Alert, max_alerts: Option<usize>) {
        self.ids.insert(alert.id.clone());
        self.alerts.push_back(alert);
        if let Some(max) = max_alerts {
            while self.alerts.len() > max {
                if let Some(evicted) = self.alerts.pop_front() {
                    self.ids.remove(&evicted.id);
                }
            }
        }
    }
}

/// Alerts in the order they were raised (seed alerts first).
///
/// Ids are unique within the log. With `max_alerts` set, the oldest entries
/// are evicted once the cap is exceeded.
#[derive(Debug, Default)]
pub struct AlertLog {
    entries: RwLock<Entries>,
    max_alerts: Option<usize>,
}

impl AlertLog {
    /// Fails with `CoreError::Validation` if two seed alerts share an id.
    pub fn new(
        seed: impl IntoIterator<Item = Alert>,
        max_alerts: Option<usize>,
    ) -> Result<Self, CoreError> {
        let mut entries = Entries::default();
        for alert in seed {
            if entries.ids.contains(&alert.id) {
                return Err(CoreError::Validation(format!(
                    "duplicate alert id {}",
                    alert.id
                )));
            }
            entries.push(alert, max_alerts);
        }
        Ok(Self {
            entries: RwLock::new(entries),
            max_alerts,
        })
    }

    /// Append newly raised alerts and return them as stored.
    ///
    /// An id already present in the log (or earlier in the batch) is
    /// replaced with one drawn from `ids`. If no free id turns up within
    /// [`MAX_ID_ATTEMPTS`] draws the whole batch is rejected with
    /// `CoreError::Internal` and the log is left unchanged.
    pub fn append(
        &self,
        alerts: Vec<Alert>,
        ids: &dyn IdGenerator,
    ) -> Result<Vec<Alert>, CoreError> {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);

        let mut taken = HashSet::new();
        let mut stored = Vec::with_capacity(alerts.len());
        for mut alert in alerts {
            let mut attempts = 0;
            while entries.ids.contains(&alert.id) || taken.contains(&alert.id) {
                if attempts == MAX_ID_ATTEMPTS {
                    return Err(CoreError::Internal(format!(
                        "no free alert id after {MAX_ID_ATTEMPTS} attempts"
                    )));
                }
                let reissued = ids.next_id();
                tracing::warn!(
                    alert_id = %alert.id,
                    reissued = %reissued,
                    "Alert id already in use, reissuing"
                );
                alert.id = reissued;
                attempts += 1;
            }
            taken.insert(alert.id.clone());
            stored.push(alert);
        }

        for alert in &stored {
            entries.push(alert.clone(), self.max_alerts);
        }
        Ok(stored)
    }

    /// The newest `limit` alerts matching `filter`, oldest first.
    pub fn list(&self, filter: &AlertFilter, limit: usize) -> Vec<Alert> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        let mut matched: Vec<Alert> = entries
            .alerts
            .iter()
            .rev()
            .filter(|a| filter.matches(a))
            .take(limit)
            .cloned()
            .collect();
        matched.reverse();
        matched
    }

    /// Mark an alert resolved and return its updated record.
    ///
    /// Resolving an already-resolved alert is a no-op.
    pub fn resolve(&self, id: &str) -> Result<Alert, CoreError> {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let alert = entries
            .alerts
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or_else(|| CoreError::NotFound {
                entity: "Alert",
                id: id.to_string(),
            })?;
        alert.resolved = true;
        Ok(alert.clone())
    }

    /// Alerts raised strictly after `cutoff`.
    pub fn count_since(&self, cutoff: Timestamp) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .alerts
            .iter()
            .filter(|a| a.timestamp > cutoff)
            .count()
    }

    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .alerts
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use chrono::{Duration, Utc};

    use super::*;
    use crate::alert::{AlertLevel, SequentialIdGenerator, ThresholdValue};

    struct FixedId(&'static str);

    impl IdGenerator for FixedId {
        fn next_id(&self) -> String {
            self.0.to_string()
        }
    }

    fn alert(id: &str, station: &str, resolved: bool, ts: Timestamp) -> Alert {
        Alert {
            id: id.to_string(),
            station_id: station.to_string(),
            metric: "turbidity".to_string(),
            value: 7.0,
            threshold: ThresholdValue::Limit(6.0),
            message: "turbidity threshold breach".to_string(),
            level: AlertLevel::High,
            timestamp: ts,
            resolved,
        }
    }

    fn seeded() -> AlertLog {
        let now = Utc::now();
        AlertLog::new(
            [
                alert("a1", "st-1", false, now),
                alert("a2", "st-2", true, now),
                alert("a3", "st-1", true, now),
                alert("a4", "st-2", false, now),
            ],
            None,
        )
        .unwrap()
    }

    fn ids(alerts: &[Alert]) -> Vec<&str> {
        alerts.iter().map(|a| a.id.as_str()).collect()
    }

    #[test]
    fn filters_by_station_and_status() {
        let log = seeded();
        let open = log.list(
            &AlertFilter {
                station_id: None,
                status: Some(AlertStatusFilter::Open),
            },
            DEFAULT_ALERT_LIST_LIMIT,
        );
        assert_eq!(ids(&open), vec!["a1", "a4"]);

        let st1_resolved = log.list(
            &AlertFilter {
                station_id: Some("st-1".into()),
                status: Some(AlertStatusFilter::Resolved),
            },
            DEFAULT_ALERT_LIST_LIMIT,
        );
        assert_eq!(ids(&st1_resolved), vec!["a3"]);
    }

    #[test]
    fn list_returns_newest_entries_in_order() {
        let log = seeded();
        let last_two = log.list(&AlertFilter::default(), 2);
        assert_eq!(ids(&last_two), vec!["a3", "a4"]);
    }

    #[test]
    fn resolve_moves_alert_between_filters() {
        let log = seeded();
        let resolved = log.resolve("a1").unwrap();
        assert!(resolved.resolved);

        let open = log.list(
            &AlertFilter {
                station_id: Some("st-1".into()),
                status: Some(AlertStatusFilter::Open),
            },
            DEFAULT_ALERT_LIST_LIMIT,
        );
        assert!(open.is_empty());
    }

    #[test]
    fn resolve_unknown_alert_is_not_found() {
        assert_matches!(
            seeded().resolve("missing"),
            Err(CoreError::NotFound { entity: "Alert", .. })
        );
    }

    #[test]
    fn count_since_uses_window() {
        let now = Utc::now();
        let log = AlertLog::new(
            [
                alert("old", "st-1", false, now - Duration::hours(30)),
                alert("new", "st-1", false, now - Duration::hours(1)),
            ],
            None,
        )
        .unwrap();
        log.append(vec![alert("fresh", "st-2", false, now)], &FixedId("unused"))
            .unwrap();
        assert_eq!(log.count_since(now - Duration::hours(24)), 2);
        assert_eq!(log.len(), 3);
    }

    #[test]
    fn status_filter_parses_from_query_strings() {
        let open: AlertStatusFilter = serde_json::from_str("\"open\"").unwrap();
        assert_eq!(open, AlertStatusFilter::Open);
        assert!(serde_json::from_str::<AlertStatusFilter>("\"pending\"").is_err());
    }

    #[test]
    fn cap_evicts_oldest_alerts() {
        let now = Utc::now();
        let log = AlertLog::new([alert("a1", "st-1", false, now)], Some(3)).unwrap();
        log.append(
            vec![
                alert("a2", "st-1", false, now),
                alert("a3", "st-2", false, now),
                alert("a4", "st-2", false, now),
            ],
            &FixedId("unused"),
        )
        .unwrap();

        assert_eq!(log.len(), 3);
        let all = log.list(&AlertFilter::default(), DEFAULT_ALERT_LIST_LIMIT);
        assert_eq!(ids(&all), vec!["a2", "a3", "a4"]);
        assert_matches!(log.resolve("a1"), Err(CoreError::NotFound { .. }));
    }

    #[test]
    fn seed_larger_than_cap_keeps_newest() {
        let now = Utc::now();
        let log = AlertLog::new(
            [
                alert("a1", "st-1", false, now),
                alert("a2", "st-1", false, now),
                alert("a3", "st-1", false, now),
            ],
            Some(2),
        )
        .unwrap();
        let all = log.list(&AlertFilter::default(), DEFAULT_ALERT_LIST_LIMIT);
        assert_eq!(ids(&all), vec!["a2", "a3"]);
    }

    #[test]
    fn duplicate_seed_ids_are_rejected() {
        let now = Utc::now();
        assert_matches!(
            AlertLog::new(
                [alert("a1", "st-1", false, now), alert("a1", "st-2", true, now)],
                None,
            ),
            Err(CoreError::Validation(_))
        );
    }

    #[test]
    fn colliding_id_is_reissued() {
        let now = Utc::now();
        let log = AlertLog::new([alert("al-00000001", "st-1", false, now)], None).unwrap();
        let gen = SequentialIdGenerator::new();

        let stored = log
            .append(vec![alert("al-00000001", "st-2", false, now)], &gen)
            .unwrap();
        assert_eq!(stored[0].id, "al-00000002");

        // Resolving the seed id touches only the seed alert.
        let resolved = log.resolve("al-00000001").unwrap();
        assert_eq!(resolved.station_id, "st-1");
        assert_eq!(log.resolve("al-00000002").unwrap().station_id, "st-2");
    }

    #[test]
    fn ids_within_one_batch_are_made_distinct() {
        let log = AlertLog::default();
        let gen = SequentialIdGenerator::new();
        let now = Utc::now();
        let stored = log
            .append(
                vec![alert("dup", "st-1", false, now), alert("dup", "st-1", false, now)],
                &gen,
            )
            .unwrap();
        assert_eq!(ids(&stored), vec!["dup", "al-00000001"]);
    }

    #[test]
    fn exhausted_id_source_rejects_batch() {
        let now = Utc::now();
        let log = AlertLog::new([alert("a1", "st-1", false, now)], None).unwrap();
        let result = log.append(
            vec![alert("a2", "st-1", false, now), alert("a1", "st-1", false, now)],
            &FixedId("a1"),
        );
        assert_matches!(result, Err(CoreError::Internal(_)));
        assert_eq!(log.len(), 1);
    }
}
