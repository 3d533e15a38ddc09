//! Threshold-breach alert records and alert id generation.

use std::sync::atomic::{AtomicU64, Ordering};

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::types::{StationId, Timestamp};

/// Prefix shared by every generated alert id.
pub const ALERT_ID_PREFIX: &str = "al-";

/// Number of random characters following [`ALERT_ID_PREFIX`].
pub const ALERT_ID_SUFFIX_LENGTH: usize = 8;

const ALERT_ID_CHARSET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// Severity of a threshold breach.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertLevel {
    /// tds, temp and pH breaches.
    Medium,
    /// turbidity and dissolved-oxygen breaches.
    High,
}

/// The limit an alert was raised against.
///
/// Single-sided limits are numbers; pH carries its acceptable band as text
/// (`"6.5-8.5"`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ThresholdValue {
    Limit(f64),
    Range(String),
}

impl std::fmt::Display for ThresholdValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ThresholdValue::Limit(v) => write!(f, "{v}"),
            ThresholdValue::Range(r) => f.write_str(r),
        }
    }
}

/// A single metric's threshold breach at one station.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Alert {
    pub id: String,
    pub station_id: StationId,
    /// Canonical metric name (see [`crate::metric_names`]).
    pub metric: String,
    pub value: f64,
    pub threshold: ThresholdValue,
    pub message: String,
    pub level: AlertLevel,
    #[serde(alias = "ts")]
    pub timestamp: Timestamp,
    #[serde(default)]
    pub resolved: bool,
}

/// Source of unique alert identifiers.
pub trait IdGenerator: Send + Sync {
    fn next_id(&self) -> String;
}

/// Generates `al-` followed by eight random lowercase alphanumerics.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomIdGenerator;

impl IdGenerator for RandomIdGenerator {
    fn next_id(&self) -> String {
        let mut rng = rand::rng();
        let suffix: String = (0..ALERT_ID_SUFFIX_LENGTH)
            .map(|_| char::from(ALERT_ID_CHARSET[rng.random_range(0..ALERT_ID_CHARSET.len())]))
            .collect();
        format!("{ALERT_ID_PREFIX}{suffix}")
    }
}

/// Deterministic ids (`al-00000001`, `al-00000002`, ...) for tests and replays.
#[derive(Debug, Default)]
pub struct SequentialIdGenerator {
    counter: AtomicU64,
}

impl SequentialIdGenerator {
    pub fn new() -> Self {
        Self::default()
    }
}

impl IdGenerator for SequentialIdGenerator {
    fn next_id(&self) -> String {
        let n = self.counter.fetch_add(1, Ordering::Relaxed) + 1;
        format!("{ALERT_ID_PREFIX}{n:0width$}", width = ALERT_ID_SUFFIX_LENGTH)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn random_ids_have_expected_shape() {
        let id = RandomIdGenerator.next_id();
        assert!(id.starts_with(ALERT_ID_PREFIX));
        let suffix = &id[ALERT_ID_PREFIX.len()..];
        assert_eq!(suffix.len(), ALERT_ID_SUFFIX_LENGTH);
        assert!(suffix
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()));
    }

    #[test]
    fn random_ids_do_not_repeat_in_practice() {
        let ids: HashSet<String> = (0..500).map(|_| RandomIdGenerator.next_id()).collect();
        assert_eq!(ids.len(), 500);
    }

    #[test]
    fn sequential_ids_count_up() {
        let gen = SequentialIdGenerator::new();
        assert_eq!(gen.next_id(), "al-00000001");
        assert_eq!(gen.next_id(), "al-00000002");
    }

    #[test]
    fn threshold_serializes_as_number_or_text() {
        assert_eq!(
            serde_json::to_value(ThresholdValue::Limit(6.0)).unwrap(),
            serde_json::json!(6.0)
        );
        assert_eq!(
            serde_json::to_value(ThresholdValue::Range("6.5-8.5".into())).unwrap(),
            serde_json::json!("6.5-8.5")
        );
    }

    #[test]
    fn seed_alert_accepts_legacy_timestamp_key() {
        let alert: Alert = serde_json::from_value(serde_json::json!({
            "id": "al-seed0001",
            "stationId": "st-01",
            "metric": "turbidity",
            "value": 7.1,
            "threshold": 6,
            "message": "turbidity threshold breach",
            "level": "high",
            "ts": "2025-01-01T00:00:00Z"
        }))
        .unwrap();
        assert!(!alert.resolved);
        assert_eq!(alert.threshold, ThresholdValue::Limit(6.0));
        assert_eq!(alert.level, AlertLevel::High);
    }
}
