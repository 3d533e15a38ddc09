//! Water-quality measurement types.

use serde::{Deserialize, Serialize};

use crate::types::Timestamp;

/// One sample of the five monitored water-quality metrics.
///
/// The shape is fixed: every reading carries all five values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricVector {
    #[serde(rename = "pH")]
    pub ph: f64,
    pub turbidity: f64,
    pub tds: f64,
    pub temp: f64,
    #[serde(alias = "do")]
    pub dissolved_oxygen: f64,
}

/// A timestamped [`MetricVector`] for one station.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    #[serde(alias = "ts")]
    pub timestamp: Timestamp,
    pub metrics: MetricVector,
}

impl Reading {
    pub fn new(timestamp: Timestamp, metrics: MetricVector) -> Self {
        Self { timestamp, metrics }
    }
}

/// Safety classification of a reading, ordered by severity.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    #[default]
    Safe,
    Caution,
    Unsafe,
}

impl Status {
    pub fn as_str(self) -> &'static str {
        match self {
            Status::Safe => "safe",
            Status::Caution => "caution",
            Status::Unsafe => "unsafe",
        }
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metric_vector_uses_wire_names() {
        let m = MetricVector {
            ph: 7.2,
            turbidity: 3.2,
            tds: 210.0,
            temp: 28.0,
            dissolved_oxygen: 6.1,
        };
        let json = serde_json::to_value(m).unwrap();
        assert_eq!(json["pH"], 7.2);
        assert_eq!(json["dissolvedOxygen"], 6.1);
        assert!(json.get("ph").is_none());
    }

    #[test]
    fn legacy_keys_are_accepted() {
        let reading: Reading = serde_json::from_value(serde_json::json!({
            "ts": "2025-01-01T00:00:00Z",
            "metrics": {"pH": 7.0, "turbidity": 1.0, "tds": 100, "temp": 20, "do": 6.5}
        }))
        .unwrap();
        assert_eq!(reading.metrics.dissolved_oxygen, 6.5);
        assert_eq!(reading.timestamp.to_rfc3339(), "2025-01-01T00:00:00+00:00");
    }

    #[test]
    fn status_orders_by_severity() {
        assert!(Status::Safe < Status::Caution);
        assert!(Status::Caution < Status::Unsafe);
        assert_eq!(Status::Unsafe.to_string(), "unsafe");
    }
}
