//! Canonical metric and event names.
//!
//! Metric names appear in alert records and match the JSON field names of
//! [`MetricVector`](crate::metrics::MetricVector). Event names are the
//! discriminators pushed to live subscribers.

/// Acidity / alkalinity (dimensionless).
pub const METRIC_PH: &str = "pH";

/// Turbidity in NTU.
pub const METRIC_TURBIDITY: &str = "turbidity";

/// Total dissolved solids in mg/L.
pub const METRIC_TDS: &str = "tds";

/// Water temperature in degrees Celsius.
pub const METRIC_TEMP: &str = "temp";

/// Dissolved oxygen in mg/L.
pub const METRIC_DISSOLVED_OXYGEN: &str = "dissolvedOxygen";

/// Event name for a new station reading.
pub const EVENT_READING: &str = "reading";

/// Event name for a newly raised alert.
pub const EVENT_ALERT: &str = "alert";
