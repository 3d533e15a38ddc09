/// Stations are keyed by their seed-file identifier (e.g. `"st-01"`).
pub type StationId = String;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
