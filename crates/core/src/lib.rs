//! AquaWatch monitoring core.
//!
//! Domain types and logic for a fleet of water-quality stations:
//!
//! - [`quality`]: metric simulation, threshold classification and breach detection.
//! - [`timeseries`]: per-station reading history with retention.
//! - [`registry`]: station records and their current status.
//! - [`alert_log`]: alert history with open/resolved filtering.
//! - [`simulation`]: the per-tick engine tying the above together.
//! - [`monitor`]: the facade used by the service layer.
//!
//! Nothing in this crate performs I/O or reads the clock; timestamps,
//! randomness and alert ids are supplied by the caller.

pub mod alert;
pub mod alert_log;
pub mod error;
pub mod metric_names;
pub mod metrics;
pub mod monitor;
pub mod monitor_event;
pub mod quality;
pub mod registry;
pub mod simulation;
pub mod station;
pub mod threshold_validation;
pub mod timeseries;
pub mod types;
