//! Water-quality domain logic.
//!
//! Metric simulation, threshold classification and breach detection. All
//! logic in this module is pure (no shared state); randomness and alert ids
//! are injected by the caller.

pub mod detection;
pub mod simulator;
pub mod thresholds;
