//! Shared range-checking helpers for tunable parameters.

use crate::error::CoreError;

/// Validate that a margin falls within `[0.0, 1.0)`.
///
/// Returns a `CoreError::Validation` naming the parameter if out of range.
pub fn validate_margin(value: f64, name: &str) -> Result<(), CoreError> {
    if !(0.0..1.0).contains(&value) {
        return Err(CoreError::Validation(format!(
            "{name} must be at least 0.0 and below 1.0, got {value}"
        )));
    }
    Ok(())
}
