//! Periodic pruning of readings older than the configured maximum age.

use std::sync::Arc;
use std::time::Duration;

use aquawatch_core::monitor::Monitor;
use chrono::Utc;
use tokio_util::sync::CancellationToken;

/// How often the cleanup job runs.
pub const CLEANUP_INTERVAL: Duration = Duration::from_secs(3600); // 1 hour

/// Run the retention loop until `cancel` is triggered.
///
/// Each pass removes readings older than the monitor's retention age; with
/// no age bound configured a pass removes nothing.
pub async fn run(monitor: Arc<Monitor>, interval: Duration, cancel: CancellationToken) {
    tracing::info!(
        interval_secs = interval.as_secs(),
        "Reading retention job started"
    );

    let mut ticker = tokio::time::interval(interval);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Reading retention job stopping");
                break;
            }
            _ = ticker.tick() => {
                let pruned = monitor.enforce_retention(Utc::now());
                if pruned > 0 {
                    tracing::info!(pruned, "Reading retention: pruned old readings");
                } else {
                    tracing::debug!("Reading retention: nothing to prune");
                }
            }
        }
    }
}
