//! Keep-alive pings for live-stream subscribers.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::ws::manager::WsManager;

/// Ping every subscriber once per `period` until `cancel` fires.
///
/// Each round also prunes connections whose socket task has already gone,
/// so a stalled client never keeps receiving tick events.
pub async fn run(ws_manager: Arc<WsManager>, period: Duration, cancel: CancellationToken) {
    tracing::info!(period_secs = period.as_secs(), "WebSocket heartbeat started");

    let mut interval = tokio::time::interval_at(Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("WebSocket heartbeat stopping");
                break;
            }
            _ = interval.tick() => {
                let report = ws_manager.ping_all().await;
                if report.pruned > 0 {
                    tracing::info!(pruned = report.pruned, "Dropped closed live-stream subscribers");
                }
                tracing::debug!(
                    subscribers = report.reached,
                    oldest_secs = ?report.oldest_secs,
                    "WebSocket heartbeat ping"
                );
            }
        }
    }
}
