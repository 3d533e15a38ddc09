//! Periodic driver for the simulation tick.
//!
//! Every `period` the monitor advances all stations by one reading and each
//! resulting event is published, in order, to the sink.

use std::sync::Arc;
use std::time::Duration;

use aquawatch_core::monitor::Monitor;
use aquawatch_core::monitor_event::EventSink;
use chrono::Utc;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

/// Run the tick loop until `cancel` is triggered.
///
/// The first tick happens one full period after start. Cancellation is
/// observed between ticks, never in the middle of one.
pub async fn run(
    monitor: Arc<Monitor>,
    sink: Arc<dyn EventSink>,
    period: Duration,
    cancel: CancellationToken,
) {
    tracing::info!(period_secs = period.as_secs(), "Simulation loop started");

    let mut interval = tokio::time::interval_at(Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Simulation loop stopping");
                break;
            }
            _ = interval.tick() => {
                let events = monitor.tick(Utc::now());
                let published = events.len();
                for event in events {
                    sink.publish(event);
                }
                tracing::debug!(published, "Tick events published");
            }
        }
    }
}
