//! Bridge from the event bus to connected WebSocket clients.

use std::sync::Arc;

use aquawatch_events::{encode_frame, MonitorEvent};
use axum::extract::ws::Message;
use tokio::sync::broadcast;

use crate::ws::WsManager;

/// Serializes each bus event into one text frame and broadcasts it to every
/// open connection.
pub struct EventForwarder {
    ws_manager: Arc<WsManager>,
}

impl EventForwarder {
    pub fn new(ws_manager: Arc<WsManager>) -> Self {
        Self { ws_manager }
    }

    /// Run until the bus is closed (every `EventBus` handle dropped).
    pub async fn run(self, mut receiver: broadcast::Receiver<MonitorEvent>) {
        loop {
            match receiver.recv().await {
                Ok(event) => self.forward(&event).await,
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(skipped = n, "Event forwarder lagged");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("Event bus closed, forwarder shutting down");
                    break;
                }
            }
        }
    }

    async fn forward(&self, event: &MonitorEvent) {
        let frame = match encode_frame(event) {
            Ok(frame) => frame,
            Err(e) => {
                tracing::error!(error = %e, event = event.name(), "Failed to encode event");
                return;
            }
        };
        let delivered = self.ws_manager.broadcast(Message::Text(frame.into())).await;
        tracing::trace!(
            event = event.name(),
            station_id = %event.station_id(),
            delivered,
            "Event forwarded"
        );
    }
}
