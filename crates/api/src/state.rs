use std::sync::Arc;

use aquawatch_core::monitor::Monitor;
use aquawatch_events::EventBus;

use crate::config::ServerConfig;
use crate::ws::WsManager;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable: every field is behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// Stations, readings, alerts and the tick engine.
    pub monitor: Arc<Monitor>,
    pub config: Arc<ServerConfig>,
    /// WebSocket connection manager (browser clients).
    pub ws_manager: Arc<WsManager>,
    /// Fan-out of tick events to live subscribers.
    pub event_bus: Arc<EventBus>,
}
