use aquawatch_core::simulation::LoopState;
use axum::extract::State;
use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::state::AppState;

/// Health check response payload.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    /// Overall service status.
    pub status: &'static str,
    /// Crate version from Cargo.toml.
    pub version: &'static str,
    /// Number of monitored stations.
    pub stations: usize,
    /// `ticking` while a simulation tick is in progress, else `idle`.
    pub loop_state: LoopState,
    pub tick_interval_secs: u64,
    /// Open WebSocket connections.
    pub ws_connections: usize,
}

/// GET /health -- returns service status.
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        stations: state.monitor.station_count(),
        loop_state: state.monitor.loop_state(),
        tick_interval_secs: state.config.tick_interval_secs,
        ws_connections: state.ws_manager.connection_count().await,
    })
}

/// Mount health check routes (root level, NOT under `/api`).
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
