use aquawatch_core::monitor::Kpis;
use axum::extract::State;
use axum::Json;
use chrono::Utc;

use crate::state::AppState;

/// GET /api/kpis
pub async fn get_kpis(State(state): State<AppState>) -> Json<Kpis> {
    Json(state.monitor.compute_kpis(Utc::now()))
}
