//! Handlers for station endpoints.

use aquawatch_core::monitor::StationDetail;
use aquawatch_core::station::Station;
use axum::extract::{Path, State};
use axum::Json;

use crate::error::AppResult;
use crate::state::AppState;

/// GET /api/stations
///
/// All stations in seed order with their current status.
pub async fn list_stations(State(state): State<AppState>) -> Json<Vec<Station>> {
    Json(state.monitor.list_stations())
}

/// GET /api/stations/{id}
///
/// The station record with its most recent reading under `latest`.
pub async fn get_station(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<StationDetail>> {
    let detail = state.monitor.station_detail(&id)?;
    Ok(Json(detail))
}
