use aquawatch_core::metrics::Reading;
use axum::extract::State;
use axum::Json;

use crate::error::AppResult;
use crate::query::{ApiQuery, ReadingsParams};
use crate::state::AppState;

/// GET /api/readings?stationId=&from=&to=&limit=
///
/// Readings inside the inclusive window, oldest first, at most `limit`
/// (default 200) of the newest. `stationId` is required. Malformed
/// parameters are a JSON `BAD_REQUEST`.
pub async fn list_readings(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<ReadingsParams>,
) -> AppResult<Json<Vec<Reading>>> {
    let query = params.to_query()?;
    let readings = state
        .monitor
        .query_readings(params.station_id.as_deref(), query)?;
    Ok(Json(readings))
}
