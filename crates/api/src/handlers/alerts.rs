//! Handlers for alert endpoints.

use aquawatch_core::alert::Alert;
use axum::extract::{Path, State};
use axum::Json;

use crate::error::AppResult;
use crate::query::{ApiQuery, AlertsParams};
use crate::state::AppState;

/// GET /api/alerts?stationId=&status=open|resolved
///
/// The newest 200 matching alerts, oldest first.
pub async fn list_alerts(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<AlertsParams>,
) -> Json<Vec<Alert>> {
    Json(state.monitor.list_alerts(&params.into()))
}

/// POST /api/alerts/{id}/resolve
pub async fn resolve_alert(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<Alert>> {
    let alert = state.monitor.resolve_alert(&id)?;
    Ok(Json(alert))
}
