//! Route definitions for station endpoints.

use axum::routing::get;
use axum::Router;

use crate::handlers::stations;
use crate::state::AppState;

/// Routes mounted at `/stations`.
///
/// ```text
/// GET /        -> list_stations
/// GET /{id}    -> get_station
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(stations::list_stations))
        .route("/{id}", get(stations::get_station))
}
