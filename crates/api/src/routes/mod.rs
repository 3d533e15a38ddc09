pub mod alerts;
pub mod health;
pub mod kpis;
pub mod readings;
pub mod stations;

use axum::routing::get;
use axum::Router;

use crate::state::AppState;
use crate::ws;

/// Build the `/api` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /kpis                        dashboard headline numbers
///
/// /stations                    list
/// /stations/{id}               station + latest reading
///
/// /readings                    history (?stationId, from, to, limit)
///
/// /alerts                      list (?stationId, status=open|resolved)
/// /alerts/{id}/resolve         mark resolved (POST)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/kpis", kpis::router())
        .nest("/stations", stations::router())
        .nest("/readings", readings::router())
        .nest("/alerts", alerts::router())
}

/// The live event stream, mounted at the root.
pub fn ws_routes() -> Router<AppState> {
    Router::new().route("/ws", get(ws::ws_handler))
}
