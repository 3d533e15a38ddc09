use axum::routing::get;
use axum::Router;

use crate::handlers::kpis;
use crate::state::AppState;

/// Routes mounted at `/kpis`.
pub fn router() -> Router<AppState> {
    Router::new().route("/", get(kpis::get_kpis))
}
