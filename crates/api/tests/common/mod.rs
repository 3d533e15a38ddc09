use std::sync::Arc;

use aquawatch_api::config::{LogFormat, ServerConfig};
use aquawatch_api::router::build_app_router;
use aquawatch_api::state::AppState;
use aquawatch_api::ws::WsManager;
use aquawatch_core::alert::SequentialIdGenerator;
use aquawatch_core::monitor::{Monitor, MonitorConfig, Seed};
use aquawatch_core::quality::simulator::ScriptedSource;
use aquawatch_core::station::{Coords, Station};
use aquawatch_events::EventBus;
use axum::body::Body;
use axum::http::{Method, Request};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["*".to_string()],
        request_timeout_secs: 30,
        tick_interval_secs: 8,
        heartbeat_interval_secs: 30,
        caution_margin: 0.1,
        seed_stations_path: "data/stations.json".into(),
        seed_alerts_path: "data/alerts.json".into(),
        retention_max_readings: 0,
        retention_hours: 0,
        retention_max_alerts: 0,
        log_format: LogFormat::Pretty,
    }
}

/// Three stations, no alerts.
pub fn test_seed() -> Seed {
    Seed {
        stations: ["st-1", "st-2", "st-3"]
            .iter()
            .map(|id| Station::new(*id, format!("Station {id}"), Coords { lat: 23.2, lng: 77.4 }))
            .collect(),
        alerts: Vec::new(),
    }
}

/// Build application state around a monitor fed by `source`.
pub fn test_state(seed: Seed, source: ScriptedSource) -> AppState {
    let config = test_config();
    let monitor = Monitor::new(
        MonitorConfig::default(),
        seed,
        Box::new(source),
        Arc::new(SequentialIdGenerator::new()),
    )
    .expect("test seed must be valid");

    AppState {
        monitor: Arc::new(monitor),
        config: Arc::new(config),
        ws_manager: Arc::new(WsManager::new()),
        event_bus: Arc::new(EventBus::default()),
    }
}

/// Build the full application router with all middleware layers.
///
/// Uses the same builder as `main.rs` so integration tests exercise the
/// production middleware stack.
pub fn build_test_app(state: AppState) -> Router {
    let config = test_config();
    build_app_router(state, &config)
}

pub async fn get(app: Router, uri: &str) -> Response {
    send(app, Method::GET, uri).await
}

pub async fn post(app: Router, uri: &str) -> Response {
    send(app, Method::POST, uri).await
}

async fn send(app: Router, method: Method, uri: &str) -> Response {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
