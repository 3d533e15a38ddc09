use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use aquawatch_core::alert::RandomIdGenerator;
use aquawatch_core::monitor::Monitor;
use aquawatch_core::monitor_event::EventSink;
use aquawatch_core::quality::simulator::MetricSimulator;
use aquawatch_events::EventBus;
use chrono::Utc;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use aquawatch_api::background;
use aquawatch_api::config::{LogFormat, ServerConfig};
use aquawatch_api::router::build_app_router;
use aquawatch_api::seed::load_seed;
use aquawatch_api::state::AppState;
use aquawatch_api::ws;

/// Age of the reading each station is primed with at startup.
const PRIME_OFFSET_MINUTES: i64 = 10;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // --- Configuration ---
    let config = ServerConfig::from_env().context("Failed to load server configuration")?;

    // --- Tracing ---
    init_tracing(config.log_format);
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Monitor ---
    let seed = load_seed(&config.seed_stations_path, &config.seed_alerts_path)
        .context("Failed to load seed data")?;
    let monitor = Arc::new(
        Monitor::new(
            config.monitor_config(),
            seed,
            Box::new(MetricSimulator::new(StdRng::from_os_rng())),
            Arc::new(RandomIdGenerator),
        )
        .context("Failed to initialise monitor")?,
    );
    let primed = monitor.prime(Utc::now() - chrono::Duration::minutes(PRIME_OFFSET_MINUTES));
    tracing::info!(stations = monitor.station_count(), primed, "Monitor ready");

    // --- WebSocket manager ---
    let ws_manager = Arc::new(ws::WsManager::new());

    // --- Event bus ---
    let event_bus = Arc::new(EventBus::default());
    let forwarder = ws::EventForwarder::new(Arc::clone(&ws_manager));
    let forwarder_handle = tokio::spawn(forwarder.run(event_bus.subscribe()));

    // --- Background jobs ---
    let cancel = CancellationToken::new();
    let sink: Arc<dyn EventSink> = event_bus.clone();
    let simulation_handle = tokio::spawn(background::simulation::run(
        Arc::clone(&monitor),
        sink,
        Duration::from_secs(config.tick_interval_secs),
        cancel.clone(),
    ));
    let retention_handle = tokio::spawn(background::retention::run(
        Arc::clone(&monitor),
        background::retention::CLEANUP_INTERVAL,
        cancel.clone(),
    ));
    let heartbeat_handle = tokio::spawn(ws::heartbeat::run(
        Arc::clone(&ws_manager),
        Duration::from_secs(config.heartbeat_interval_secs),
        cancel.clone(),
    ));
    tracing::info!("Background services started (simulation, retention, heartbeat, event forwarder)");

    // --- App state ---
    let state = AppState {
        monitor,
        config: Arc::new(config.clone()),
        ws_manager: Arc::clone(&ws_manager),
        event_bus: Arc::clone(&event_bus),
    };
    let app = build_app_router(state, &config);

    // --- Start server ---
    let host = config
        .host
        .parse()
        .with_context(|| format!("Invalid HOST address {:?}", config.host))?;
    let addr = SocketAddr::new(host, config.port);
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {addr}"))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, cleaning up");

    cancel.cancel();
    let _ = tokio::time::timeout(Duration::from_secs(5), simulation_handle).await;
    let _ = tokio::time::timeout(Duration::from_secs(5), retention_handle).await;
    let _ = tokio::time::timeout(Duration::from_secs(5), heartbeat_handle).await;
    tracing::info!("Background jobs stopped");

    // Dropping the last bus handle closes the channel and ends the forwarder.
    drop(event_bus);
    let _ = tokio::time::timeout(Duration::from_secs(5), forwarder_handle).await;

    let ws_count = ws_manager.connection_count().await;
    tracing::info!(ws_count, "Closing remaining WebSocket connections");
    ws_manager.shutdown_all().await;

    tracing::info!("Graceful shutdown complete");
    Ok(())
}

fn init_tracing(format: LogFormat) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "aquawatch_api=debug,aquawatch_core=info,tower_http=debug".into());
    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).init(),
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json())
            .init(),
    }
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl-C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
