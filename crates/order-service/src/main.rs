//! Order Service
//!
//! Demo order-processing HTTP service instrumented with Prometheus metrics.
//!
//! # Startup Flow
//!
//! 1. Initialize tracing
//! 2. Load configuration from environment
//! 3. Build the Prometheus recorder and register every metric into it
//! 4. Build application state
//! 5. Serve HTTP until SIGINT/SIGTERM, then drain

use order_service::config::Config;
use order_service::observability::metrics::{build_recorder, spawn_upkeep};
use order_service::observability::OrderMetrics;
use order_service::routes::{self, AppState};
use order_service::services::RandomDependency;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "order_service=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Order Service");

    // Load configuration
    let config = Config::from_env().map_err(|e| {
        error!("Failed to load configuration: {}", e);
        e
    })?;

    info!(
        bind_address = %config.bind_address,
        inventory_mode = %config.inventory_mode,
        dependency_failure_rate = config.dependency_failure_rate,
        drain_seconds = config.drain_seconds,
        "Configuration loaded successfully"
    );

    let recorder = build_recorder().map_err(|e| {
        error!(error = %e, "Failed to build Prometheus metrics recorder");
        e
    })?;
    let metrics_handle = recorder.handle();
    let _upkeep = spawn_upkeep(metrics_handle.clone());
    let metrics = OrderMetrics::register_with(Arc::new(recorder));
    info!("Prometheus metrics recorder initialized");

    let bind_address = config.bind_address;
    let drain_seconds = config.drain_seconds;
    let dependency = Arc::new(RandomDependency::new(config.dependency_failure_rate));

    let state = Arc::new(AppState::new(config, metrics, dependency));
    info!(inventory = state.inventory.get(), "Inventory initialized");

    let app = routes::build_routes(state, metrics_handle);

    let listener = tokio::net::TcpListener::bind(bind_address)
        .await
        .map_err(|e| {
            error!("Failed to bind {}: {}", bind_address, e);
            e
        })?;

    info!("Order Service listening on {}", bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(drain_seconds))
        .await?;

    info!("Order Service shutdown complete");

    Ok(())
}

/// Listens for shutdown signals (SIGTERM, SIGINT).
/// Returns when a shutdown signal is received and the drain period is complete.
async fn shutdown_signal(drain_seconds: u64) {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => info!("Received SIGINT, starting graceful shutdown..."),
            Err(e) => error!("Failed to listen for SIGINT: {}", e),
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received SIGTERM, starting graceful shutdown...");
            }
            Err(e) => {
                error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }

    if drain_seconds > 0 {
        warn!("Draining connections for {} seconds...", drain_seconds);
        tokio::time::sleep(Duration::from_secs(drain_seconds)).await;
        info!("Drain period complete");
    }
}
