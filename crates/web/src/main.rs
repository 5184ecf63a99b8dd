//! PhD Tracker web service
//!
//! Loads configuration, sets up logging and metrics, connects to the
//! database (creating the schema when configured) and serves the router
//! until Ctrl+C or SIGTERM.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use phdtrack_common::{
    config::{AppConfig, ObservabilityConfig},
    db::DbPool,
    metrics,
};
use phdtrack_web::{create_router, metrics_router, AppState};
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Load configuration
    let config = AppConfig::load().context("failed to load configuration")?;

    // Initialize tracing
    init_tracing(&config.observability);

    info!(
        service = %config.observability.service_name,
        "Starting PhD Tracker web service v{}",
        phdtrack_common::VERSION
    );

    let config = Arc::new(config);

    // Initialize metrics
    let metrics_handle = if config.observability.metrics_enabled {
        Some(init_metrics()?)
    } else {
        None
    };

    // Initialize database connection
    let db = DbPool::new(&config.database).await?;

    // Create app state
    let mut state = AppState::new(config.clone(), db);
    if let Some(handle) = metrics_handle.clone() {
        state = state.with_metrics(handle);
    }

    // Dedicated metrics listener
    if let (Some(handle), port) = (metrics_handle, config.observability.metrics_port) {
        if port != 0 {
            let addr: SocketAddr = format!("{}:{}", config.server.host, port)
                .parse()
                .context("invalid metrics address")?;
            let listener = tokio::net::TcpListener::bind(addr).await?;
            info!("Metrics listening on {}", addr);
            tokio::spawn(async move {
                if let Err(e) = axum::serve(listener, metrics_router(handle)).await {
                    warn!(error = %e, "Metrics listener stopped");
                }
            });
        }
    }

    // Build the router
    let app = create_router(state);

    // Start the server
    let addr: SocketAddr = config
        .bind_address()
        .parse()
        .context("invalid server address")?;
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(config.shutdown_timeout()))
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

fn init_tracing(config: &ObservabilityConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let registry = tracing_subscriber::registry().with(filter);

    if config.json_logging {
        registry.with(fmt::layer().json().with_target(true)).init();
    } else {
        registry.with(fmt::layer().with_target(true)).init();
    }
}

/// Install the Prometheus recorder and keep its histograms drained
fn init_metrics() -> anyhow::Result<PrometheusHandle> {
    let handle = PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Suffix("duration_seconds".to_string()),
            metrics::LATENCY_BUCKETS,
        )?
        .install_recorder()
        .context("failed to install Prometheus recorder")?;

    metrics::register_metrics();

    let upkeep = handle.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(5));
        loop {
            interval.tick().await;
            upkeep.run_upkeep();
        }
    });

    Ok(handle)
}

/// Graceful shutdown signal handler
async fn shutdown_signal(grace: Duration) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, starting shutdown..."),
        _ = terminate => info!("Received SIGTERM, starting shutdown..."),
    }

    // Bound the drain: in-flight requests get `grace` before the process exits
    tokio::spawn(async move {
        tokio::time::sleep(grace).await;
        warn!("Shutdown grace period elapsed, exiting");
        std::process::exit(0);
    });
}
