//! visit_counter - Visit Counter Service
//!
//! Counts visits per day, month, year and region, tracks distinct visitors,
//! and keeps everything in a single JSON snapshot on disk.

use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use visit_counter::api::{self, AppState};
use visit_counter::{Config, RegionResolver, VisitEngine, VisitStore};

/// Initialize tracing/logging
fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "visit_counter=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing
    init_tracing();

    // Load configuration
    let config = Config::from_env()?;
    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;

    tracing::info!(
        environment = %config.environment,
        visits_file = %config.visits_file.display(),
        "Starting visit counter"
    );

    // Load the snapshot once; the engine owns it from here on
    let engine = Arc::new(VisitEngine::open(VisitStore::new(&config.visits_file)).await?);
    let regions = Arc::new(RegionResolver::new(config.geo_lookup.clone()));

    if !config.geo_lookup.enabled {
        tracing::info!("Region lookup disabled, non-local visits count as Unknown");
    }

    let state = AppState::new(engine.clone(), regions)
        .with_trust_forwarded_for(config.trust_forwarded_for);
    let app = api::build_app(state);

    tracing::info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    // Cleanup
    tracing::info!("Server shutting down...");
    if let Err(e) = engine.flush().await {
        tracing::error!(error = %e, "Final snapshot save failed");
    }
    tracing::info!("Visit snapshot flushed. Goodbye!");

    Ok(())
}

/// Shutdown signal handler for graceful shutdown
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
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
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown...");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown...");
        },
    }
}
