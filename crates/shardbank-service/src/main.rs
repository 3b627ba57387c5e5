//! Shardbank Service - HTTP API for the sharded banking dashboard
//!
//! This is the main entry point for the shardbank service.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use shardbank_service::{create_router, AppState, ServiceConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,shardbank=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Shardbank Service");

    // Load configuration from environment
    let config = ServiceConfig::from_env();

    tracing::info!(
        listen_addr = %config.listen_addr(),
        db_host = %config.database.host,
        db_port = config.database.port,
        service_name = %config.database.service_name,
        context = %config.database.context,
        cross_shard_policy = %config.cross_shard_policy,
        "Service configuration loaded"
    );

    // Build app state; pools connect on first use
    let state = AppState::connect(config.clone());

    // Create the router
    let app = create_router(state.clone());
    tracing::info!("Router configured with all API endpoints");

    // Start HTTP server
    tracing::info!(listen_addr = %config.listen_addr(), "Starting HTTP server");
    let listener = tokio::net::TcpListener::bind(config.listen_addr()).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    state.shutdown().await;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
