//! Atelier Storefront Binary
//!
//! Serves the storefront REST API and runs the idle-session janitor.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use atelier_experience::{
    api::{self, AppState},
    config::StorefrontConfig,
    StorefrontOrchestrator, STOREFRONT_VERSION,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    info!("Starting Atelier Storefront v{}", STOREFRONT_VERSION);

    // Load configuration
    let config = StorefrontConfig::load()?;
    info!("Loaded configuration: {:?}", config);

    let storefront = Arc::new(StorefrontOrchestrator::in_memory(&config));
    info!(
        "Session config: max_age={}s, sweep_interval={}s, max_sessions={}",
        config.sessions.max_age_secs,
        config.sessions.sweep_interval_secs,
        config.sessions.max_sessions
    );

    // Start background sweeper
    let janitor = Arc::new(storefront.janitor(config.sessions.sweep_interval()));
    let sweeper = janitor.clone().start();

    let app = api::router(AppState::new(storefront, &config));

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Storefront API listening on {}", addr);

    let shutdown = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "Failed to listen for shutdown signal");
        }
        info!("Received shutdown signal");
    };

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown)
    .await?;

    sweeper.abort();
    if let Some(report) = janitor.last_sweep() {
        info!(removed = report.removed.len(), "Last sweep at {}", report.swept_at);
    }

    info!("Shutting down storefront");
    Ok(())
}
