use std::sync::Arc;

use anyhow::{Context, Result};
use statusreg::{
    AppConfig, AppState, RetentionSweeper, StatusStore, config::DEFAULT_LOG_FILTER,
    shutdown::shutdown_signal, web::app::build_router_with_limit,
};
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let config = AppConfig::from_env().context("failed to load application configuration")?;

    let store = Arc::new(StatusStore::new());
    let sweeper = RetentionSweeper::spawn(store.clone(), config.retention.clone());

    let app = build_router_with_limit(AppState::new(store), config.max_body_bytes);

    let addr = config.address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind to {addr}"))?;

    info!(
        address = %addr,
        max_age_hours = config.retention.max_age.num_hours(),
        sweep_interval_secs = config.retention.sweep_interval.as_secs(),
        "status registry started"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            shutdown_signal().await;
        })
        .await
        .context("server error")?;

    sweeper
        .stop()
        .await
        .context("retention sweeper did not shut down cleanly")?;
    info!("status registry stopped");

    Ok(())
}

/// `RUST_LOG` wins when set; otherwise the registry and its request traces log at info.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();
}
