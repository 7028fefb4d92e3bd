//! Bufete site server binary.

use anyhow::Context;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use bufete_server::metrics::init_metrics;
use bufete_server::{AppState, Settings, run_server};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let settings = Settings::load().context("failed to load settings")?;
    let addr = settings.bind_addr()?;

    tracing::info!(
        "Starting Bufete server v{}",
        env!("CARGO_PKG_VERSION")
    );
    tracing::info!("Cache mode: {}", settings.cache_mode());

    let prometheus_handle = init_metrics().context("failed to install metrics recorder")?;
    let state = AppState::from_settings(&settings)?;

    run_server(addr, state, prometheus_handle).await?;

    Ok(())
}
