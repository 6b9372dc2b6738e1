//! Fulfillment coordinator node binary

use coordinator::{Config, Coordinator};
use std::error::Error;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    tracing::info!("Starting QuickBite fulfillment node");

    // Load configuration
    let config = Config::from_env()?;
    tracing::info!(service = %config.service_name, "configuration loaded");

    // Wire the fulfillment core
    let coordinator = Coordinator::new(config);

    // One synthetic order through the full lifecycle before serving
    coordinator.startup_self_check().await?;
    tracing::info!("fulfillment core ready");

    tokio::signal::ctrl_c().await?;

    tracing::info!("Shutting down fulfillment node");
    Ok(())
}
