//! # FleenFeen Server
//!
//! Entry point: tracing, configuration, then the HTTP server with its
//! PostgreSQL pool and Redis handle.

use anyhow::Result;
use tracing::info;

use fleenfeen::config::Settings;
use fleenfeen::startup::Application;

#[tokio::main]
async fn main() -> Result<()> {
    fleenfeen::telemetry::init_tracing();

    info!("Starting FleenFeen server...");

    let settings = Settings::load()?;
    info!(
        host = %settings.server.host,
        port = %settings.server.port,
        environment = %settings.environment,
        "Configuration loaded"
    );

    let application = Application::build(settings).await?;

    info!(addr = %application.local_addr()?, "Server ready to accept connections");
    application.run_until_stopped().await?;

    Ok(())
}
