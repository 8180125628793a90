use std::io;

use anyhow::Context;

use gatehouse::configuration::get_config;
use gatehouse::startup::Application;
use gatehouse::telemetry::{get_subscriber, init_subscriber};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    let subscriber = get_subscriber("gatehouse".into(), "info".into(), io::stdout);
    init_subscriber(subscriber)?;

    // Retrieve settings
    let config = get_config().context("Failed to load configuration")?;

    // Prepare and run the application
    let application = Application::build(config).await?;
    tracing::info!("Listening on port {}", application.port());
    application.run_until_stopped().await?;

    Ok(())
}
