use std::io;

use madmimi_optin::configuration::Settings;
use madmimi_optin::startup::Application;
use madmimi_optin::telemetry::{get_subscriber, init_subscriber};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    let subscriber = get_subscriber("madmimi-optin".into(), "info".into(), io::stdout);
    init_subscriber(subscriber);

    // Retrieve settings
    let config = Settings::get_config()?;

    // Serve until stopped
    Application::build(config).await?.run_until_stopped().await?;

    Ok(())
}
