// Utility to remove every value the add-on persisted

use std::io;

use madmimi_optin::configuration::Settings;
use madmimi_optin::startup::uninstall;
use madmimi_optin::telemetry::{get_subscriber, init_subscriber};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let subscriber = get_subscriber("madmimi-uninstall".into(), "info".into(), io::stdout);
    init_subscriber(subscriber);

    let config = Settings::get_config()?;
    if let Err(e) = uninstall(&config.settings_store).await {
        tracing::error!(error.cause_chain = ?e, error.message = %e, "Uninstall failed");
        return Err(e);
    }
    tracing::info!("Removed the add-on settings and license status");

    Ok(())
}
