mod api_doc;
mod auth;
mod error;
mod handlers;
mod services;
mod setup;
mod state;
mod telemetry;
mod utils;

use docvault_core::Config;
use docvault_notify::{EmailService, ExpiryNotifier};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    telemetry::init_telemetry();

    // Load configuration
    let config = Config::from_env()?;

    // Initialize the application (database, storage, routes)
    let (state, router) = setup::initialize_app(config).await?;

    // Start the daily expiry notification job if configured
    if let Some(email) = EmailService::from_config(&state.config) {
        let notifier = Arc::new(ExpiryNotifier::new(
            Arc::new(state.documents.clone()),
            Arc::new(state.users.clone()),
            Arc::new(email),
        ));
        notifier.start(state.config.expiry_notification_hour);
        tracing::info!(
            hour = state.config.expiry_notification_hour,
            "Expiry notification job enabled"
        );
    }

    // Start the server
    setup::server::start_server(&state.config, router).await?;

    Ok(())
}
