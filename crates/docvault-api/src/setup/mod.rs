pub mod database;
pub mod routes;
pub mod server;

use crate::state::AppState;
use anyhow::Result;
use axum::Router;
use docvault_core::Config;
use std::sync::Arc;

/// Initialize the application: database, storage and routes.
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, Router)> {
    let pool = database::setup_database(&config).await?;

    let storage = docvault_storage::create_storage(&config)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to initialize storage: {}", e))?;

    let state = Arc::new(AppState::new(config.clone(), pool, storage));
    let router = routes::setup_routes(&config, state.clone())?;

    Ok((state, router))
}
