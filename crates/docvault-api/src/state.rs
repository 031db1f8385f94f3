//! Shared application state.

use docvault_core::Config;
use docvault_db::{DocumentRepository, UserRepository};
use docvault_storage::Storage;
use sqlx::PgPool;
use std::sync::Arc;

pub struct AppState {
    pub config: Config,
    pub documents: DocumentRepository,
    pub users: UserRepository,
    pub storage: Arc<dyn Storage>,
}

impl AppState {
    pub fn new(config: Config, pool: PgPool, storage: Arc<dyn Storage>) -> Self {
        Self {
            documents: DocumentRepository::new(pool.clone()),
            users: UserRepository::new(pool),
            config,
            storage,
        }
    }
}
