//! Agentic API Library
//!
//! Control-plane API for organizations, projects, API keys and credits.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod db;
pub mod middleware;
pub mod models;
pub mod services;
pub mod utils;

pub use config::AppConfig;
pub use db::{CredentialStore, DbPool, SqliteCredentialStore};
pub use middleware::{api_key_middleware, auth_middleware, ApiKeyContext, AuthUser};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Application configuration
    pub config: AppConfig,
    /// Database connection pool
    pub db: DbPool,
    /// Lookups used by the API key chain and membership checks
    pub credentials: Arc<dyn CredentialStore>,
}

impl AppState {
    /// State backed entirely by the given pool
    pub fn new(config: AppConfig, db: DbPool) -> Self {
        let credentials = Arc::new(SqliteCredentialStore::new(db.clone()));
        Self {
            config,
            db,
            credentials,
        }
    }
}
