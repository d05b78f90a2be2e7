//! Database layer
//!
//! This module handles database operations for:
//! - Users and their sessions
//! - Organizations and memberships
//! - Projects and API keys
//! - Credit transactions
//! - Chats and their messages

mod api_key_repository;
mod chat_repository;
mod credential_store;
mod organization_repository;
mod project_repository;
mod session_repository;
mod transaction_repository;
mod user_repository;

pub use api_key_repository::{ApiKeyRepository, NewApiKey};
pub use chat_repository::ChatRepository;
pub use credential_store::{CredentialStore, SqliteCredentialStore};
pub use organization_repository::OrganizationRepository;
pub use project_repository::ProjectRepository;
pub use session_repository::SessionRepository;
pub use transaction_repository::TransactionRepository;
pub use user_repository::UserRepository;

use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};

use crate::config::DatabaseConfig;

/// Database connection pool type
pub type DbPool = Pool<Sqlite>;

/// Initialize the database connection pool and apply migrations
pub async fn init_pool(config: &DatabaseConfig) -> Result<DbPool> {
    let options = SqliteConnectOptions::from_str(&config.url)
        .with_context(|| format!("Invalid database url: {}", config.url))?
        .create_if_missing(true)
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(Duration::from_secs(config.connect_timeout_secs))
        .idle_timeout(Duration::from_secs(config.idle_timeout_secs))
        .connect_with(options)
        .await
        .context("Failed to connect to database")?;

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run database migrations")?;

    Ok(pool)
}

/// Check database connectivity
pub async fn ping(pool: &DbPool) -> Result<()> {
    sqlx::query("SELECT 1")
        .execute(pool)
        .await
        .context("Database ping failed")?;
    Ok(())
}

pub(crate) fn parse_db_timestamp(ts: &str) -> DateTime<Utc> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(ts) {
        return dt.with_timezone(&Utc);
    }
    if let Ok(dt) = chrono::NaiveDateTime::parse_from_str(ts, "%Y-%m-%d %H:%M:%S") {
        return DateTime::<Utc>::from_naive_utc_and_offset(dt, Utc);
    }
    Utc::now()
}

pub(crate) fn parse_uuid(value: &str, what: &'static str) -> Result<uuid::Uuid> {
    uuid::Uuid::parse_str(value).with_context(|| format!("Invalid {} id: {}", what, value))
}
