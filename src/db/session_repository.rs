//! Session repository

use anyhow::{Context, Result};
use sqlx::SqlitePool;

use super::{parse_db_timestamp, parse_uuid};
use crate::models::Session;

#[derive(Debug, sqlx::FromRow)]
struct SessionRow {
    id: String,
    user_id: String,
    expires_at: String,
    created_at: String,
}

pub struct SessionRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> SessionRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Look up a session by the SHA-256 digest of its token.
    ///
    /// Expiry is not checked here.
    pub async fn find_by_token_hash(&self, token_hash: &str) -> Result<Option<Session>> {
        let row = sqlx::query_as::<_, SessionRow>(
            r#"
            SELECT id, user_id, expires_at, created_at
            FROM sessions
            WHERE token_hash = ?
            "#,
        )
        .bind(token_hash)
        .fetch_optional(self.pool)
        .await
        .context("Failed to look up session")?;

        row.map(|row| {
            Ok(Session {
                id: parse_uuid(&row.id, "session")?,
                user_id: parse_uuid(&row.user_id, "user")?,
                expires_at: parse_db_timestamp(&row.expires_at),
                created_at: parse_db_timestamp(&row.created_at),
            })
        })
        .transpose()
    }
}
