//! API key repository

use std::str::FromStr;

use anyhow::{Context, Result};
use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use super::{parse_db_timestamp, parse_uuid};
use crate::models::{ApiKey, EntityStatus};

#[derive(Debug, sqlx::FromRow)]
struct ApiKeyRow {
    id: String,
    token_hash: String,
    token_hint: String,
    token_length: i64,
    description: String,
    project_id: String,
    status: String,
    created_at: String,
    updated_at: String,
}

/// Key material to persist for a freshly generated key
#[derive(Debug, Clone)]
pub struct NewApiKey<'k> {
    pub project_id: Uuid,
    pub description: &'k str,
    pub token_hash: &'k str,
    pub token_hint: &'k str,
    pub token_length: usize,
}

pub struct ApiKeyRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> ApiKeyRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn find_active_by_token_hash(&self, token_hash: &str) -> Result<Option<ApiKey>> {
        let row = sqlx::query_as::<_, ApiKeyRow>(
            r#"
            SELECT id, token_hash, token_hint, token_length, description, project_id, status,
                   created_at, updated_at
            FROM api_keys
            WHERE token_hash = ? AND status = 'active'
            LIMIT 1
            "#,
        )
        .bind(token_hash)
        .fetch_optional(self.pool)
        .await
        .context("Failed to look up api key")?;

        row.map(row_to_api_key).transpose()
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<Option<ApiKey>> {
        let row = sqlx::query_as::<_, ApiKeyRow>(
            r#"
            SELECT id, token_hash, token_hint, token_length, description, project_id, status,
                   created_at, updated_at
            FROM api_keys
            WHERE id = ?
            "#,
        )
        .bind(id.to_string())
        .fetch_optional(self.pool)
        .await
        .context("Failed to get api key")?;

        row.map(row_to_api_key).transpose()
    }

    /// Keys of projects in the user's organizations, newest first
    pub async fn list_for_user(
        &self,
        user_id: Uuid,
        project_id: Option<Uuid>,
    ) -> Result<Vec<ApiKey>> {
        let project_filter = project_id.map(|id| id.to_string());
        let rows = sqlx::query_as::<_, ApiKeyRow>(
            r#"
            SELECT ak.id, ak.token_hash, ak.token_hint, ak.token_length, ak.description,
                   ak.project_id, ak.status, ak.created_at, ak.updated_at
            FROM api_keys ak
            INNER JOIN projects p ON p.id = ak.project_id
            INNER JOIN user_organizations uo ON uo.organization_id = p.organization_id
            WHERE uo.user_id = ? AND (? IS NULL OR ak.project_id = ?)
            ORDER BY ak.created_at DESC
            "#,
        )
        .bind(user_id.to_string())
        .bind(project_filter.clone())
        .bind(project_filter)
        .fetch_all(self.pool)
        .await
        .context("Failed to list api keys")?;

        rows.into_iter().map(row_to_api_key).collect()
    }

    /// Insert a new active key.
    ///
    /// Returns `Ok(None)` when the token digest already exists.
    pub async fn create(&self, key: &NewApiKey<'_>) -> Result<Option<ApiKey>> {
        let id = Uuid::new_v4();
        let now = Utc::now().to_rfc3339();

        let inserted = sqlx::query(
            r#"
            INSERT INTO api_keys (id, token_hash, token_hint, token_length, description,
                                  project_id, status, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, 'active', ?, ?)
            "#,
        )
        .bind(id.to_string())
        .bind(key.token_hash)
        .bind(key.token_hint)
        .bind(key.token_length as i64)
        .bind(key.description)
        .bind(key.project_id.to_string())
        .bind(&now)
        .bind(&now)
        .execute(self.pool)
        .await;

        match inserted {
            Ok(_) => {}
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                return Ok(None);
            }
            Err(e) => return Err(anyhow::Error::new(e).context("Failed to create api key")),
        }

        self.get_by_id(id)
            .await?
            .context("Failed to retrieve created api key")
            .map(Some)
    }

    /// Update status and/or description of a key that is not deleted.
    ///
    /// Returns `Ok(None)` when the key is missing or already deleted.
    pub async fn update(
        &self,
        id: Uuid,
        status: Option<EntityStatus>,
        description: Option<&str>,
    ) -> Result<Option<ApiKey>> {
        let mut tx = self
            .pool
            .begin()
            .await
            .context("Failed to begin api key update")?;

        let result = sqlx::query(
            r#"
            UPDATE api_keys
            SET status = COALESCE(?, status),
                description = COALESCE(?, description),
                updated_at = ?
            WHERE id = ? AND status != 'deleted'
            "#,
        )
        .bind(status.map(|s| s.as_str()))
        .bind(description)
        .bind(Utc::now().to_rfc3339())
        .bind(id.to_string())
        .execute(&mut *tx)
        .await
        .context("Failed to update api key")?;

        if result.rows_affected() == 0 {
            tx.rollback().await.context("Failed to roll back api key update")?;
            return Ok(None);
        }

        let row = sqlx::query_as::<_, ApiKeyRow>(
            r#"
            SELECT id, token_hash, token_hint, token_length, description, project_id, status,
                   created_at, updated_at
            FROM api_keys
            WHERE id = ?
            "#,
        )
        .bind(id.to_string())
        .fetch_one(&mut *tx)
        .await
        .context("Failed to reload updated api key")?;

        tx.commit().await.context("Failed to commit api key update")?;

        row_to_api_key(row).map(Some)
    }

    /// Soft delete: the row stays, its status becomes `deleted`.
    pub async fn soft_delete(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("UPDATE api_keys SET status = 'deleted', updated_at = ? WHERE id = ?")
            .bind(Utc::now().to_rfc3339())
            .bind(id.to_string())
            .execute(self.pool)
            .await
            .context("Failed to delete api key")?;

        Ok(result.rows_affected() > 0)
    }
}

fn row_to_api_key(row: ApiKeyRow) -> Result<ApiKey> {
    Ok(ApiKey {
        id: parse_uuid(&row.id, "api key")?,
        token_hash: row.token_hash,
        token_hint: row.token_hint,
        token_length: usize::try_from(row.token_length).context("Invalid api key length")?,
        description: row.description,
        project_id: parse_uuid(&row.project_id, "project")?,
        status: EntityStatus::from_str(&row.status).map_err(anyhow::Error::msg)?,
        created_at: parse_db_timestamp(&row.created_at),
        updated_at: parse_db_timestamp(&row.updated_at),
    })
}
