//! User repository

use anyhow::{Context, Result};
use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use super::{parse_db_timestamp, parse_uuid};
use crate::models::User;

#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: String,
    name: Option<String>,
    email: String,
    email_verified: bool,
    image: Option<String>,
    onboarding_completed: bool,
    created_at: String,
    updated_at: String,
}

pub struct UserRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> UserRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, name, email, email_verified, image, onboarding_completed,
                   created_at, updated_at
            FROM users
            WHERE id = ?
            "#,
        )
        .bind(id.to_string())
        .fetch_optional(self.pool)
        .await
        .context("Failed to get user")?;

        row.map(row_to_user).transpose()
    }

    /// Mark onboarding as completed and return the updated user
    pub async fn complete_onboarding(&self, id: Uuid) -> Result<Option<User>> {
        sqlx::query("UPDATE users SET onboarding_completed = 1, updated_at = ? WHERE id = ?")
            .bind(Utc::now().to_rfc3339())
            .bind(id.to_string())
            .execute(self.pool)
            .await
            .context("Failed to complete onboarding")?;

        self.get_by_id(id).await
    }
}

fn row_to_user(row: UserRow) -> Result<User> {
    Ok(User {
        id: parse_uuid(&row.id, "user")?,
        name: row.name,
        email: row.email,
        email_verified: row.email_verified,
        image: row.image,
        onboarding_completed: row.onboarding_completed,
        created_at: parse_db_timestamp(&row.created_at),
        updated_at: parse_db_timestamp(&row.updated_at),
    })
}
