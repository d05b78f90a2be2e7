//! Chat and message repository
//!
//! Every chat query is scoped to its owner. Deleted chats stay in the table
//! but are never returned to the owner.

use std::str::FromStr;

use anyhow::{Context, Result};
use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use super::{parse_db_timestamp, parse_uuid};
use crate::models::{Chat, ChatStatus, Message, MessageRole};

const CHAT_COLUMNS: &str = r#"
    c.id, c.user_id, c.title, c.model, c.status, c.created_at, c.updated_at,
    (SELECT COUNT(*) FROM messages m WHERE m.chat_id = c.id) AS message_count
"#;

#[derive(Debug, sqlx::FromRow)]
struct ChatRow {
    id: String,
    user_id: String,
    title: String,
    model: String,
    status: String,
    created_at: String,
    updated_at: String,
    message_count: i64,
}

#[derive(Debug, sqlx::FromRow)]
struct MessageRow {
    id: String,
    chat_id: String,
    role: String,
    content: String,
    sequence: i64,
    created_at: String,
}

pub struct ChatRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> ChatRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// The user's chats that are not deleted, most recently updated first
    pub async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Chat>> {
        let rows = sqlx::query_as::<_, ChatRow>(&format!(
            r#"
            SELECT {}
            FROM chats c
            WHERE c.user_id = ? AND c.status != 'deleted'
            ORDER BY c.updated_at DESC, c.created_at DESC
            "#,
            CHAT_COLUMNS
        ))
        .bind(user_id.to_string())
        .fetch_all(self.pool)
        .await
        .context("Failed to list chats")?;

        rows.into_iter().map(row_to_chat).collect()
    }

    /// A chat owned by the user, unless it has been deleted
    pub async fn get_for_user(&self, id: Uuid, user_id: Uuid) -> Result<Option<Chat>> {
        let row = sqlx::query_as::<_, ChatRow>(&format!(
            r#"
            SELECT {}
            FROM chats c
            WHERE c.id = ? AND c.user_id = ? AND c.status != 'deleted'
            "#,
            CHAT_COLUMNS
        ))
        .bind(id.to_string())
        .bind(user_id.to_string())
        .fetch_optional(self.pool)
        .await
        .context("Failed to get chat")?;

        row.map(row_to_chat).transpose()
    }

    pub async fn create(&self, user_id: Uuid, title: &str, model: &str) -> Result<Chat> {
        let id = Uuid::new_v4();
        let now = Utc::now().to_rfc3339();

        sqlx::query(
            r#"
            INSERT INTO chats (id, user_id, title, model, status, created_at, updated_at)
            VALUES (?, ?, ?, ?, 'active', ?, ?)
            "#,
        )
        .bind(id.to_string())
        .bind(user_id.to_string())
        .bind(title)
        .bind(model)
        .bind(&now)
        .bind(&now)
        .execute(self.pool)
        .await
        .context("Failed to create chat")?;

        self.get_for_user(id, user_id)
            .await?
            .context("Failed to retrieve created chat")
    }

    /// Change title and/or status of a chat the user owns.
    ///
    /// Returns `Ok(None)` when the chat is missing, foreign or deleted.
    pub async fn update(
        &self,
        id: Uuid,
        user_id: Uuid,
        title: Option<&str>,
        status: Option<ChatStatus>,
    ) -> Result<Option<Chat>> {
        let mut tx = self
            .pool
            .begin()
            .await
            .context("Failed to begin chat update")?;

        let result = sqlx::query(
            r#"
            UPDATE chats
            SET title = COALESCE(?, title),
                status = COALESCE(?, status),
                updated_at = ?
            WHERE id = ? AND user_id = ? AND status != 'deleted'
            "#,
        )
        .bind(title)
        .bind(status.map(|s| s.as_str()))
        .bind(Utc::now().to_rfc3339())
        .bind(id.to_string())
        .bind(user_id.to_string())
        .execute(&mut *tx)
        .await
        .context("Failed to update chat")?;

        if result.rows_affected() == 0 {
            tx.rollback().await.context("Failed to roll back chat update")?;
            return Ok(None);
        }

        // Reloaded without the status filter: the update may itself delete the chat
        let row = sqlx::query_as::<_, ChatRow>(&format!(
            "SELECT {} FROM chats c WHERE c.id = ?",
            CHAT_COLUMNS
        ))
        .bind(id.to_string())
        .fetch_one(&mut *tx)
        .await
        .context("Failed to reload updated chat")?;

        tx.commit().await.context("Failed to commit chat update")?;

        row_to_chat(row).map(Some)
    }

    /// Soft delete. Returns `false` when there was no live chat to delete.
    pub async fn soft_delete(&self, id: Uuid, user_id: Uuid) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE chats SET status = 'deleted', updated_at = ?
            WHERE id = ? AND user_id = ? AND status != 'deleted'
            "#,
        )
        .bind(Utc::now().to_rfc3339())
        .bind(id.to_string())
        .bind(user_id.to_string())
        .execute(self.pool)
        .await
        .context("Failed to delete chat")?;

        Ok(result.rows_affected() > 0)
    }

    /// Messages of a chat in sequence order
    pub async fn list_messages(&self, chat_id: Uuid) -> Result<Vec<Message>> {
        let rows = sqlx::query_as::<_, MessageRow>(
            r#"
            SELECT id, chat_id, role, content, sequence, created_at
            FROM messages
            WHERE chat_id = ?
            ORDER BY sequence
            "#,
        )
        .bind(chat_id.to_string())
        .fetch_all(self.pool)
        .await
        .context("Failed to list messages")?;

        rows.into_iter().map(row_to_message).collect()
    }

    /// Append a message and bump the chat's `updated_at`.
    ///
    /// The next sequence number is computed inside the insert, so concurrent
    /// appends cannot reuse one; the unique index rejects any that would.
    pub async fn add_message(
        &self,
        chat_id: Uuid,
        role: MessageRole,
        content: &str,
    ) -> Result<Message> {
        let id = Uuid::new_v4();
        let now = Utc::now().to_rfc3339();

        let mut tx = self
            .pool
            .begin()
            .await
            .context("Failed to begin message insert")?;

        sqlx::query(
            r#"
            INSERT INTO messages (id, chat_id, role, content, sequence, created_at)
            SELECT ?, ?, ?, ?, COALESCE(MAX(sequence), 0) + 1, ?
            FROM messages
            WHERE chat_id = ?
            "#,
        )
        .bind(id.to_string())
        .bind(chat_id.to_string())
        .bind(role.as_str())
        .bind(content)
        .bind(&now)
        .bind(chat_id.to_string())
        .execute(&mut *tx)
        .await
        .context("Failed to insert message")?;

        sqlx::query("UPDATE chats SET updated_at = ? WHERE id = ?")
            .bind(&now)
            .bind(chat_id.to_string())
            .execute(&mut *tx)
            .await
            .context("Failed to touch chat")?;

        let row = sqlx::query_as::<_, MessageRow>(
            "SELECT id, chat_id, role, content, sequence, created_at FROM messages WHERE id = ?",
        )
        .bind(id.to_string())
        .fetch_one(&mut *tx)
        .await
        .context("Failed to reload message")?;

        tx.commit().await.context("Failed to commit message insert")?;

        row_to_message(row)
    }
}

fn row_to_chat(row: ChatRow) -> Result<Chat> {
    Ok(Chat {
        id: parse_uuid(&row.id, "chat")?,
        user_id: parse_uuid(&row.user_id, "user")?,
        title: row.title,
        model: row.model,
        status: ChatStatus::from_str(&row.status).map_err(anyhow::Error::msg)?,
        message_count: row.message_count,
        created_at: parse_db_timestamp(&row.created_at),
        updated_at: parse_db_timestamp(&row.updated_at),
    })
}

fn row_to_message(row: MessageRow) -> Result<Message> {
    Ok(Message {
        id: parse_uuid(&row.id, "message")?,
        chat_id: parse_uuid(&row.chat_id, "chat")?,
        role: MessageRole::from_str(&row.role).map_err(anyhow::Error::msg)?,
        content: row.content,
        sequence: row.sequence,
        created_at: parse_db_timestamp(&row.created_at),
    })
}
