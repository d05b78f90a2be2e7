//! Credit transaction repository (read-only)

use anyhow::{Context, Result};
use sqlx::SqlitePool;
use uuid::Uuid;

use super::{parse_db_timestamp, parse_uuid};
use crate::models::Transaction;

#[derive(Debug, sqlx::FromRow)]
struct TransactionRow {
    id: String,
    organization_id: String,
    #[sqlx(rename = "type")]
    kind: String,
    amount: Option<String>,
    credit_amount: Option<String>,
    description: Option<String>,
    created_at: String,
}

pub struct TransactionRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> TransactionRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Page of an organization's transactions, newest first
    pub async fn list_for_organization(
        &self,
        organization_id: Uuid,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<Transaction>> {
        let rows = sqlx::query_as::<_, TransactionRow>(
            r#"
            SELECT id, organization_id, type, amount, credit_amount, description, created_at
            FROM transactions
            WHERE organization_id = ?
            ORDER BY created_at DESC
            LIMIT ? OFFSET ?
            "#,
        )
        .bind(organization_id.to_string())
        .bind(i64::from(limit))
        .bind(i64::from(offset))
        .fetch_all(self.pool)
        .await
        .context("Failed to list transactions")?;

        rows.into_iter()
            .map(|row| {
                Ok(Transaction {
                    id: parse_uuid(&row.id, "transaction")?,
                    organization_id: parse_uuid(&row.organization_id, "organization")?,
                    kind: row.kind,
                    amount: row.amount,
                    credit_amount: row.credit_amount,
                    description: row.description,
                    created_at: parse_db_timestamp(&row.created_at),
                })
            })
            .collect()
    }

    pub async fn count_for_organization(&self, organization_id: Uuid) -> Result<i64> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM transactions WHERE organization_id = ?")
                .bind(organization_id.to_string())
                .fetch_one(self.pool)
                .await
                .context("Failed to count transactions")?;

        Ok(count)
    }
}
