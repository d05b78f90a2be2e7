//! Credit transaction models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stored transaction type for purchased credits; everything else is a debit.
pub const CREDIT_TOPUP: &str = "credit_topup";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub kind: String,
    pub amount: Option<String>,
    pub credit_amount: Option<String>,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TransactionDirection {
    Credit,
    Debit,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionView {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub direction: TransactionDirection,
    pub amount: String,
    /// Running balance is not tracked yet
    pub balance: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<&Transaction> for TransactionView {
    fn from(tx: &Transaction) -> Self {
        let direction = if tx.kind == CREDIT_TOPUP {
            TransactionDirection::Credit
        } else {
            TransactionDirection::Debit
        };
        Self {
            id: tx.id,
            direction,
            amount: tx
                .credit_amount
                .clone()
                .or_else(|| tx.amount.clone())
                .unwrap_or_else(|| "0".to_string()),
            balance: "0".to_string(),
            description: tx.description.clone(),
            created_at: tx.created_at,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TransactionListQuery {
    #[serde(default = "default_limit")]
    pub limit: u32,
    #[serde(default)]
    pub offset: u32,
}

impl Default for TransactionListQuery {
    fn default() -> Self {
        Self {
            limit: default_limit(),
            offset: 0,
        }
    }
}

fn default_limit() -> u32 {
    50
}

#[derive(Debug, Clone, Serialize)]
pub struct TransactionListResponse {
    pub transactions: Vec<TransactionView>,
    pub total: i64,
}
