//! API key models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::EntityStatus;
use crate::utils::credentials::mask_from_hint;

/// Stored API key record. The secret itself is never kept.
#[derive(Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiKey {
    pub id: Uuid,
    #[serde(skip_serializing)]
    pub token_hash: String,
    pub token_hint: String,
    pub token_length: usize,
    pub description: String,
    pub project_id: Uuid,
    pub status: EntityStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ApiKey {
    /// Display form of the key
    pub fn masked_token(&self) -> String {
        mask_from_hint(&self.token_hint, self.token_length)
    }
}

impl std::fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiKey")
            .field("id", &self.id)
            .field("token_hash", &"<redacted>")
            .field("description", &self.description)
            .field("project_id", &self.project_id)
            .field("status", &self.status)
            .field("created_at", &self.created_at)
            .field("updated_at", &self.updated_at)
            .finish()
    }
}

/// Key as returned by listing and update endpoints
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiKeyView {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub description: String,
    pub status: EntityStatus,
    pub project_id: Uuid,
    pub masked_token: String,
}

impl From<&ApiKey> for ApiKeyView {
    fn from(key: &ApiKey) -> Self {
        Self {
            id: key.id,
            created_at: key.created_at,
            updated_at: key.updated_at,
            description: key.description.clone(),
            status: key.status,
            project_id: key.project_id,
            masked_token: key.masked_token(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiKeyListResponse {
    pub api_keys: Vec<ApiKeyView>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiKeyListQuery {
    pub project_id: Option<Uuid>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateApiKeyRequest {
    #[validate(length(max = 255))]
    pub description: String,
    pub project_id: Uuid,
}

/// Newly issued key. The only response that ever carries the raw token.
#[derive(Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedApiKey {
    pub id: Uuid,
    pub token: String,
    pub description: String,
    pub project_id: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateApiKeyResponse {
    pub api_key: CreatedApiKey,
}

/// Status values a caller may set; `deleted` goes through the delete endpoint.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ApiKeyStatusUpdate {
    Active,
    Inactive,
}

impl From<ApiKeyStatusUpdate> for EntityStatus {
    fn from(status: ApiKeyStatusUpdate) -> Self {
        match status {
            ApiKeyStatusUpdate::Active => EntityStatus::Active,
            ApiKeyStatusUpdate::Inactive => EntityStatus::Inactive,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateApiKeyRequest {
    pub status: Option<ApiKeyStatusUpdate>,
    #[validate(length(max = 255))]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiKeyResponse {
    pub api_key: ApiKeyView,
}
