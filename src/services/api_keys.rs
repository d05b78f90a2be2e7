//! API key management for session-authenticated users
//!
//! Every mutation is gated on membership in the organization that owns the
//! key's project. Keys are never physically removed.

use anyhow::Context;
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

use crate::db::{ApiKeyRepository, CredentialStore, DbPool, NewApiKey, ProjectRepository};
use crate::models::{ApiKey, CreatedApiKey, EntityStatus};
use crate::utils::credentials::{generate_api_key, hash_token, key_hint};

/// Attempts at drawing a key whose digest is not already taken
const MAX_ISSUE_ATTEMPTS: usize = 3;

#[derive(Debug, Error)]
pub enum ApiKeyError {
    #[error("API key not found")]
    NotFound,

    /// The acting user is not a member of the key's organization
    #[error("Access denied to this API key")]
    AccessDenied,

    #[error("Access denied to this project")]
    ProjectAccessDenied,

    /// Deleted keys cannot be modified
    #[error("API key has been deleted")]
    Deleted,

    #[error("Could not allocate a unique API key")]
    IssuanceExhausted,

    #[error("API key store failure: {0}")]
    Store(#[from] anyhow::Error),
}

/// Fields a caller may change on an existing key
#[derive(Debug, Clone, Default)]
pub struct ApiKeyChanges {
    pub status: Option<EntityStatus>,
    pub description: Option<String>,
}

pub struct ApiKeyService<'a> {
    pool: &'a DbPool,
    store: &'a dyn CredentialStore,
}

impl<'a> ApiKeyService<'a> {
    pub fn new(pool: &'a DbPool, store: &'a dyn CredentialStore) -> Self {
        Self { pool, store }
    }

    /// Keys visible to the user, newest first.
    ///
    /// A `project_id` the user cannot see yields an empty list.
    pub async fn list(
        &self,
        user_id: Uuid,
        project_id: Option<Uuid>,
    ) -> Result<Vec<ApiKey>, ApiKeyError> {
        Ok(ApiKeyRepository::new(self.pool)
            .list_for_user(user_id, project_id)
            .await?)
    }

    /// Issue a new key for a project in one of the user's organizations.
    pub async fn issue(
        &self,
        user_id: Uuid,
        project_id: Uuid,
        description: &str,
    ) -> Result<CreatedApiKey, ApiKeyError> {
        ProjectRepository::new(self.pool)
            .get_accessible(project_id, user_id)
            .await?
            .ok_or(ApiKeyError::ProjectAccessDenied)?;

        let repo = ApiKeyRepository::new(self.pool);
        for attempt in 1..=MAX_ISSUE_ATTEMPTS {
            let token = generate_api_key();
            let token_hash = hash_token(&token);
            let token_hint = key_hint(&token);

            let created = repo
                .create(&NewApiKey {
                    project_id,
                    description,
                    token_hash: &token_hash,
                    token_hint: &token_hint,
                    token_length: token.chars().count(),
                })
                .await?;

            if let Some(key) = created {
                info!(api_key_id = %key.id, project_id = %project_id, user_id = %user_id, "API key issued");
                return Ok(CreatedApiKey {
                    id: key.id,
                    token,
                    description: key.description,
                    project_id: key.project_id,
                    created_at: key.created_at,
                });
            }

            warn!(attempt, project_id = %project_id, "Generated API key collided, retrying");
        }

        Err(ApiKeyError::IssuanceExhausted)
    }

    /// Change status and/or description of a key the user can manage.
    pub async fn update(
        &self,
        user_id: Uuid,
        key_id: Uuid,
        changes: ApiKeyChanges,
    ) -> Result<ApiKey, ApiKeyError> {
        let key = self.accessible_key(user_id, key_id).await?;
        if key.status.is_deleted() {
            return Err(ApiKeyError::Deleted);
        }

        if changes.status.is_none() && changes.description.is_none() {
            return Ok(key);
        }

        let updated = ApiKeyRepository::new(self.pool)
            .update(key_id, changes.status, changes.description.as_deref())
            .await?
            .ok_or(ApiKeyError::Deleted)?;

        info!(api_key_id = %key_id, user_id = %user_id, status = %updated.status, "API key updated");
        Ok(updated)
    }

    /// Soft delete. Deleting an already deleted key succeeds.
    pub async fn delete(&self, user_id: Uuid, key_id: Uuid) -> Result<(), ApiKeyError> {
        let key = self.accessible_key(user_id, key_id).await?;
        if key.status.is_deleted() {
            return Ok(());
        }

        // The row can vanish between the lookup and the update
        if !ApiKeyRepository::new(self.pool).soft_delete(key_id).await? {
            return Err(ApiKeyError::NotFound);
        }
        info!(api_key_id = %key_id, user_id = %user_id, "API key deleted");
        Ok(())
    }

    /// Load a key and check the user belongs to its owning organization.
    ///
    /// Unknown ids are `NotFound`; everything else the user may not touch is
    /// `AccessDenied`, including keys whose project has gone missing.
    async fn accessible_key(&self, user_id: Uuid, key_id: Uuid) -> Result<ApiKey, ApiKeyError> {
        let key = ApiKeyRepository::new(self.pool)
            .get_by_id(key_id)
            .await?
            .ok_or(ApiKeyError::NotFound)?;

        let Some(project) = self
            .store
            .find_project_by_id(key.project_id)
            .await
            .context("Failed to load API key project")?
        else {
            warn!(api_key_id = %key.id, project_id = %key.project_id, "API key references a missing project");
            return Err(ApiKeyError::AccessDenied);
        };

        self.store
            .find_membership(user_id, project.organization_id)
            .await
            .context("Failed to check organization membership")?
            .ok_or(ApiKeyError::AccessDenied)?;

        Ok(key)
    }
}
