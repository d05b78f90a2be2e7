//! Read-only store contract consumed by the authorization chain

use anyhow::Result;
use async_trait::async_trait;
use uuid::Uuid;

use super::{ApiKeyRepository, DbPool, OrganizationRepository, ProjectRepository};
use crate::models::{ApiKey, Membership, Organization, Project};
use crate::utils::credentials::{digests_match, hash_token};

/// Lookups the credential chain and access checks depend on.
///
/// Implementations only read; they never mutate an entity.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// The single `active` key whose token equals `token`
    async fn find_active_key_by_token(&self, token: &str) -> Result<Option<ApiKey>>;

    async fn find_project_by_id(&self, id: Uuid) -> Result<Option<Project>>;

    async fn find_organization_by_id(&self, id: Uuid) -> Result<Option<Organization>>;

    async fn find_membership(
        &self,
        user_id: Uuid,
        organization_id: Uuid,
    ) -> Result<Option<Membership>>;
}

/// `CredentialStore` backed by the SQLite pool
#[derive(Clone)]
pub struct SqliteCredentialStore {
    pool: DbPool,
}

impl SqliteCredentialStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CredentialStore for SqliteCredentialStore {
    async fn find_active_key_by_token(&self, token: &str) -> Result<Option<ApiKey>> {
        let digest = hash_token(token);
        let key = ApiKeyRepository::new(&self.pool)
            .find_active_by_token_hash(&digest)
            .await?;

        Ok(key.filter(|k| digests_match(&digest, &k.token_hash)))
    }

    async fn find_project_by_id(&self, id: Uuid) -> Result<Option<Project>> {
        ProjectRepository::new(&self.pool).get_by_id(id).await
    }

    async fn find_organization_by_id(&self, id: Uuid) -> Result<Option<Organization>> {
        OrganizationRepository::new(&self.pool).get_by_id(id).await
    }

    async fn find_membership(
        &self,
        user_id: Uuid,
        organization_id: Uuid,
    ) -> Result<Option<Membership>> {
        OrganizationRepository::new(&self.pool)
            .find_membership(user_id, organization_id)
            .await
    }
}
