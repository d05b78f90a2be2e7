//! API key authorization chain
//!
//! Resolves a bearer credential into the (key, project, organization) triple it
//! belongs to. The lookups run strictly in that order and stop at the first
//! failing check, so a caller only ever learns about the first problem and the
//! store is never asked about entities past the failure point.
//!
//! The chain is read-only and holds no state between calls.

use std::sync::Arc;

use axum::http::StatusCode;
use thiserror::Error;
use tracing::{debug, error};
use uuid::Uuid;

use crate::db::CredentialStore;
use crate::models::{ApiKey, Organization, Project};

/// Reasons a credential does not authorize a request
#[derive(Debug, Error)]
pub enum AuthorizationError {
    /// No credential, a non-string one, or only whitespace
    #[error("API key is required")]
    MissingCredential,

    /// Unknown token, or a key that is inactive or deleted
    #[error("Invalid or inactive API key")]
    InvalidOrInactiveCredential,

    /// The key points at a project that does not exist
    #[error("API key {api_key_id} references missing project {project_id}")]
    OwningProjectMissing { api_key_id: Uuid, project_id: Uuid },

    #[error("Project is inactive")]
    ProjectInactive,

    /// The project points at an organization that does not exist
    #[error("Project {project_id} references missing organization {organization_id}")]
    OwningOrganizationMissing {
        project_id: Uuid,
        organization_id: Uuid,
    },

    #[error("Organization is inactive")]
    OrganizationInactive,

    #[error("Credential store failure: {0}")]
    Store(anyhow::Error),
}

impl AuthorizationError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthorizationError::MissingCredential
            | AuthorizationError::InvalidOrInactiveCredential => StatusCode::UNAUTHORIZED,
            AuthorizationError::OwningProjectMissing { .. }
            | AuthorizationError::ProjectInactive
            | AuthorizationError::OwningOrganizationMissing { .. }
            | AuthorizationError::OrganizationInactive => StatusCode::FORBIDDEN,
            AuthorizationError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to return to the caller
    pub fn public_message(&self) -> &'static str {
        match self {
            AuthorizationError::MissingCredential => "API key is required",
            AuthorizationError::InvalidOrInactiveCredential => "Invalid or inactive API key",
            AuthorizationError::ProjectInactive => "Project is inactive",
            AuthorizationError::OrganizationInactive => "Organization is inactive",
            AuthorizationError::OwningProjectMissing { .. }
            | AuthorizationError::OwningOrganizationMissing { .. } => "Access denied",
            AuthorizationError::Store(_) => "Internal server error",
        }
    }
}

/// Tenant context established by a successful authorization.
///
/// Records are kept exactly as the store returned them.
#[derive(Debug, Clone)]
pub struct AuthorizationContext {
    api_key: ApiKey,
    project: Project,
    organization: Organization,
}

impl AuthorizationContext {
    pub fn api_key(&self) -> &ApiKey {
        &self.api_key
    }

    pub fn project(&self) -> &Project {
        &self.project
    }

    pub fn organization(&self) -> &Organization {
        &self.organization
    }
}

/// Request-scoped handle placed in request extensions by the API key middleware
pub type SharedAuthorizationContext = Arc<AuthorizationContext>;

/// Run the credential chain.
///
/// `credential` is the raw value from the request body; surrounding whitespace
/// is ignored. The credential is never logged.
pub async fn authorize<S>(
    store: &S,
    credential: Option<&str>,
) -> Result<AuthorizationContext, AuthorizationError>
where
    S: CredentialStore + ?Sized,
{
    let token = credential
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or(AuthorizationError::MissingCredential)?;

    let api_key = store
        .find_active_key_by_token(token)
        .await
        .map_err(AuthorizationError::Store)?
        .ok_or(AuthorizationError::InvalidOrInactiveCredential)?;

    let Some(project) = store
        .find_project_by_id(api_key.project_id)
        .await
        .map_err(AuthorizationError::Store)?
    else {
        error!(
            api_key_id = %api_key.id,
            project_id = %api_key.project_id,
            "Integrity fault: API key references a missing project"
        );
        return Err(AuthorizationError::OwningProjectMissing {
            api_key_id: api_key.id,
            project_id: api_key.project_id,
        });
    };

    if !project.status.is_active() {
        debug!(api_key_id = %api_key.id, project_id = %project.id, status = %project.status, "Project not active");
        return Err(AuthorizationError::ProjectInactive);
    }

    let Some(organization) = store
        .find_organization_by_id(project.organization_id)
        .await
        .map_err(AuthorizationError::Store)?
    else {
        error!(
            api_key_id = %api_key.id,
            project_id = %project.id,
            organization_id = %project.organization_id,
            "Integrity fault: project references a missing organization"
        );
        return Err(AuthorizationError::OwningOrganizationMissing {
            project_id: project.id,
            organization_id: project.organization_id,
        });
    };

    if !organization.status.is_active() {
        debug!(api_key_id = %api_key.id, organization_id = %organization.id, status = %organization.status, "Organization not active");
        return Err(AuthorizationError::OrganizationInactive);
    }

    Ok(AuthorizationContext {
        api_key,
        project,
        organization,
    })
}
