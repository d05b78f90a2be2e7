//! Organization endpoints

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use uuid::Uuid;

use crate::{
    db::{OrganizationRepository, ProjectRepository},
    middleware::AuthUser,
    models::{Membership, OrganizationListResponse, ProjectListResponse},
    utils::AppError,
    AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_organizations))
        .route("/{id}/projects", get(list_organization_projects))
}

/// Fail with 403 unless the user is a member of the organization.
pub(super) async fn require_membership(
    state: &AppState,
    user_id: Uuid,
    organization_id: Uuid,
) -> Result<Membership, AppError> {
    state
        .credentials
        .find_membership(user_id, organization_id)
        .await
        .map_err(|e| {
            tracing::error!("Failed to check membership in {}: {:#}", organization_id, e);
            AppError::internal("Failed to check organization membership")
        })?
        .ok_or_else(|| AppError::forbidden("Access denied to this organization"))
}

async fn list_organizations(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<OrganizationListResponse>, AppError> {
    let organizations = OrganizationRepository::new(&state.db)
        .list_for_user(auth_user.id)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list organizations: {:#}", e);
            AppError::internal("Failed to list organizations")
        })?;

    Ok(Json(OrganizationListResponse { organizations }))
}

async fn list_organization_projects(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ProjectListResponse>, AppError> {
    require_membership(&state, auth_user.id, id).await?;

    let projects = ProjectRepository::new(&state.db)
        .list_for_organization(id)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list projects for {}: {:#}", id, e);
            AppError::internal("Failed to list projects")
        })?;

    Ok(Json(ProjectListResponse { projects }))
}
