//! Project endpoints

use axum::{extract::State, routing::get, Json, Router};

use crate::{db::ProjectRepository, middleware::AuthUser, models::Project, utils::AppError, AppState};

pub fn routes() -> Router<AppState> {
    Router::new().route("/", get(list_projects))
}

/// Projects across every organization the user belongs to
async fn list_projects(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<Vec<Project>>, AppError> {
    let projects = ProjectRepository::new(&state.db)
        .list_for_user(auth_user.id)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list projects: {:#}", e);
            AppError::internal("Failed to list projects")
        })?;

    Ok(Json(projects))
}
