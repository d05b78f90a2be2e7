//! Current user endpoints

use axum::{extract::State, routing::{get, post}, Json, Router};

use crate::{
    db::UserRepository,
    middleware::AuthUser,
    models::{OnboardingResponse, UserResponse},
    utils::AppError,
    AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/me", get(get_me))
        .route("/me/complete-onboarding", post(complete_onboarding))
}

async fn get_me(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<UserResponse>, AppError> {
    let user = UserRepository::new(&state.db)
        .get_by_id(auth_user.id)
        .await
        .map_err(|e| {
            tracing::error!("Failed to load user {}: {:#}", auth_user.id, e);
            AppError::internal("Failed to load user")
        })?
        .ok_or_else(|| {
            tracing::warn!(user_id = %auth_user.id, "Session user not found");
            AppError::unauthorized("User not found")
        })?;

    Ok(Json(UserResponse { user }))
}

async fn complete_onboarding(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<OnboardingResponse>, AppError> {
    let user = UserRepository::new(&state.db)
        .complete_onboarding(auth_user.id)
        .await
        .map_err(|e| {
            tracing::error!("Failed to complete onboarding for {}: {:#}", auth_user.id, e);
            AppError::internal("Failed to complete onboarding")
        })?
        .ok_or_else(|| AppError::unauthorized("User not found"))?;

    tracing::info!(user_id = %user.id, "Onboarding completed");

    Ok(Json(OnboardingResponse {
        user,
        message: "Onboarding completed successfully".to_string(),
    }))
}
