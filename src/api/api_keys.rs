//! API key management endpoints

use axum::{
    extract::{Path, Query, State},
    routing::{get, patch},
    Json, Router,
};
use serde::Serialize;
use uuid::Uuid;

use crate::{
    middleware::AuthUser,
    models::{
        ApiKeyListQuery, ApiKeyListResponse, ApiKeyResponse, ApiKeyView, CreateApiKeyRequest,
        CreateApiKeyResponse, UpdateApiKeyRequest,
    },
    services::{ApiKeyChanges, ApiKeyService},
    utils::{
        validation::{non_blank, validate_request},
        AppError,
    },
    AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_api_keys).post(create_api_key))
        .route("/{id}", patch(update_api_key).delete(delete_api_key))
}

#[derive(Debug, Serialize)]
struct MessageResponse {
    message: String,
}

async fn list_api_keys(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Query(query): Query<ApiKeyListQuery>,
) -> Result<Json<ApiKeyListResponse>, AppError> {
    let keys = ApiKeyService::new(&state.db, state.credentials.as_ref())
        .list(auth_user.id, query.project_id)
        .await?;

    Ok(Json(ApiKeyListResponse {
        api_keys: keys.iter().map(ApiKeyView::from).collect(),
    }))
}

async fn create_api_key(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(payload): Json<CreateApiKeyRequest>,
) -> Result<Json<CreateApiKeyResponse>, AppError> {
    validate_request(&payload)?;

    let api_key = ApiKeyService::new(&state.db, state.credentials.as_ref())
        .issue(auth_user.id, payload.project_id, &payload.description)
        .await?;

    Ok(Json(CreateApiKeyResponse { api_key }))
}

async fn update_api_key(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateApiKeyRequest>,
) -> Result<Json<ApiKeyResponse>, AppError> {
    validate_request(&payload)?;

    let changes = ApiKeyChanges {
        status: payload.status.map(Into::into),
        description: non_blank(payload.description),
    };

    let key = ApiKeyService::new(&state.db, state.credentials.as_ref())
        .update(auth_user.id, id, changes)
        .await?;

    Ok(Json(ApiKeyResponse {
        api_key: ApiKeyView::from(&key),
    }))
}

async fn delete_api_key(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, AppError> {
    ApiKeyService::new(&state.db, state.credentials.as_ref())
        .delete(auth_user.id, id)
        .await?;

    Ok(Json(MessageResponse {
        message: "API key deleted successfully".to_string(),
    }))
}
