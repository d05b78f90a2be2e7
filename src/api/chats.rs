//! Chat history endpoints
//!
//! A chat that is missing, deleted or owned by someone else is reported as
//! not found in every case.

use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use uuid::Uuid;

use crate::{
    db::ChatRepository,
    middleware::AuthUser,
    models::{
        AddMessageRequest, Chat, ChatDetailResponse, ChatListResponse, ChatResponse,
        CreateChatRequest, DeleteChatResponse, Message, UpdateChatRequest, DEFAULT_CHAT_TITLE,
    },
    utils::{
        validation::{non_blank, validate_request},
        AppError,
    },
    AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_chats).post(create_chat))
        .route("/{id}", get(get_chat).patch(update_chat).delete(delete_chat))
        .route("/{id}/messages", post(add_message))
}

async fn list_chats(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<ChatListResponse>, AppError> {
    let chats = ChatRepository::new(&state.db)
        .list_for_user(auth_user.id)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list chats: {:#}", e);
            AppError::internal("Failed to list chats")
        })?;

    Ok(Json(ChatListResponse { chats }))
}

async fn get_chat(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ChatDetailResponse>, AppError> {
    let chat = owned_chat(&state, auth_user.id, id).await?;

    let messages = ChatRepository::new(&state.db)
        .list_messages(chat.id)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list messages of chat {}: {:#}", id, e);
            AppError::internal("Failed to load chat")
        })?;

    Ok(Json(ChatDetailResponse { chat, messages }))
}

async fn create_chat(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(payload): Json<CreateChatRequest>,
) -> Result<Json<ChatResponse>, AppError> {
    validate_request(&payload)?;

    let title = non_blank(payload.title).unwrap_or_else(|| DEFAULT_CHAT_TITLE.to_string());

    let chat = ChatRepository::new(&state.db)
        .create(auth_user.id, &title, &payload.model)
        .await
        .map_err(|e| {
            tracing::error!("Failed to create chat: {:#}", e);
            AppError::internal("Failed to create chat")
        })?;

    tracing::info!(chat_id = %chat.id, user_id = %auth_user.id, "Chat created");

    Ok(Json(ChatResponse { chat }))
}

async fn update_chat(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateChatRequest>,
) -> Result<Json<Chat>, AppError> {
    validate_request(&payload)?;

    let title = non_blank(payload.title);

    let chat = ChatRepository::new(&state.db)
        .update(id, auth_user.id, title.as_deref(), payload.status)
        .await
        .map_err(|e| {
            tracing::error!("Failed to update chat {}: {:#}", id, e);
            AppError::internal("Failed to update chat")
        })?
        .ok_or_else(|| AppError::not_found("Chat not found"))?;

    Ok(Json(chat))
}

async fn delete_chat(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<DeleteChatResponse>, AppError> {
    let deleted = ChatRepository::new(&state.db)
        .soft_delete(id, auth_user.id)
        .await
        .map_err(|e| {
            tracing::error!("Failed to delete chat {}: {:#}", id, e);
            AppError::internal("Failed to delete chat")
        })?;

    if !deleted {
        return Err(AppError::not_found("Chat not found"));
    }

    tracing::info!(chat_id = %id, user_id = %auth_user.id, "Chat deleted");

    Ok(Json(DeleteChatResponse { success: true }))
}

async fn add_message(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<AddMessageRequest>,
) -> Result<Json<Message>, AppError> {
    let chat = owned_chat(&state, auth_user.id, id).await?;

    let message = ChatRepository::new(&state.db)
        .add_message(chat.id, payload.role, &payload.content)
        .await
        .map_err(|e| {
            tracing::error!("Failed to add message to chat {}: {:#}", id, e);
            AppError::internal("Failed to add message")
        })?;

    Ok(Json(message))
}

async fn owned_chat(state: &AppState, user_id: Uuid, chat_id: Uuid) -> Result<Chat, AppError> {
    ChatRepository::new(&state.db)
        .get_for_user(chat_id, user_id)
        .await
        .map_err(|e| {
            tracing::error!("Failed to load chat {}: {:#}", chat_id, e);
            AppError::internal("Failed to load chat")
        })?
        .ok_or_else(|| AppError::not_found("Chat not found"))
}
