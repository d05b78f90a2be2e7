//! Chat history models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Title given to chats created without one
pub const DEFAULT_CHAT_TITLE: &str = "New Chat";

/// Lifecycle of a chat. Deleted chats are hidden from their owner.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ChatStatus {
    #[default]
    Active,
    Archived,
    Deleted,
}

impl ChatStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChatStatus::Active => "active",
            ChatStatus::Archived => "archived",
            ChatStatus::Deleted => "deleted",
        }
    }
}

impl std::str::FromStr for ChatStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(ChatStatus::Active),
            "archived" => Ok(ChatStatus::Archived),
            "deleted" => Ok(ChatStatus::Deleted),
            _ => Err(format!("Invalid chat status: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
    System,
}

impl MessageRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageRole::User => "user",
            MessageRole::Assistant => "assistant",
            MessageRole::System => "system",
        }
    }
}

impl std::str::FromStr for MessageRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(MessageRole::User),
            "assistant" => Ok(MessageRole::Assistant),
            "system" => Ok(MessageRole::System),
            _ => Err(format!("Invalid message role: {}", s)),
        }
    }
}

/// A user's chat, with the number of messages it holds
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Chat {
    pub id: Uuid,
    #[serde(skip_serializing)]
    pub user_id: Uuid,
    pub title: String,
    pub model: String,
    pub status: ChatStatus,
    pub message_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One message of a chat. `sequence` starts at 1 and has no gaps.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: Uuid,
    #[serde(skip_serializing)]
    pub chat_id: Uuid,
    pub role: MessageRole,
    pub content: String,
    pub sequence: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatListResponse {
    pub chats: Vec<Chat>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatResponse {
    pub chat: Chat,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatDetailResponse {
    pub chat: Chat,
    pub messages: Vec<Message>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DeleteChatResponse {
    pub success: bool,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateChatRequest {
    #[validate(length(max = 255))]
    pub title: Option<String>,
    #[validate(length(min = 1, max = 255))]
    pub model: String,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateChatRequest {
    #[validate(length(max = 255))]
    pub title: Option<String>,
    pub status: Option<ChatStatus>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AddMessageRequest {
    pub role: MessageRole,
    pub content: String,
}
