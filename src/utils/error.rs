//! Error types and handling
//!
//! All errors are converted to a consistent JSON response format. Details of
//! server-side failures are logged, never returned.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::{error, warn};

use crate::services::api_keys::ApiKeyError;
use crate::services::authorization::AuthorizationError;

/// Request failure, categorized by the HTTP status it maps to
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Missing or rejected credentials (401)
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Authenticated, but the tenant or resource is off limits (403)
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// The resource is in a state that forbids the change (409)
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Body failed `validator` rules (422)
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl AppError {
    pub fn not_found(message: impl Into<String>) -> Self {
        AppError::NotFound(message.into())
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        AppError::BadRequest(message.into())
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        AppError::Unauthorized(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        AppError::Forbidden(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        AppError::Conflict(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        AppError::Internal(message.into())
    }

    /// Message returned to the client, without the category prefix
    pub fn message(&self) -> &str {
        match self {
            AppError::NotFound(m)
            | AppError::BadRequest(m)
            | AppError::Unauthorized(m)
            | AppError::Forbidden(m)
            | AppError::Conflict(m)
            | AppError::ValidationError(m)
            | AppError::Internal(m)
            | AppError::Database(m) => m,
        }
    }
}

/// JSON body of every error response
#[derive(Serialize, Debug)]
pub struct ErrorResponse {
    /// Machine-readable category, e.g. `forbidden`
    pub error: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_type) = match &self {
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            AppError::BadRequest(_) => (StatusCode::BAD_REQUEST, "bad_request"),
            AppError::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "unauthorized"),
            AppError::Forbidden(_) => (StatusCode::FORBIDDEN, "forbidden"),
            AppError::Conflict(_) => (StatusCode::CONFLICT, "conflict"),
            AppError::ValidationError(_) => (StatusCode::UNPROCESSABLE_ENTITY, "validation_error"),
            AppError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
            AppError::Database(_) => (StatusCode::INTERNAL_SERVER_ERROR, "database_error"),
        };

        if status.is_server_error() {
            error!(error = %self, error_type = error_type, "Request error");
        } else if status == StatusCode::FORBIDDEN {
            warn!(error = %self, "Request forbidden");
        }

        let message = match &self {
            AppError::Internal(_) | AppError::Database(_) => {
                "Internal server error".to_string()
            }
            other => other.message().to_string(),
        };
        let body = ErrorResponse::new(error_type, message);

        (status, Json(body)).into_response()
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => AppError::NotFound("Record not found".to_string()),
            sqlx::Error::Database(db_err) => {
                // Check for unique constraint violations
                if db_err.message().contains("UNIQUE constraint failed") {
                    AppError::Conflict("Resource already exists".to_string())
                } else {
                    AppError::Database(db_err.to_string())
                }
            }
            _ => AppError::Database(err.to_string()),
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::ValidationError(err.to_string())
    }
}

impl From<AuthorizationError> for AppError {
    fn from(err: AuthorizationError) -> Self {
        let message = err.public_message().to_string();
        match err.status_code() {
            StatusCode::UNAUTHORIZED => AppError::Unauthorized(message),
            StatusCode::FORBIDDEN => AppError::Forbidden(message),
            _ => AppError::Internal(err.to_string()),
        }
    }
}

impl From<ApiKeyError> for AppError {
    fn from(err: ApiKeyError) -> Self {
        match err {
            ApiKeyError::NotFound => AppError::NotFound("API key not found".to_string()),
            ApiKeyError::AccessDenied => {
                AppError::Forbidden("Access denied to this API key".to_string())
            }
            ApiKeyError::ProjectAccessDenied => {
                AppError::Forbidden("Access denied to this project".to_string())
            }
            ApiKeyError::Deleted => AppError::Conflict("API key has been deleted".to_string()),
            ApiKeyError::IssuanceExhausted => {
                AppError::Internal("Could not allocate a unique API key".to_string())
            }
            ApiKeyError::Store(e) => AppError::Internal(format!("{:#}", e)),
        }
    }
}

/// Result alias for handler helpers
pub type AppResult<T> = Result<T, AppError>;
