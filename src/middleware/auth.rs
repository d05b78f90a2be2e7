//! Session Authentication Middleware
//!
//! Resolves the caller's session from `Authorization: Bearer <token>` or the
//! configured session cookie and injects an [`AuthUser`] into request
//! extensions.

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use axum_extra::extract::cookie::CookieJar;
use tracing::error;
use uuid::Uuid;

use crate::{services::SessionResolver, utils::error::ErrorResponse, AppState};

/// Authenticated user information resolved from a session
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: Uuid,
    pub email: String,
    pub session_id: Uuid,
}

/// Extractor for AuthUser from request extensions
///
/// This allows using AuthUser as a handler parameter after auth middleware has run.
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, Json<ErrorResponse>);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts.extensions.get::<AuthUser>().cloned().ok_or_else(|| {
            (
                StatusCode::UNAUTHORIZED,
                Json(ErrorResponse::new("unauthorized", "Unauthorized")),
            )
        })
    }
}

/// Authentication error types
#[derive(Debug)]
pub enum AuthError {
    MissingToken,
    InvalidSession,
    Internal,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match self {
            AuthError::MissingToken | AuthError::InvalidSession => {
                (StatusCode::UNAUTHORIZED, "unauthorized", "Unauthorized")
            }
            AuthError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                "Internal server error",
            ),
        };

        (status, Json(ErrorResponse::new(error_type, message))).into_response()
    }
}

/// Extract bearer token from Authorization header
fn extract_bearer_token(auth_header: &str) -> Option<&str> {
    auth_header
        .strip_prefix("Bearer ")
        .or_else(|| auth_header.strip_prefix("bearer "))
}

/// Session token from the bearer header, falling back to the session cookie
fn session_token(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
    let bearer = headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(extract_bearer_token)
        .map(str::trim)
        .filter(|t| !t.is_empty());

    if let Some(token) = bearer {
        return Some(token.to_string());
    }

    CookieJar::from_headers(headers)
        .get(cookie_name)
        .map(|c| c.value().trim().to_string())
        .filter(|t| !t.is_empty())
}

/// Authentication middleware
///
/// On success, it injects the AuthUser into request extensions.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let token = session_token(request.headers(), &state.config.auth.session_cookie)
        .ok_or(AuthError::MissingToken)?;

    let (user, session) = SessionResolver::new(&state.db)
        .resolve(&token)
        .await
        .map_err(|e| {
            error!(error = %format!("{:#}", e), "Session lookup failed");
            AuthError::Internal
        })?
        .ok_or(AuthError::InvalidSession)?;

    request.extensions_mut().insert(AuthUser {
        id: user.id,
        email: user.email,
        session_id: session.id,
    });

    Ok(next.run(request).await)
}
