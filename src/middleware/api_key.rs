//! API key middleware
//!
//! Reads the `apiKey` field of a JSON request body, runs the authorization
//! chain and injects an [`ApiKeyContext`]. The body is passed on unchanged so
//! handlers can still extract it.

use std::ops::Deref;
use std::sync::Arc;

use axum::{
    body::{Body, Bytes},
    extract::{FromRequestParts, Request, State},
    http::{request::Parts, StatusCode},
    middleware::Next,
    response::Response,
    Json,
};
use serde_json::Value;

use crate::{
    services::authorization::{authorize, AuthorizationContext, SharedAuthorizationContext},
    utils::error::{AppError, ErrorResponse},
    AppState,
};

/// Tenant context of the API key that authorized this request
#[derive(Debug, Clone)]
pub struct ApiKeyContext(pub SharedAuthorizationContext);

impl Deref for ApiKeyContext {
    type Target = AuthorizationContext;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<S> FromRequestParts<S> for ApiKeyContext
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, Json<ErrorResponse>);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts.extensions.get::<ApiKeyContext>().cloned().ok_or_else(|| {
            (
                StatusCode::UNAUTHORIZED,
                Json(ErrorResponse::new("unauthorized", "API key is required")),
            )
        })
    }
}

/// The `apiKey` string of a JSON body.
///
/// An empty body, a non-object body, or a non-string `apiKey` all yield `None`.
/// Bytes that are not JSON at all are a bad request.
fn credential_from_body(body: &Bytes) -> Result<Option<String>, AppError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }

    let value: Value = serde_json::from_slice(body)
        .map_err(|_| AppError::bad_request("Request body must be valid JSON"))?;

    Ok(value
        .get("apiKey")
        .and_then(Value::as_str)
        .map(str::to_string))
}

/// API key authorization middleware
pub async fn api_key_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let (parts, body) = request.into_parts();
    let bytes = axum::body::to_bytes(body, state.config.auth.api_key_body_limit_bytes)
        .await
        .map_err(|_| AppError::bad_request("Request body is too large or unreadable"))?;

    let credential = credential_from_body(&bytes)?;
    let context = authorize(state.credentials.as_ref(), credential.as_deref()).await?;

    let mut request = Request::from_parts(parts, Body::from(bytes));
    request
        .extensions_mut()
        .insert(ApiKeyContext(Arc::new(context)));

    Ok(next.run(request).await)
}
