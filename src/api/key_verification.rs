//! Endpoint authorized by an API key carried in the request body

use axum::{body::Bytes, Json};
use serde::Serialize;
use serde_json::Value;

use crate::{
    middleware::ApiKeyContext,
    models::{ApiKeyView, Organization, Project},
    utils::AppError,
};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifiedKeyResponse {
    pub valid: bool,
    pub api_key: ApiKeyView,
    pub project: Project,
    pub organization: Organization,
}

/// Report the tenant context resolved for the presented key.
///
/// The middleware already parsed the body, so no `Content-Type` is required;
/// it is parsed again here to confirm it arrives unchanged.
pub async fn verify_api_key(
    context: ApiKeyContext,
    body: Bytes,
) -> Result<Json<VerifiedKeyResponse>, AppError> {
    serde_json::from_slice::<Value>(&body)
        .map_err(|_| AppError::bad_request("Request body must be valid JSON"))?;

    Ok(Json(VerifiedKeyResponse {
        valid: true,
        api_key: ApiKeyView::from(context.api_key()),
        project: context.project().clone(),
        organization: context.organization().clone(),
    }))
}
