//! Health check endpoint

use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::warn;

use crate::{db, AppState};

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// `healthy` or `unhealthy`
    pub status: String,
    pub timestamp: DateTime<Utc>,
}

/// Health check including a database round trip.
///
/// Always answers 200; the body carries the verdict.
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let status = match db::ping(&state.db).await {
        Ok(()) => "healthy",
        Err(e) => {
            warn!(error = %format!("{:#}", e), "Health check database ping failed");
            "unhealthy"
        }
    };

    Json(HealthResponse {
        status: status.to_string(),
        timestamp: Utc::now(),
    })
}
