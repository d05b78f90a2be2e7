//! API routes and handlers
//!
//! This module defines all API endpoints and their routing.

use axum::{
    routing::{get, post},
    Router,
};

use crate::{middleware, AppState};

mod api_keys;
mod chats;
mod credits;
mod health;
mod key_verification;
mod organizations;
mod projects;
mod user;

pub use health::*;

/// Public API routes (no authentication required)
pub fn public_routes() -> Router<AppState> {
    Router::new().route("/health", get(health::health_check))
}

/// Session-protected API routes
pub fn protected_routes() -> Router<AppState> {
    Router::new()
        .nest("/user", user::routes())
        .nest("/orgs", organizations::routes().merge(credits::routes()))
        .nest("/projects", projects::routes())
        .nest("/keys/api", api_keys::routes())
        .nest("/chats", chats::routes())
}

/// Routes authorized by an `apiKey` field in the JSON body
pub fn api_key_routes() -> Router<AppState> {
    Router::new().route("/keys/verify", post(key_verification::verify_api_key))
}

/// The full `/api/v1` router with each group behind its own middleware
pub fn router(state: AppState) -> Router {
    let v1 = public_routes()
        .merge(
            protected_routes().layer(axum::middleware::from_fn_with_state(
                state.clone(),
                middleware::auth_middleware,
            )),
        )
        .merge(
            api_key_routes().layer(axum::middleware::from_fn_with_state(
                state.clone(),
                middleware::api_key_middleware,
            )),
        );

    Router::new().nest("/api/v1", v1).with_state(state)
}
