//! Middleware components
//!
//! This module contains middleware for:
//! - Session authentication
//! - API key authorization of request bodies

pub mod api_key;
pub mod auth;

pub use api_key::{api_key_middleware, ApiKeyContext};
pub use auth::{auth_middleware, AuthUser};
