//! Business logic services

pub mod api_keys;
pub mod authorization;
pub mod session;

pub use api_keys::{ApiKeyChanges, ApiKeyError, ApiKeyService};
pub use authorization::{authorize, AuthorizationContext, AuthorizationError};
pub use session::SessionResolver;
