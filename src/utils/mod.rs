//! Shared helpers

pub mod credentials;
pub mod error;
pub mod validation;

pub use error::{AppError, AppResult};
