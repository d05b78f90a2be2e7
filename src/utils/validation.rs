//! Input validation utilities

use validator::Validate;

use super::error::{AppError, AppResult};

/// Largest page accepted by paginated listings
pub const MAX_PAGE_SIZE: u32 = 200;

/// Run `validator` derive rules on a request body.
pub fn validate_request<T: Validate>(body: &T) -> AppResult<()> {
    body.validate().map_err(AppError::from)
}

/// Treat blank text as "not provided".
pub fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Clamp a requested page size into `1..=MAX_PAGE_SIZE`.
pub fn clamp_page_size(limit: u32) -> u32 {
    limit.clamp(1, MAX_PAGE_SIZE)
}
