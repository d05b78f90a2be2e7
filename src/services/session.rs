//! Session resolution
//!
//! Session tokens are issued by the sign-in flow elsewhere; this service only
//! checks them. Tokens are looked up by their SHA-256 digest.

use anyhow::Result;
use chrono::Utc;
use tracing::debug;

use crate::db::{DbPool, SessionRepository, UserRepository};
use crate::models::{Session, User};
use crate::utils::credentials::hash_token;

pub struct SessionResolver<'a> {
    pool: &'a DbPool,
}

impl<'a> SessionResolver<'a> {
    pub fn new(pool: &'a DbPool) -> Self {
        Self { pool }
    }

    /// Resolve a session token to its live session and user.
    ///
    /// Unknown, expired, and orphaned sessions all resolve to `None`.
    pub async fn resolve(&self, token: &str) -> Result<Option<(User, Session)>> {
        let token = token.trim();
        if token.is_empty() {
            return Ok(None);
        }

        let Some(session) = SessionRepository::new(self.pool)
            .find_by_token_hash(&hash_token(token))
            .await?
        else {
            return Ok(None);
        };

        if session.is_expired(Utc::now()) {
            debug!(session_id = %session.id, "Session expired");
            return Ok(None);
        }

        let Some(user) = UserRepository::new(self.pool)
            .get_by_id(session.user_id)
            .await?
        else {
            debug!(session_id = %session.id, user_id = %session.user_id, "Session user no longer exists");
            return Ok(None);
        };

        Ok(Some((user, session)))
    }
}
