//! Refresh-token sessions.

use bookstore_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// A row of `user_sessions`. Only the digest of the refresh token is kept.
#[derive(Debug, Clone, FromRow)]
pub struct UserSession {
    pub id: DbId,
    pub user_id: DbId,
    pub refresh_token_hash: String,
    pub expires_at: Timestamp,
    pub revoked_at: Option<Timestamp>,
    pub created_at: Timestamp,
}

/// A session about to be opened for a newly issued refresh token.
#[derive(Debug, Clone, Copy)]
pub struct NewSession<'a> {
    pub user_id: DbId,
    pub refresh_token_hash: &'a str,
    pub expires_at: Timestamp,
}
