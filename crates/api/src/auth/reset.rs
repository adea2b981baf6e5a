//! Password-reset links.
//!
//! Tokens come from [`bookstore_core::password_reset`] and are keyed by the
//! JWT secret, so rotating `JWT_SECRET` also voids pending reset links.

use bookstore_core::password_reset::{check_token, make_token, ResetTokenError};
use bookstore_db::models::user::User;

use crate::config::ServerConfig;

/// Build the link mailed to the user: `{FRONTEND_URL}/reset-password/{uid}/{token}/`.
pub fn reset_link(config: &ServerConfig, user: &User, now: i64) -> String {
    let token = make_token(
        config.jwt.secret.as_bytes(),
        user.id,
        &user.password_hash,
        now,
    );
    format!("{}/reset-password/{}/{token}/", config.frontend_url, user.id)
}

/// Check a token presented for `user` at unix time `now`.
pub fn verify_reset_token(
    config: &ServerConfig,
    user: &User,
    token: &str,
    now: i64,
) -> Result<(), ResetTokenError> {
    check_token(
        config.jwt.secret.as_bytes(),
        user.id,
        &user.password_hash,
        token,
        now,
        config.password_reset_expiry_hours * 3600,
    )
}
