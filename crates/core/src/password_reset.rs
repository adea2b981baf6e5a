//! Stateless password-reset tokens.
//!
//! A token is `<issued_at hex>-<hmac hex>` where the HMAC-SHA256 covers the
//! user id, the user's *current* password hash, and the issue timestamp.
//! Nothing is stored server-side: changing the password changes the hash,
//! which invalidates every outstanding token for that user.

use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::hashing::hex_encode;
use crate::types::DbId;

type HmacSha256 = Hmac<Sha256>;

/// Default token lifetime in hours.
pub const DEFAULT_RESET_EXPIRY_HOURS: i64 = 24;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResetTokenError {
    #[error("Reset token is malformed")]
    Malformed,

    #[error("Reset token has expired")]
    Expired,

    #[error("Reset token is invalid")]
    Invalid,
}

/// Issue a reset token for `user_id` at unix time `issued_at`.
pub fn make_token(secret: &[u8], user_id: DbId, password_hash: &str, issued_at: i64) -> String {
    let mac = signature(secret, user_id, password_hash, issued_at).finalize();
    format!("{issued_at:x}-{}", hex_encode(mac.into_bytes()))
}

/// Verify a token presented at unix time `now`.
///
/// Fails with [`ResetTokenError::Expired`] once `max_age_secs` have passed,
/// and with [`ResetTokenError::Invalid`] when the signature does not match
/// (wrong user, password already changed, or tampering).
pub fn check_token(
    secret: &[u8],
    user_id: DbId,
    password_hash: &str,
    token: &str,
    now: i64,
    max_age_secs: i64,
) -> Result<(), ResetTokenError> {
    let (ts_hex, sig_hex) = token.split_once('-').ok_or(ResetTokenError::Malformed)?;
    let issued_at = i64::from_str_radix(ts_hex, 16).map_err(|_| ResetTokenError::Malformed)?;
    let sig = hex_decode(sig_hex).ok_or(ResetTokenError::Malformed)?;

    signature(secret, user_id, password_hash, issued_at)
        .verify_slice(&sig)
        .map_err(|_| ResetTokenError::Invalid)?;

    if issued_at > now || now - issued_at > max_age_secs {
        return Err(ResetTokenError::Expired);
    }
    Ok(())
}

fn signature(secret: &[u8], user_id: DbId, password_hash: &str, issued_at: i64) -> HmacSha256 {
    let mut mac = HmacSha256::new_from_slice(secret).expect("HMAC accepts any key length");
    mac.update(&user_id.to_be_bytes());
    mac.update(password_hash.as_bytes());
    mac.update(&issued_at.to_be_bytes());
    mac
}

fn hex_decode(s: &str) -> Option<Vec<u8>> {
    if s.len() % 2 != 0 {
        return None;
    }
    (0..s.len())
        .step_by(2)
        .map(|i| s.get(i..i + 2).and_then(|b| u8::from_str_radix(b, 16).ok()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &[u8] = b"test-secret-that-is-long-enough-for-hmac";
    const HASH: &str = "$argon2id$v=19$m=19456,t=2,p=1$salt$hash";
    const DAY: i64 = 24 * 3600;

    #[test]
    fn fresh_token_verifies() {
        let token = make_token(SECRET, 7, HASH, 1_000);
        assert_eq!(check_token(SECRET, 7, HASH, &token, 1_060, DAY), Ok(()));
    }

    #[test]
    fn token_for_other_user_is_invalid() {
        let token = make_token(SECRET, 7, HASH, 1_000);
        assert_eq!(
            check_token(SECRET, 8, HASH, &token, 1_060, DAY),
            Err(ResetTokenError::Invalid)
        );
    }

    #[test]
    fn password_change_invalidates_token() {
        let token = make_token(SECRET, 7, HASH, 1_000);
        assert_eq!(
            check_token(SECRET, 7, "$argon2id$new", &token, 1_060, DAY),
            Err(ResetTokenError::Invalid)
        );
    }

    #[test]
    fn expired_token_is_rejected() {
        let token = make_token(SECRET, 7, HASH, 1_000);
        assert_eq!(
            check_token(SECRET, 7, HASH, &token, 1_000 + DAY + 1, DAY),
            Err(ResetTokenError::Expired)
        );
    }

    #[test]
    fn garbage_is_malformed() {
        assert_eq!(
            check_token(SECRET, 7, HASH, "not-a-token", 0, DAY),
            Err(ResetTokenError::Malformed)
        );
        assert_eq!(
            check_token(SECRET, 7, HASH, "nodash", 0, DAY),
            Err(ResetTokenError::Malformed)
        );
    }

    #[test]
    fn tampered_timestamp_is_invalid() {
        let token = make_token(SECRET, 7, HASH, 1_000);
        let (_, sig) = token.split_once('-').unwrap();
        let forged = format!("{:x}-{sig}", 2_000);
        assert_eq!(
            check_token(SECRET, 7, HASH, &forged, 2_010, DAY),
            Err(ResetTokenError::Invalid)
        );
    }
}
