//! Access and refresh tokens.
//!
//! Access tokens are short-lived HS256 JWTs carrying [`Claims`]. Refresh
//! tokens are opaque; the server keeps only their SHA-256 digest in
//! `user_sessions`, one row per issued token.

use bookstore_core::hashing::sha256_hex;
use bookstore_core::roles::Role;
use bookstore_core::types::DbId;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::env_parse;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// User id.
    pub sub: DbId,
    /// Role name at the time of issue.
    pub role: String,
    pub exp: i64,
    pub iat: i64,
    pub jti: String,
}

impl Claims {
    fn new(user_id: DbId, role: &str, now: i64, ttl_secs: i64) -> Self {
        Self {
            sub: user_id,
            role: role.to_string(),
            exp: now + ttl_secs,
            iat: now,
            jti: Uuid::new_v4().to_string(),
        }
    }

    /// `None` for a role name this build does not know.
    pub fn known_role(&self) -> Option<Role> {
        Role::from_name(&self.role)
    }
}

#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// Signs access tokens and keys password-reset tokens.
    pub secret: String,
    pub access_token_expiry_mins: i64,
    pub refresh_token_expiry_days: i64,
}

impl JwtConfig {
    /// `JWT_SECRET` (required), `JWT_ACCESS_EXPIRY_MINS` (15) and
    /// `JWT_REFRESH_EXPIRY_DAYS` (7).
    ///
    /// # Panics
    ///
    /// Panics when `JWT_SECRET` is missing or empty.
    pub fn from_env() -> Self {
        let secret = std::env::var("JWT_SECRET").unwrap_or_default();
        assert!(!secret.is_empty(), "JWT_SECRET must be set");

        Self {
            secret,
            access_token_expiry_mins: env_parse("JWT_ACCESS_EXPIRY_MINS", 15),
            refresh_token_expiry_days: env_parse("JWT_REFRESH_EXPIRY_DAYS", 7),
        }
    }

    /// Access token lifetime in seconds, as reported to clients.
    pub fn access_token_expiry_secs(&self) -> i64 {
        self.access_token_expiry_mins * 60
    }

    fn encoding_key(&self) -> EncodingKey {
        EncodingKey::from_secret(self.secret.as_bytes())
    }

    fn decoding_key(&self) -> DecodingKey {
        DecodingKey::from_secret(self.secret.as_bytes())
    }
}

pub fn generate_access_token(
    user_id: DbId,
    role: &str,
    config: &JwtConfig,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = chrono::Utc::now().timestamp();
    let claims = Claims::new(user_id, role, now, config.access_token_expiry_secs());
    encode(&Header::default(), &claims, &config.encoding_key())
}

/// Check signature and expiry, returning the claims.
pub fn validate_token(
    token: &str,
    config: &JwtConfig,
) -> Result<Claims, jsonwebtoken::errors::Error> {
    decode::<Claims>(token, &config.decoding_key(), &Validation::default()).map(|d| d.claims)
}

/// A freshly issued refresh token. `plaintext` goes to the client, `hash`
/// to the session row.
#[derive(Debug, Clone)]
pub struct RefreshToken {
    pub plaintext: String,
    pub hash: String,
}

impl RefreshToken {
    pub fn generate() -> Self {
        let plaintext = format!("{}{}", Uuid::new_v4().simple(), Uuid::new_v4().simple());
        let hash = hash_refresh_token(&plaintext);
        Self { plaintext, hash }
    }
}

pub fn hash_refresh_token(token: &str) -> String {
    sha256_hex(token.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> JwtConfig {
        JwtConfig {
            secret: "test-secret-that-is-long-enough-for-hmac".to_string(),
            access_token_expiry_mins: 15,
            refresh_token_expiry_days: 7,
        }
    }

    #[test]
    fn access_token_round_trips_claims() {
        let config = test_config();
        let token = generate_access_token(42, "moderator", &config).unwrap();

        let claims = validate_token(&token, &config).unwrap();
        assert_eq!(claims.sub, 42);
        assert_eq!(claims.known_role(), Some(Role::Moderator));
        assert_eq!(claims.exp - claims.iat, 15 * 60);
    }

    #[test]
    fn expired_token_fails() {
        let config = test_config();
        // Well past the default 60 second leeway.
        let claims = Claims::new(1, "user", chrono::Utc::now().timestamp() - 600, 300);
        let token = encode(&Header::default(), &claims, &config.encoding_key()).unwrap();

        assert!(validate_token(&token, &config).is_err());
    }

    #[test]
    fn unknown_role_is_not_mapped() {
        let claims = Claims::new(1, "librarian", 0, 60);
        assert_eq!(claims.known_role(), None);
    }

    #[test]
    fn refresh_tokens_are_unique_and_hashed() {
        let a = RefreshToken::generate();
        let b = RefreshToken::generate();
        assert_ne!(a.plaintext, b.plaintext);
        assert_eq!(a.hash, hash_refresh_token(&a.plaintext));
        assert_eq!(a.hash.len(), 64);
    }

    #[test]
    fn token_from_other_secret_is_rejected() {
        let other = JwtConfig {
            secret: "another-secret".to_string(),
            ..test_config()
        };
        let token = generate_access_token(1, "user", &test_config()).unwrap();
        assert!(validate_token(&token, &other).is_err());
    }
}
