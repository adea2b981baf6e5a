use std::fmt::Display;
use std::str::FromStr;

use bookstore_core::password_reset::DEFAULT_RESET_EXPIRY_HOURS;

use crate::auth::jwt::JwtConfig;
use crate::mail::EmailConfig;

/// Server configuration loaded from environment variables.
///
/// Everything except `JWT_SECRET` has a default suitable for local
/// development.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Allowed CORS origins, from comma-separated `CORS_ORIGINS`.
    pub cors_origins: Vec<String>,
    pub request_timeout_secs: u64,
    pub jwt: JwtConfig,
    /// Base URL of the web client, used to build password-reset links.
    pub frontend_url: String,
    pub password_reset_expiry_hours: i64,
    /// SMTP settings. `None` disables outgoing email.
    pub email: Option<EmailConfig>,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                       | Default                 |
    /// |-------------------------------|-------------------------|
    /// | `HOST`                        | `0.0.0.0`               |
    /// | `PORT`                        | `3000`                  |
    /// | `CORS_ORIGINS`                | `http://localhost:5173` |
    /// | `REQUEST_TIMEOUT_SECS`        | `30`                    |
    /// | `FRONTEND_URL`                | `http://localhost:5173` |
    /// | `PASSWORD_RESET_EXPIRY_HOURS` | `24`                    |
    ///
    /// JWT and SMTP variables are documented on [`JwtConfig::from_env`] and
    /// [`EmailConfig::from_env`].
    ///
    /// # Panics
    ///
    /// Panics on a value that does not parse, so misconfiguration stops the
    /// server at start-up.
    pub fn from_env() -> Self {
        let cors_origins = env_or("CORS_ORIGINS", "http://localhost:5173")
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let frontend_url = env_or("FRONTEND_URL", "http://localhost:5173")
            .trim_end_matches('/')
            .to_string();

        Self {
            host: env_or("HOST", "0.0.0.0"),
            port: env_parse("PORT", 3000),
            cors_origins,
            request_timeout_secs: env_parse("REQUEST_TIMEOUT_SECS", 30),
            jwt: JwtConfig::from_env(),
            frontend_url,
            password_reset_expiry_hours: env_parse(
                "PASSWORD_RESET_EXPIRY_HOURS",
                DEFAULT_RESET_EXPIRY_HOURS,
            ),
            email: EmailConfig::from_env(),
        }
    }
}

/// String variable with a default.
pub(crate) fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parsed variable with a default. Panics when set but unparsable.
pub(crate) fn env_parse<T>(key: &str, default: T) -> T
where
    T: FromStr,
    T::Err: Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .unwrap_or_else(|e| panic!("{key} has an invalid value '{raw}': {e}")),
        Err(_) => default,
    }
}
