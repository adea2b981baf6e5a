//! Handlers for the `/auth` resource: registration, login, token refresh,
//! logout and password reset.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use bookstore_core::error::CoreError;
use bookstore_core::roles::DEFAULT_ROLE_ID;
use bookstore_core::types::DbId;
use bookstore_db::models::session::NewSession;
use bookstore_db::models::user::{CreateUser, User, UserResponse};
use bookstore_db::repositories::{RoleRepo, SessionRepo, UserRepo};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::auth::jwt::{generate_access_token, hash_refresh_token, RefreshToken};
use crate::auth::password::{hash_password, validate_new_password, verify_password};
use crate::auth::reset::{reset_link, verify_reset_token};
use crate::error::{validation, AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DetailResponse;
use crate::state::AppState;

/// Maximum consecutive failed login attempts before locking the account.
const MAX_FAILED_ATTEMPTS: i32 = 5;

/// Duration in minutes to lock an account after exceeding failed attempts.
const LOCK_DURATION_MINS: i64 = 15;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /auth/register`.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 3, max = 150, message = "Username must be 3 to 150 characters"))]
    pub username: String,
    #[validate(email(message = "Enter a valid email address"))]
    pub email: String,
    pub password: String,
    pub password2: String,
    #[serde(default)]
    #[validate(length(max = 150, message = "First name must be at most 150 characters"))]
    pub first_name: String,
    #[serde(default)]
    #[validate(length(max = 150, message = "Last name must be at most 150 characters"))]
    pub last_name: String,
}

/// Request body for `POST /auth/login`.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Request body for `POST /auth/refresh`.
#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Request body for `POST /auth/password-reset`.
#[derive(Debug, Deserialize, Validate)]
pub struct PasswordResetRequest {
    #[validate(email(message = "Enter a valid email address"))]
    pub email: String,
}

/// Request body for `POST /auth/password-reset/confirm/{uid}/{token}`.
#[derive(Debug, Deserialize)]
pub struct PasswordResetConfirm {
    pub new_password: String,
    pub new_password2: String,
}

/// Successful authentication response returned by login and refresh.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub refresh_token: String,
    /// Access token lifetime in seconds.
    pub expires_in: i64,
    pub user: UserInfo,
}

/// Public user info embedded in [`AuthResponse`].
#[derive(Debug, Serialize)]
pub struct UserInfo {
    pub id: DbId,
    pub username: String,
    pub email: String,
    pub role: String,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/auth/register
///
/// Self-registration always creates a plain `user`. Returns 201 with the
/// new profile; duplicate usernames or emails yield 409.
pub async fn register(
    State(state): State<AppState>,
    Json(input): Json<RegisterRequest>,
) -> AppResult<(StatusCode, Json<UserResponse>)> {
    input.validate()?;
    let username = input.username.trim().to_string();
    validate_username(&username).map_err(validation)?;
    validate_new_password(&input.password, &input.password2).map_err(validation)?;

    let password_hash = hash_password(&input.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    let user = UserRepo::create(
        &state.pool,
        &CreateUser {
            username,
            email: input.email.trim().to_lowercase(),
            password_hash,
            first_name: input.first_name.trim().to_string(),
            last_name: input.last_name.trim().to_string(),
            role_id: DEFAULT_ROLE_ID,
        },
    )
    .await?;
    tracing::info!(user_id = user.id, username = %user.username, "User registered");

    let role = RoleRepo::resolve_name(&state.pool, user.role_id).await?;
    Ok((StatusCode::CREATED, Json(UserResponse::from_user(user, role))))
}

/// POST /api/v1/auth/login
///
/// Authenticate with username + password. Returns access and refresh tokens.
pub async fn login(
    State(state): State<AppState>,
    Json(input): Json<LoginRequest>,
) -> AppResult<Json<AuthResponse>> {
    let user = UserRepo::find_by_username(&state.pool, &input.username)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized(
                "Invalid username or password".into(),
            ))
        })?;

    if !user.is_active {
        return Err(AppError::Core(CoreError::Forbidden(
            "Account is deactivated".into(),
        )));
    }

    if let Some(locked_until) = user.locked_until {
        if locked_until > Utc::now() {
            return Err(AppError::Core(CoreError::Forbidden(
                "Account is temporarily locked. Try again later.".into(),
            )));
        }
    }

    let password_valid = verify_password(&input.password, &user.password_hash)
        .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;

    if !password_valid {
        UserRepo::increment_failed_login(&state.pool, user.id).await?;

        let failed = user.failed_login_count + 1;
        tracing::warn!(user_id = user.id, failed, "Failed login attempt");
        if failed >= MAX_FAILED_ATTEMPTS {
            let lock_until = Utc::now() + chrono::Duration::minutes(LOCK_DURATION_MINS);
            UserRepo::lock_account(&state.pool, user.id, lock_until).await?;
            tracing::warn!(user_id = user.id, %lock_until, "Account locked");
        }

        return Err(AppError::Core(CoreError::Unauthorized(
            "Invalid username or password".into(),
        )));
    }

    UserRepo::record_successful_login(&state.pool, user.id).await?;

    let role_name = RoleRepo::resolve_name(&state.pool, user.role_id).await?;
    let response = create_auth_response(&state, &user, &role_name, None).await?;
    Ok(Json(response))
}

/// POST /api/v1/auth/refresh
///
/// Exchange a live refresh token for a new token pair. The old session is
/// revoked in the same transaction that opens the new one; replaying a
/// rotated token yields 401.
pub async fn refresh(
    State(state): State<AppState>,
    Json(input): Json<RefreshRequest>,
) -> AppResult<Json<AuthResponse>> {
    let token_hash = hash_refresh_token(&input.refresh_token);

    let session = SessionRepo::find_live(&state.pool, &token_hash)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized(
                "Invalid or expired refresh token".into(),
            ))
        })?;

    let user = UserRepo::find_by_id(&state.pool, session.user_id)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::Unauthorized("User no longer exists".into())))?;

    if !user.is_active {
        return Err(AppError::Core(CoreError::Forbidden(
            "Account is deactivated".into(),
        )));
    }

    let role_name = RoleRepo::resolve_name(&state.pool, user.role_id).await?;
    let response = create_auth_response(&state, &user, &role_name, Some(session.id)).await?;
    Ok(Json(response))
}

/// POST /api/v1/auth/logout
///
/// Revoke all sessions for the authenticated user. Returns 204 No Content.
pub async fn logout(State(state): State<AppState>, auth_user: AuthUser) -> AppResult<StatusCode> {
    let revoked = SessionRepo::revoke_all(&state.pool, auth_user.user_id).await?;
    tracing::info!(user_id = auth_user.user_id, revoked, "User logged out");
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/auth/password-reset
///
/// Mails a reset link to the account with this email. Unknown (or
/// deactivated) addresses are rejected with 400. Without SMTP the link is
/// only logged.
pub async fn request_password_reset(
    State(state): State<AppState>,
    Json(input): Json<PasswordResetRequest>,
) -> AppResult<Json<DetailResponse>> {
    input.validate()?;
    let email = input.email.trim().to_lowercase();

    let user = UserRepo::find_by_email(&state.pool, &email)
        .await?
        .filter(|u| u.is_active)
        .ok_or_else(|| validation("No active user is registered with this email address"))?;

    let link = reset_link(&state.config, &user, Utc::now().timestamp());

    match &state.mailer {
        Some(mailer) => {
            mailer
                .send_password_reset(&user.email, &user.username, &link)
                .await
                .map_err(|e| AppError::InternalError(format!("Password reset email failed: {e}")))?;
        }
        None => {
            tracing::info!(user_id = user.id, %link, "SMTP not configured, password reset link");
        }
    }

    Ok(Json(DetailResponse::new(
        "Password reset email has been sent.",
    )))
}

/// POST /api/v1/auth/password-reset/confirm/{uid}/{token}
///
/// Sets a new password and revokes every session of the user. The token
/// stops working once the password has changed.
pub async fn confirm_password_reset(
    State(state): State<AppState>,
    Path((uid, token)): Path<(DbId, String)>,
    Json(input): Json<PasswordResetConfirm>,
) -> AppResult<Json<DetailResponse>> {
    let user = UserRepo::find_by_id(&state.pool, uid)
        .await?
        .ok_or_else(|| validation("Invalid password reset link"))?;

    verify_reset_token(&state.config, &user, &token, Utc::now().timestamp()).map_err(|e| {
        tracing::warn!(user_id = uid, error = %e, "Rejected password reset token");
        validation(e.to_string())
    })?;

    validate_new_password(&input.new_password, &input.new_password2).map_err(validation)?;

    let password_hash = hash_password(&input.new_password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;
    UserRepo::update_password(&state.pool, user.id, &password_hash).await?;
    SessionRepo::revoke_all(&state.pool, user.id).await?;
    tracing::info!(user_id = user.id, "Password reset completed");

    Ok(Json(DetailResponse::new("Password has been reset.")))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Issue an access token and a refresh token for `user`.
///
/// With `replaces` set the new session rotates that one; a session that was
/// already revoked by a concurrent refresh makes this fail with 401.
async fn create_auth_response(
    state: &AppState,
    user: &User,
    role: &str,
    replaces: Option<DbId>,
) -> AppResult<AuthResponse> {
    let access_token = generate_access_token(user.id, role, &state.config.jwt)
        .map_err(|e| AppError::InternalError(format!("Token generation error: {e}")))?;

    let refresh = RefreshToken::generate();
    let next = NewSession {
        user_id: user.id,
        refresh_token_hash: &refresh.hash,
        expires_at: Utc::now()
            + chrono::Duration::days(state.config.jwt.refresh_token_expiry_days),
    };

    match replaces {
        None => {
            SessionRepo::open(&state.pool, &next).await?;
        }
        Some(old_id) => {
            SessionRepo::rotate(&state.pool, old_id, &next)
                .await?
                .ok_or_else(|| {
                    tracing::warn!(user_id = user.id, session_id = old_id, "Refresh token replayed");
                    AppError::Core(CoreError::Unauthorized(
                        "Invalid or expired refresh token".into(),
                    ))
                })?;
        }
    }

    Ok(AuthResponse {
        access_token,
        refresh_token: refresh.plaintext,
        expires_in: state.config.jwt.access_token_expiry_secs(),
        user: UserInfo {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            role: role.to_string(),
        },
    })
}

/// Letters, digits and `@ . + - _` only.
fn validate_username(username: &str) -> Result<(), String> {
    let allowed = |c: char| c.is_alphanumeric() || "@.+-_".contains(c);
    if !username.chars().all(allowed) {
        return Err(
            "Username may contain only letters, digits and @/./+/-/_ characters".to_string(),
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn usernames_allow_common_symbols() {
        assert!(validate_username("jane.doe+books@shop_1-a").is_ok());
        assert!(validate_username("jane doe").is_err());
        assert!(validate_username("jane/doe").is_err());
    }

    #[test]
    fn register_request_checks_email_and_length() {
        let input = RegisterRequest {
            username: "ab".into(),
            email: "not-an-email".into(),
            password: "bookworm-42".into(),
            password2: "bookworm-42".into(),
            first_name: String::new(),
            last_name: String::new(),
        };
        let errors = input.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("username"));
        assert!(fields.contains_key("email"));
    }
}
