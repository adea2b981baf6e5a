//! Handlers for `/users/me`: the caller's own profile and password.

use axum::extract::State;
use axum::Json;
use bookstore_core::error::CoreError;
use bookstore_db::models::user::{UpdateProfile, User, UserResponse};
use bookstore_db::repositories::{RoleRepo, UserRepo};
use serde::Deserialize;
use validator::Validate;

use crate::auth::password::{hash_password, validate_new_password, verify_password};
use crate::error::{validation, AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DetailResponse;
use crate::state::AppState;

/// Request body for `PUT /users/me`. Username and role cannot be changed here.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    #[validate(email(message = "Enter a valid email address"))]
    pub email: Option<String>,
    #[validate(length(max = 150, message = "First name must be at most 150 characters"))]
    pub first_name: Option<String>,
    #[validate(length(max = 150, message = "Last name must be at most 150 characters"))]
    pub last_name: Option<String>,
    pub bio: Option<String>,
}

/// Request body for `PUT /users/me/password`.
#[derive(Debug, Deserialize)]
pub struct ChangePasswordRequest {
    pub old_password: String,
    pub new_password: String,
    pub new_password2: String,
}

/// GET /api/v1/users/me
pub async fn get_me(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> AppResult<Json<UserResponse>> {
    let user = find_current_user(&state, &auth_user).await?;
    let role = RoleRepo::resolve_name(&state.pool, user.role_id).await?;
    Ok(Json(UserResponse::from_user(user, role)))
}

/// PUT /api/v1/users/me
pub async fn update_me(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(input): Json<UpdateProfileRequest>,
) -> AppResult<Json<UserResponse>> {
    input.validate()?;

    let update = UpdateProfile {
        email: input.email.map(|e| e.trim().to_lowercase()),
        first_name: input.first_name.map(|n| n.trim().to_string()),
        last_name: input.last_name.map(|n| n.trim().to_string()),
        bio: input.bio,
    };
    let user = UserRepo::update_profile(&state.pool, auth_user.user_id, &update)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "User",
            id: auth_user.user_id,
        }))?;

    let role = RoleRepo::resolve_name(&state.pool, user.role_id).await?;
    Ok(Json(UserResponse::from_user(user, role)))
}

/// PUT /api/v1/users/me/password
///
/// Requires the current password. Existing sessions stay valid.
pub async fn change_password(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(input): Json<ChangePasswordRequest>,
) -> AppResult<Json<DetailResponse>> {
    let user = find_current_user(&state, &auth_user).await?;

    let old_valid = verify_password(&input.old_password, &user.password_hash)
        .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;
    if !old_valid {
        return Err(validation("Old password is not correct"));
    }
    validate_new_password(&input.new_password, &input.new_password2).map_err(validation)?;

    let password_hash = hash_password(&input.new_password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;
    UserRepo::update_password(&state.pool, user.id, &password_hash).await?;
    tracing::info!(user_id = user.id, "Password changed");

    Ok(Json(DetailResponse::new("Password updated successfully.")))
}

async fn find_current_user(state: &AppState, auth_user: &AuthUser) -> AppResult<User> {
    UserRepo::find_by_id(&state.pool, auth_user.user_id)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::Unauthorized("User no longer exists".into())))
}
