//! Handlers for the `/admin` resource (user management).
//!
//! All handlers require the `admin` role via [`RequireAdmin`].

use axum::extract::{Path, State};
use axum::Json;
use bookstore_core::error::CoreError;
use bookstore_core::types::DbId;
use bookstore_db::models::user::{UpdateUser, UserResponse};
use bookstore_db::repositories::{RoleRepo, UserRepo};

use crate::error::{validation, AppError, AppResult};
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/admin/users
pub async fn list_users(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> AppResult<Json<DataResponse<Vec<UserResponse>>>> {
    let users = UserRepo::list(&state.pool).await?;

    let mut responses = Vec::with_capacity(users.len());
    for user in users {
        let role = RoleRepo::resolve_name(&state.pool, user.role_id).await?;
        responses.push(UserResponse::from_user(user, role));
    }

    Ok(Json(DataResponse { data: responses }))
}

/// PUT /api/v1/admin/users/{id}
///
/// Change a user's role or active flag. Admins cannot deactivate
/// themselves.
pub async fn update_user(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateUser>,
) -> AppResult<Json<UserResponse>> {
    if id == admin.user_id && input.is_active == Some(false) {
        return Err(validation("You cannot deactivate your own account"));
    }
    if let Some(role_id) = input.role_id {
        if !RoleRepo::exists(&state.pool, role_id).await? {
            return Err(validation(format!("Role with id {role_id} does not exist")));
        }
    }

    let user = UserRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "User", id }))?;
    tracing::info!(
        user_id = id,
        admin_id = admin.user_id,
        role_id = user.role_id,
        is_active = user.is_active,
        "User updated by admin",
    );

    let role = RoleRepo::resolve_name(&state.pool, user.role_id).await?;
    Ok(Json(UserResponse::from_user(user, role)))
}
