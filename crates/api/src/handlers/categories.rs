//! Handlers for the `/categories` resource.
//!
//! Reads are public; create and update need a login; deletes need a
//! moderator.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use bookstore_core::catalog::{validate_required_text, EntityType, MAX_CATEGORY_NAME_LEN};
use bookstore_core::error::CoreError;
use bookstore_core::integrity::{BulkDeleteReport, DeletionCheck};
use bookstore_core::types::DbId;
use bookstore_db::models::category::{Category, CategoryBooks, CreateCategory, UpdateCategory};
use bookstore_db::repositories::{BookRepo, CategoryRepo};

use super::deletion::{bulk_delete_entities, check_entity, delete_entity};
use crate::error::{validation, AppError, AppResult};
use crate::middleware::rbac::{RequireAuth, RequireModerator};
use crate::query::{BulkDeleteRequest, SearchParams};
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/categories
pub async fn list_categories(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> AppResult<Json<DataResponse<Vec<Category>>>> {
    let categories = CategoryRepo::list(&state.pool, params.search.as_deref()).await?;
    Ok(Json(DataResponse { data: categories }))
}

/// POST /api/v1/categories
///
/// Names are unique ignoring case; a duplicate yields 409.
pub async fn create_category(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Json(input): Json<CreateCategory>,
) -> AppResult<(StatusCode, Json<Category>)> {
    let input = CreateCategory {
        name: validate_required_text(&input.name, "Name", MAX_CATEGORY_NAME_LEN)
            .map_err(validation)?,
        description: input.description.trim().to_string(),
    };

    let category = CategoryRepo::create(&state.pool, &input, Some(user.user_id)).await?;
    tracing::info!(category_id = category.id, user_id = user.user_id, "Category created");
    Ok((StatusCode::CREATED, Json(category)))
}

/// GET /api/v1/categories/{id}
pub async fn get_category(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<Category>> {
    let category = find_category(&state, id).await?;
    Ok(Json(category))
}

/// PUT /api/v1/categories/{id}
pub async fn update_category(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateCategory>,
) -> AppResult<Json<Category>> {
    let input = UpdateCategory {
        name: input
            .name
            .map(|n| validate_required_text(&n, "Name", MAX_CATEGORY_NAME_LEN))
            .transpose()
            .map_err(validation)?,
        description: input.description.map(|d| d.trim().to_string()),
    };

    let category = CategoryRepo::update(&state.pool, id, &input, Some(user.user_id))
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Category",
            id,
        }))?;
    Ok(Json(category))
}

/// DELETE /api/v1/categories/{id}
///
/// 409 while any book still references the category.
pub async fn delete_category(
    State(state): State<AppState>,
    RequireModerator(user): RequireModerator,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    delete_entity(&state, &user, EntityType::Category, id).await
}

/// GET /api/v1/categories/{id}/deletion-check
pub async fn category_deletion_check(
    State(state): State<AppState>,
    RequireAuth(_user): RequireAuth,
    Path(id): Path<DbId>,
) -> AppResult<Json<DeletionCheck>> {
    check_entity(&state, EntityType::Category, id).await
}

/// POST /api/v1/categories/bulk-delete
pub async fn bulk_delete_categories(
    State(state): State<AppState>,
    RequireModerator(user): RequireModerator,
    Json(input): Json<BulkDeleteRequest>,
) -> AppResult<Json<BulkDeleteReport>> {
    bulk_delete_entities(&state, &user, EntityType::Category, input).await
}

/// GET /api/v1/categories/{id}/books
pub async fn category_books(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<CategoryBooks>> {
    let category = find_category(&state, id).await?;
    let books = BookRepo::list_by_category(&state.pool, id).await?;
    Ok(Json(CategoryBooks {
        category,
        count: books.len(),
        books,
    }))
}

async fn find_category(state: &AppState, id: DbId) -> AppResult<Category> {
    CategoryRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Category",
            id,
        }))
}
