//! Handlers for the `/books` resource.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use bookstore_core::catalog::{
    normalize_author_ids, normalize_isbn, validate_pages, validate_price, validate_rating,
    validate_required_text, EntityType, MAX_TITLE_LEN,
};
use bookstore_core::error::CoreError;
use bookstore_core::integrity::{BulkDeleteReport, DeletionCheck};
use bookstore_core::inventory::validate_stock;
use bookstore_core::types::DbId;
use bookstore_db::models::book::{BookDetail, BookListItem, BookListParams, CreateBook, UpdateBook};
use bookstore_db::repositories::{AuthorRepo, BookRepo, CategoryRepo};

use super::deletion::{bulk_delete_entities, check_entity, delete_entity};
use crate::error::{validation, AppError, AppResult};
use crate::middleware::rbac::{RequireAuth, RequireModerator};
use crate::query::BulkDeleteRequest;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/books
///
/// Supports `?search=`, `?category=`, `?author=`, `?ordering=`
/// (`title`, `price`, `created_at`, default `-created_at`),
/// `?include_inactive=` and `?limit=&offset=`.
pub async fn list_books(
    State(state): State<AppState>,
    Query(params): Query<BookListParams>,
) -> AppResult<Json<DataResponse<Vec<BookListItem>>>> {
    let books = BookRepo::list(&state.pool, &params).await?;
    Ok(Json(DataResponse { data: books }))
}

/// POST /api/v1/books
///
/// The caller becomes the book's creator.
pub async fn create_book(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Json(input): Json<CreateBook>,
) -> AppResult<(StatusCode, Json<BookDetail>)> {
    let input = CreateBook {
        title: validate_required_text(&input.title, "Title", MAX_TITLE_LEN).map_err(validation)?,
        isbn: normalize_isbn(&input.isbn).map_err(validation)?,
        description: input.description.trim().to_string(),
        category_id: input.category_id,
        author_ids: normalize_author_ids(&input.author_ids).map_err(validation)?,
        price: validate_price(input.price).map_err(validation)?,
        stock_quantity: validate_stock(input.stock_quantity)?.into(),
        condition: input.condition,
        publication_date: input.publication_date,
        pages: input.pages.map(validate_pages).transpose().map_err(validation)?,
        rating: input.rating.map(validate_rating).transpose().map_err(validation)?,
        is_active: input.is_active,
    };
    ensure_references(&state, Some(input.category_id), Some(&input.author_ids)).await?;

    let book = BookRepo::create(&state.pool, &input, Some(user.user_id)).await?;
    tracing::info!(book_id = book.id, user_id = user.user_id, "Book created");

    let detail = find_detail(&state, book.id).await?;
    Ok((StatusCode::CREATED, Json(detail)))
}

/// GET /api/v1/books/{id}
///
/// Includes the category, the authors and the creator's username.
pub async fn get_book(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<BookDetail>> {
    let detail = find_detail(&state, id).await?;
    Ok(Json(detail))
}

/// PUT /api/v1/books/{id}
///
/// A present `author_ids` replaces the whole author set.
pub async fn update_book(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateBook>,
) -> AppResult<Json<BookDetail>> {
    let input = UpdateBook {
        title: input
            .title
            .map(|t| validate_required_text(&t, "Title", MAX_TITLE_LEN))
            .transpose()
            .map_err(validation)?,
        isbn: input
            .isbn
            .map(|i| normalize_isbn(&i))
            .transpose()
            .map_err(validation)?,
        description: input.description.map(|d| d.trim().to_string()),
        category_id: input.category_id,
        author_ids: input
            .author_ids
            .map(|ids| normalize_author_ids(&ids))
            .transpose()
            .map_err(validation)?,
        price: input.price.map(validate_price).transpose().map_err(validation)?,
        stock_quantity: input
            .stock_quantity
            .map(|q| validate_stock(q).map(i64::from))
            .transpose()?,
        condition: input.condition,
        publication_date: input.publication_date,
        pages: input.pages.map(validate_pages).transpose().map_err(validation)?,
        rating: input.rating.map(validate_rating).transpose().map_err(validation)?,
        is_active: input.is_active,
    };
    ensure_references(&state, input.category_id, input.author_ids.as_deref()).await?;

    BookRepo::update(&state.pool, id, &input, Some(user.user_id))
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Book", id }))?;

    let detail = find_detail(&state, id).await?;
    Ok(Json(detail))
}

/// DELETE /api/v1/books/{id}
///
/// Removes the book's audit records and author links with it.
pub async fn delete_book(
    State(state): State<AppState>,
    RequireModerator(user): RequireModerator,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    delete_entity(&state, &user, EntityType::Book, id).await
}

/// GET /api/v1/books/{id}/deletion-check
pub async fn book_deletion_check(
    State(state): State<AppState>,
    RequireAuth(_user): RequireAuth,
    Path(id): Path<DbId>,
) -> AppResult<Json<DeletionCheck>> {
    check_entity(&state, EntityType::Book, id).await
}

/// POST /api/v1/books/bulk-delete
pub async fn bulk_delete_books(
    State(state): State<AppState>,
    RequireModerator(user): RequireModerator,
    Json(input): Json<BulkDeleteRequest>,
) -> AppResult<Json<BulkDeleteReport>> {
    bulk_delete_entities(&state, &user, EntityType::Book, input).await
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn find_detail(state: &AppState, id: DbId) -> AppResult<BookDetail> {
    BookRepo::find_detail(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Book", id }))
}

/// Reject unknown category or author ids with a 400 naming them.
async fn ensure_references(
    state: &AppState,
    category_id: Option<DbId>,
    author_ids: Option<&[DbId]>,
) -> AppResult<()> {
    if let Some(category_id) = category_id {
        if !CategoryRepo::exists(&state.pool, category_id).await? {
            return Err(validation(format!(
                "Category with id {category_id} does not exist"
            )));
        }
    }
    if let Some(author_ids) = author_ids {
        let missing = AuthorRepo::find_missing(&state.pool, author_ids).await?;
        if !missing.is_empty() {
            let ids: Vec<String> = missing.iter().map(ToString::to_string).collect();
            return Err(validation(format!(
                "Unknown author ids: {}",
                ids.join(", ")
            )));
        }
    }
    Ok(())
}
