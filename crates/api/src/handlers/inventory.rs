//! Stock-level handlers under `/books`.
//!
//! Changes go through [`BookRepo::adjust_stock`], which locks the book row,
//! so concurrent adjustments never lose an update.

use axum::extract::{Path, State};
use axum::Json;
use bookstore_core::error::CoreError;
use bookstore_core::inventory::{is_low_stock, validate_stock, StockAdjustment};
use bookstore_core::types::DbId;
use bookstore_db::models::book::{AdjustStock, Book, SetStock, StockListing};
use bookstore_db::repositories::{BookRepo, StockUpdate};

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireAuth;
use crate::state::AppState;

/// GET /api/v1/books/low-stock
pub async fn low_stock(State(state): State<AppState>) -> AppResult<Json<StockListing>> {
    let books = BookRepo::list_low_stock(&state.pool).await?;
    Ok(Json(StockListing {
        count: books.len(),
        books,
    }))
}

/// GET /api/v1/books/in-stock
pub async fn in_stock(State(state): State<AppState>) -> AppResult<Json<StockListing>> {
    let books = BookRepo::list_in_stock(&state.pool).await?;
    Ok(Json(StockListing {
        count: books.len(),
        books,
    }))
}

/// PUT /api/v1/books/{id}/stock
pub async fn set_stock(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<DbId>,
    Json(input): Json<SetStock>,
) -> AppResult<Json<Book>> {
    let quantity = validate_stock(input.stock_quantity)?;
    apply(&state, user.user_id, id, StockAdjustment::Set(quantity)).await
}

/// POST /api/v1/books/{id}/stock/add
pub async fn add_stock(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<DbId>,
    Json(input): Json<AdjustStock>,
) -> AppResult<Json<Book>> {
    apply(&state, user.user_id, id, StockAdjustment::Add(input.quantity)).await
}

/// POST /api/v1/books/{id}/stock/remove
pub async fn remove_stock(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<DbId>,
    Json(input): Json<AdjustStock>,
) -> AppResult<Json<Book>> {
    apply(&state, user.user_id, id, StockAdjustment::Remove(input.quantity)).await
}

async fn apply(
    state: &AppState,
    actor: DbId,
    id: DbId,
    adjustment: StockAdjustment,
) -> AppResult<Json<Book>> {
    match BookRepo::adjust_stock(&state.pool, id, adjustment, Some(actor)).await? {
        StockUpdate::Updated(book) => {
            if is_low_stock(book.stock_quantity) {
                tracing::info!(
                    book_id = id,
                    stock_quantity = book.stock_quantity,
                    "Book is low on stock"
                );
            }
            Ok(Json(book))
        }
        StockUpdate::NotFound => Err(AppError::Core(CoreError::NotFound { entity: "Book", id })),
        StockUpdate::Rejected(err) => {
            tracing::warn!(book_id = id, error = %err, "Stock adjustment rejected");
            Err(err.into())
        }
    }
}
