//! Route definitions for the `/books` resource, including stock levels.

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::{books, inventory};
use crate::state::AppState;

/// Routes mounted at `/books`.
///
/// ```text
/// GET    /                      -> list_books
/// POST   /                      -> create_book
/// POST   /bulk-delete           -> bulk_delete_books
/// GET    /low-stock             -> inventory::low_stock
/// GET    /in-stock              -> inventory::in_stock
/// GET    /{id}                  -> get_book
/// PUT    /{id}                  -> update_book
/// DELETE /{id}                  -> delete_book
/// GET    /{id}/deletion-check   -> book_deletion_check
/// PUT    /{id}/stock            -> inventory::set_stock
/// POST   /{id}/stock/add        -> inventory::add_stock
/// POST   /{id}/stock/remove     -> inventory::remove_stock
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(books::list_books).post(books::create_book))
        .route("/bulk-delete", post(books::bulk_delete_books))
        .route("/low-stock", get(inventory::low_stock))
        .route("/in-stock", get(inventory::in_stock))
        .route(
            "/{id}",
            get(books::get_book)
                .put(books::update_book)
                .delete(books::delete_book),
        )
        .route("/{id}/deletion-check", get(books::book_deletion_check))
        .route("/{id}/stock", put(inventory::set_stock))
        .route("/{id}/stock/add", post(inventory::add_stock))
        .route("/{id}/stock/remove", post(inventory::remove_stock))
}
