//! Route definitions for the `/categories` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::categories;
use crate::state::AppState;

/// Routes mounted at `/categories`.
///
/// ```text
/// GET    /                      -> list_categories
/// POST   /                      -> create_category
/// POST   /bulk-delete           -> bulk_delete_categories
/// GET    /{id}                  -> get_category
/// PUT    /{id}                  -> update_category
/// DELETE /{id}                  -> delete_category
/// GET    /{id}/deletion-check   -> category_deletion_check
/// GET    /{id}/books            -> category_books
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(categories::list_categories).post(categories::create_category),
        )
        .route("/bulk-delete", post(categories::bulk_delete_categories))
        .route(
            "/{id}",
            get(categories::get_category)
                .put(categories::update_category)
                .delete(categories::delete_category),
        )
        .route(
            "/{id}/deletion-check",
            get(categories::category_deletion_check),
        )
        .route("/{id}/books", get(categories::category_books))
}
