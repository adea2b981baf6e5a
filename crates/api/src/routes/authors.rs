//! Route definitions for the `/authors` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::authors;
use crate::state::AppState;

/// Routes mounted at `/authors`.
///
/// ```text
/// GET    /                      -> list_authors
/// POST   /                      -> create_author
/// POST   /bulk-delete           -> bulk_delete_authors
/// GET    /{id}                  -> get_author
/// PUT    /{id}                  -> update_author
/// DELETE /{id}                  -> delete_author
/// GET    /{id}/deletion-check   -> author_deletion_check
/// GET    /{id}/books            -> author_books
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(authors::list_authors).post(authors::create_author))
        .route("/bulk-delete", post(authors::bulk_delete_authors))
        .route(
            "/{id}",
            get(authors::get_author)
                .put(authors::update_author)
                .delete(authors::delete_author),
        )
        .route("/{id}/deletion-check", get(authors::author_deletion_check))
        .route("/{id}/books", get(authors::author_books))
}
