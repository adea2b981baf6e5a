pub mod admin;
pub mod audit;
pub mod auth;
pub mod authors;
pub mod books;
pub mod categories;
pub mod health;
pub mod users;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// ```text
/// /auth/register                                   register (public)
/// /auth/login                                      login (public)
/// /auth/refresh                                    refresh (public)
/// /auth/logout                                     logout (requires auth)
/// /auth/password-reset                             request reset link (public)
/// /auth/password-reset/confirm/{uid}/{token}       set new password (public)
///
/// /users/me                                        get, update own profile
/// /users/me/password                               change own password
///
/// /admin/users                                     list (admin only)
/// /admin/users/{id}                                update role / active flag
///
/// /categories                                      list, create
/// /categories/bulk-delete                          bulk delete (moderator)
/// /categories/{id}                                 get, update, delete
/// /categories/{id}/deletion-check                  can the category be deleted
/// /categories/{id}/books                           books in the category
///
/// /authors                                         list, create
/// /authors/bulk-delete                             bulk delete (moderator)
/// /authors/{id}                                    get, update, delete
/// /authors/{id}/deletion-check                     can the author be deleted
/// /authors/{id}/books                              books by the author
///
/// /books                                           list, create
/// /books/bulk-delete                               bulk delete (moderator)
/// /books/low-stock                                 stock at or below threshold
/// /books/in-stock                                  stock above zero
/// /books/{id}                                      get, update, delete
/// /books/{id}/deletion-check                       can the book be deleted
/// /books/{id}/stock                                set stock (PUT)
/// /books/{id}/stock/add                            add copies (POST)
/// /books/{id}/stock/remove                         remove copies (POST)
///
/// /audit/{entity_type}/{id}                        audit trail (moderator)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/users", users::router())
        .nest("/admin", admin::router())
        .nest("/categories", categories::router())
        .nest("/authors", authors::router())
        .nest("/books", books::router())
        .nest("/audit", audit::router())
}
