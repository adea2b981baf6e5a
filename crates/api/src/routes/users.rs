//! Route definitions for the `/users` resource.

use axum::routing::{get, put};
use axum::Router;

use crate::handlers::users;
use crate::state::AppState;

/// Routes mounted at `/users`. All require authentication.
///
/// ```text
/// GET  /me           -> get_me
/// PUT  /me           -> update_me
/// PUT  /me/password  -> change_password
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/me", get(users::get_me).put(users::update_me))
        .route("/me/password", put(users::change_password))
}
