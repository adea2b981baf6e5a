//! Route definitions for the `/auth` resource.

use axum::routing::post;
use axum::Router;

use crate::handlers::auth;
use crate::state::AppState;

/// Routes mounted at `/auth`.
///
/// ```text
/// POST /register                               -> register
/// POST /login                                  -> login
/// POST /refresh                                -> refresh
/// POST /logout                                 -> logout (requires auth)
/// POST /password-reset                         -> request_password_reset
/// POST /password-reset/confirm/{uid}/{token}   -> confirm_password_reset
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/refresh", post(auth::refresh))
        .route("/logout", post(auth::logout))
        .route("/password-reset", post(auth::request_password_reset))
        .route(
            "/password-reset/confirm/{uid}/{token}",
            post(auth::confirm_password_reset),
        )
}
