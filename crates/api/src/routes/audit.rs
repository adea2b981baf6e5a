//! Route definitions for the `/audit` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::audit;
use crate::state::AppState;

/// Routes mounted at `/audit`.
///
/// ```text
/// GET /{entity_type}/{id}   -> entity_audit_trail (moderator)
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/{entity_type}/{id}", get(audit::entity_audit_trail))
}
