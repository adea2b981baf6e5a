//! Authentication and authorization extractors.
//!
//! - [`auth::AuthUser`] -- the user behind a JWT Bearer token.
//! - [`rbac::RequireAuth`] -- any authenticated user (catalog create/update).
//! - [`rbac::RequireModerator`] -- moderator or admin (catalog deletes, audit).
//! - [`rbac::RequireAdmin`] -- admin only (user management).

pub mod auth;
pub mod rbac;
