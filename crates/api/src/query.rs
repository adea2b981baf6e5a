//! Shared query parameter and request body types for API handlers.

use bookstore_core::types::DbId;
use serde::Deserialize;

/// `?search=` for endpoints with a single free-text filter.
#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    pub search: Option<String>,
}

/// Body of every `POST /{resource}/bulk-delete`.
#[derive(Debug, Deserialize)]
pub struct BulkDeleteRequest {
    pub ids: Vec<DbId>,
}
