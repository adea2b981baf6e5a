//! Shared response envelope types for API handlers.
//!
//! Collection endpoints use a `{ "data": [...] }` envelope. Single resources
//! and operation reports (deletion checks, bulk delete results, stock
//! listings) are returned as-is.

use serde::Serialize;

/// Standard `{ "data": T }` response envelope.
///
/// ```ignore
/// Ok(Json(DataResponse { data: items }))
/// ```
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
}

/// `{ "detail": "..." }` acknowledgement for actions without a resource to
/// return.
#[derive(Debug, Serialize)]
pub struct DetailResponse {
    pub detail: String,
}

impl DetailResponse {
    pub fn new(detail: impl Into<String>) -> Self {
        Self {
            detail: detail.into(),
        }
    }
}
