//! Audit record model and DTOs.
//!
//! Audit records are immutable (no `updated_at`) and are removed only when
//! the entity they describe is deleted.

use bookstore_core::catalog::EntityType;
use bookstore_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// Action names stored in `audit_records.action`.
pub const ACTION_CREATE: &str = "create";
pub const ACTION_UPDATE: &str = "update";
pub const ACTION_STOCK_UPDATE: &str = "stock_update";

/// A row from the `audit_records` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AuditRecord {
    pub id: DbId,
    pub entity_type: String,
    pub entity_id: DbId,
    pub action: String,
    pub user_id: Option<DbId>,
    pub details: Option<serde_json::Value>,
    pub created_at: Timestamp,
}

/// DTO for appending an audit record.
#[derive(Debug, Clone)]
pub struct CreateAuditRecord {
    pub entity_type: EntityType,
    pub entity_id: DbId,
    pub action: &'static str,
    pub user_id: Option<DbId>,
    pub details: Option<serde_json::Value>,
}
