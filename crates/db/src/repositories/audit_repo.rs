//! Repository for the `audit_records` table.

use bookstore_core::catalog::EntityType;
use bookstore_core::types::DbId;
use sqlx::{PgExecutor, PgPool};

use crate::models::audit::{AuditRecord, CreateAuditRecord};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, entity_type, entity_id, action, user_id, details, created_at";

/// Append and read audit records.
pub struct AuditRepo;

impl AuditRepo {
    /// Append an audit record.
    ///
    /// Accepts any executor so repositories can write the record inside the
    /// transaction that made the change.
    pub async fn record<'e, E>(
        executor: E,
        input: &CreateAuditRecord,
    ) -> Result<AuditRecord, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let query = format!(
            "INSERT INTO audit_records (entity_type, entity_id, action, user_id, details)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, AuditRecord>(&query)
            .bind(input.entity_type.as_str())
            .bind(input.entity_id)
            .bind(input.action)
            .bind(input.user_id)
            .bind(&input.details)
            .fetch_one(executor)
            .await
    }

    /// Audit trail of one entity, oldest first.
    pub async fn list_for_entity(
        pool: &PgPool,
        entity: EntityType,
        entity_id: DbId,
    ) -> Result<Vec<AuditRecord>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM audit_records
             WHERE entity_type = $1 AND entity_id = $2
             ORDER BY created_at ASC, id ASC"
        );
        sqlx::query_as::<_, AuditRecord>(&query)
            .bind(entity.as_str())
            .bind(entity_id)
            .fetch_all(pool)
            .await
    }

    /// Number of audit records held for one entity.
    pub async fn count_for_entity(
        pool: &PgPool,
        entity: EntityType,
        entity_id: DbId,
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT COUNT(*) FROM audit_records WHERE entity_type = $1 AND entity_id = $2",
        )
        .bind(entity.as_str())
        .bind(entity_id)
        .fetch_one(pool)
        .await
    }
}
