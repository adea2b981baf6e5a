//! Lookups against the seeded `roles` table.

use bookstore_core::types::DbId;
use sqlx::PgPool;

pub struct RoleRepo;

impl RoleRepo {
    pub async fn exists(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM roles WHERE id = $1)")
            .bind(id)
            .fetch_one(pool)
            .await
    }

    /// Name of role `id`, or `"unknown"` for an id with no row. Unknown
    /// names fail every permission check downstream.
    pub async fn resolve_name(pool: &PgPool, id: DbId) -> Result<String, sqlx::Error> {
        let name = sqlx::query_scalar::<_, String>("SELECT name FROM roles WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await?;
        Ok(name.unwrap_or_else(|| "unknown".to_string()))
    }
}
