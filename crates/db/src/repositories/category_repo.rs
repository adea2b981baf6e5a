//! Repository for the `categories` table.

use bookstore_core::catalog::EntityType;
use bookstore_core::search::ilike_pattern;
use bookstore_core::types::DbId;
use sqlx::PgPool;

use crate::models::audit::{CreateAuditRecord, ACTION_CREATE, ACTION_UPDATE};
use crate::models::category::{Category, CreateCategory, UpdateCategory};
use crate::repositories::AuditRepo;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, name, description, created_at, updated_at";

/// Provides create, read and update operations for categories.
pub struct CategoryRepo;

impl CategoryRepo {
    /// Insert a new category and record its creation.
    pub async fn create(
        pool: &PgPool,
        input: &CreateCategory,
        actor: Option<DbId>,
    ) -> Result<Category, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "INSERT INTO categories (name, description)
             VALUES ($1, $2)
             RETURNING {COLUMNS}"
        );
        let category = sqlx::query_as::<_, Category>(&query)
            .bind(&input.name)
            .bind(&input.description)
            .fetch_one(&mut *tx)
            .await?;

        AuditRepo::record(
            &mut *tx,
            &CreateAuditRecord {
                entity_type: EntityType::Category,
                entity_id: category.id,
                action: ACTION_CREATE,
                user_id: actor,
                details: Some(serde_json::json!({ "name": category.name })),
            },
        )
        .await?;

        tx.commit().await?;
        Ok(category)
    }

    /// Find a category by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Category>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM categories WHERE id = $1");
        sqlx::query_as::<_, Category>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Whether a category with this ID exists.
    pub async fn exists(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM categories WHERE id = $1)")
            .bind(id)
            .fetch_one(pool)
            .await
    }

    /// List categories ordered by name, optionally filtered by a substring
    /// of the name or description.
    pub async fn list(pool: &PgPool, search: Option<&str>) -> Result<Vec<Category>, sqlx::Error> {
        match search.and_then(ilike_pattern) {
            Some(pattern) => {
                let query = format!(
                    "SELECT {COLUMNS} FROM categories
                     WHERE name ILIKE $1 OR description ILIKE $1
                     ORDER BY name"
                );
                sqlx::query_as::<_, Category>(&query)
                    .bind(pattern)
                    .fetch_all(pool)
                    .await
            }
            None => {
                let query = format!("SELECT {COLUMNS} FROM categories ORDER BY name");
                sqlx::query_as::<_, Category>(&query).fetch_all(pool).await
            }
        }
    }

    /// Update a category. Only non-`None` fields in `input` are applied.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateCategory,
        actor: Option<DbId>,
    ) -> Result<Option<Category>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "UPDATE categories SET
                name = COALESCE($2, name),
                description = COALESCE($3, description)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        let category = sqlx::query_as::<_, Category>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.description)
            .fetch_optional(&mut *tx)
            .await?;

        if category.is_some() {
            AuditRepo::record(
                &mut *tx,
                &CreateAuditRecord {
                    entity_type: EntityType::Category,
                    entity_id: id,
                    action: ACTION_UPDATE,
                    user_id: actor,
                    details: None,
                },
            )
            .await?;
        }

        tx.commit().await?;
        Ok(category)
    }
}
