//! Postgres implementation of the integrity service's store traits.
//!
//! `lock_for_delete` takes `SELECT ... FOR UPDATE` on the entity row. A
//! concurrent `INSERT INTO books` referencing the same category needs a
//! `FOR KEY SHARE` lock on that row for its foreign-key check, so it waits
//! until the deleting transaction ends and then fails the FK check. The
//! referencing count read after the lock is therefore stable until commit.

use async_trait::async_trait;
use bookstore_core::catalog::EntityType;
use bookstore_core::integrity::{CatalogStore, CatalogTransaction, StoreError};
use bookstore_core::types::DbId;
use sqlx::{PgPool, Postgres, Transaction};

/// [`CatalogStore`] backed by a Postgres pool.
#[derive(Debug, Clone)]
pub struct PgCatalogStore {
    pool: PgPool,
}

impl PgCatalogStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CatalogStore for PgCatalogStore {
    type Tx = PgCatalogTransaction;

    async fn begin(&self) -> Result<Self::Tx, StoreError> {
        let tx = self.pool.begin().await.map_err(store_error)?;
        Ok(PgCatalogTransaction { tx })
    }
}

/// An open Postgres transaction. Rolled back by sqlx when dropped uncommitted.
pub struct PgCatalogTransaction {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl CatalogTransaction for PgCatalogTransaction {
    async fn lock_for_delete(&mut self, entity: EntityType, id: DbId) -> Result<bool, StoreError> {
        let query = format!("SELECT id FROM {} WHERE id = $1 FOR UPDATE", entity.table());
        let row: Option<(DbId,)> = sqlx::query_as(&query)
            .bind(id)
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(store_error)?;
        Ok(row.is_some())
    }

    async fn exists(&mut self, entity: EntityType, id: DbId) -> Result<bool, StoreError> {
        let query = format!("SELECT EXISTS(SELECT 1 FROM {} WHERE id = $1)", entity.table());
        sqlx::query_scalar(&query)
            .bind(id)
            .fetch_one(&mut *self.tx)
            .await
            .map_err(store_error)
    }

    async fn count_referencing_books(&mut self, category_id: DbId) -> Result<i64, StoreError> {
        sqlx::query_scalar("SELECT COUNT(*) FROM books WHERE category_id = $1")
            .bind(category_id)
            .fetch_one(&mut *self.tx)
            .await
            .map_err(store_error)
    }

    async fn purge_audit(&mut self, entity: EntityType, id: DbId) -> Result<u64, StoreError> {
        let result =
            sqlx::query("DELETE FROM audit_records WHERE entity_type = $1 AND entity_id = $2")
                .bind(entity.as_str())
                .bind(id)
                .execute(&mut *self.tx)
                .await
                .map_err(store_error)?;
        Ok(result.rows_affected())
    }

    async fn clear_author_links(&mut self, entity: EntityType, id: DbId) -> Result<u64, StoreError> {
        let column = match entity {
            EntityType::Book => "book_id",
            EntityType::Author => "author_id",
            EntityType::Category => return Ok(0),
        };
        let query = format!("DELETE FROM book_authors WHERE {column} = $1");
        let result = sqlx::query(&query)
            .bind(id)
            .execute(&mut *self.tx)
            .await
            .map_err(store_error)?;
        Ok(result.rows_affected())
    }

    async fn delete_row(&mut self, entity: EntityType, id: DbId) -> Result<bool, StoreError> {
        let query = format!("DELETE FROM {} WHERE id = $1", entity.table());
        let result = sqlx::query(&query)
            .bind(id)
            .execute(&mut *self.tx)
            .await
            .map_err(store_error)?;
        Ok(result.rows_affected() > 0)
    }

    async fn commit(self) -> Result<(), StoreError> {
        self.tx.commit().await.map_err(store_error)
    }
}

/// Connection-level failures are `Unavailable`; everything else is `Query`.
fn store_error(err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
            StoreError::Unavailable(err.to_string())
        }
        other => StoreError::Query(other.to_string()),
    }
}
