//! Storage seam for the integrity service.
//!
//! The coordinator never sees SQL. It opens a [`CatalogTransaction`] via
//! [`CatalogStore::begin`], performs its reads and deletes through it, and
//! commits. Dropping a transaction without calling
//! [`CatalogTransaction::commit`] must discard every change made through it.

use async_trait::async_trait;

use crate::catalog::EntityType;
use crate::types::DbId;

/// Failure reported by a store implementation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// The store could not be reached (pool exhausted or closed, I/O).
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// A statement failed.
    #[error("Store query failed: {0}")]
    Query(String),
}

/// Factory for catalog transactions.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    type Tx: CatalogTransaction;

    async fn begin(&self) -> Result<Self::Tx, StoreError>;
}

/// Operations the integrity service needs inside one transaction.
#[async_trait]
pub trait CatalogTransaction: Send {
    /// Lock the entity row against concurrent modification and report
    /// whether it exists. Subsequent reads in this transaction see a
    /// stable reference count.
    async fn lock_for_delete(&mut self, entity: EntityType, id: DbId) -> Result<bool, StoreError>;

    /// Whether the entity row exists (no lock taken).
    async fn exists(&mut self, entity: EntityType, id: DbId) -> Result<bool, StoreError>;

    /// Number of books whose `category_id` points at `category_id`.
    async fn count_referencing_books(&mut self, category_id: DbId) -> Result<i64, StoreError>;

    /// Delete audit records for `(entity, id)`. Returns rows removed.
    async fn purge_audit(&mut self, entity: EntityType, id: DbId) -> Result<u64, StoreError>;

    /// Remove book-author links owned by the entity: a book's links for
    /// [`EntityType::Book`], an author's links for [`EntityType::Author`].
    /// Categories own no links; implementations return `Ok(0)`.
    async fn clear_author_links(&mut self, entity: EntityType, id: DbId) -> Result<u64, StoreError>;

    /// Delete the entity row. Returns `false` when no row matched.
    async fn delete_row(&mut self, entity: EntityType, id: DbId) -> Result<bool, StoreError>;

    /// Make every change in this transaction durable.
    async fn commit(self) -> Result<(), StoreError>;
}
