//! Catalog integrity service: safe deletion of categories, authors and books.
//!
//! - [`guard`] decides whether an entity may be deleted.
//! - [`sync`] removes audit records and author links before the row.
//! - [`coordinator`] runs both inside one store transaction, for a single id
//!   or a batch.
//!
//! Storage is reached only through [`CatalogStore`].

pub mod coordinator;
pub mod guard;
pub mod memory;
pub mod store;
pub mod sync;

pub use coordinator::{BlockedItem, BulkDeleteReport, CatalogIntegrity};
pub use guard::{check_deletion, DeletionCheck};
pub use store::{CatalogStore, CatalogTransaction, StoreError};
pub use sync::{purge_audit_and_links, PurgeOutcome};

use crate::catalog::EntityType;
use crate::types::DbId;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IntegrityError {
    /// The guard refused a single-entity delete. Bulk deletes report this as
    /// a [`BlockedItem`] instead.
    #[error("{reason}")]
    ConstraintBlocked {
        entity: EntityType,
        id: DbId,
        reason: String,
    },

    #[error("{} with id {id} not found", entity.label())]
    NotFound { entity: EntityType, id: DbId },

    /// The store failed; nothing from the operation was committed.
    #[error("Transaction failed: {0}")]
    TransactionFailure(#[from] StoreError),
}
