//! Deletion coordinator: guard, then synchronizer, then commit.

use serde::Serialize;

use crate::catalog::EntityType;
use crate::types::DbId;

use super::guard::{check_deletion, DeletionCheck};
use super::store::{CatalogStore, CatalogTransaction, StoreError};
use super::sync::purge_audit_and_links;
use super::IntegrityError;

/// An id the guard refused during a bulk delete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlockedItem {
    pub id: DbId,
    pub reason: String,
}

/// Per-item outcome of a bulk delete. Every requested id lands in exactly
/// one partition.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BulkDeleteReport {
    pub deleted: Vec<DbId>,
    pub blocked: Vec<BlockedItem>,
    pub not_found: Vec<DbId>,
}

/// Entry point for every catalog delete.
#[derive(Debug, Clone)]
pub struct CatalogIntegrity<S> {
    store: S,
}

impl<S: CatalogStore> CatalogIntegrity<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Report whether `(entity, id)` could be deleted right now.
    ///
    /// Read-only: the transaction is dropped without committing.
    pub async fn can_delete(
        &self,
        entity: EntityType,
        id: DbId,
    ) -> Result<DeletionCheck, IntegrityError> {
        let mut tx = self.store.begin().await?;
        if !tx.exists(entity, id).await? {
            return Err(IntegrityError::NotFound { entity, id });
        }
        let referencing = referencing_books(&mut tx, entity, id).await?;
        Ok(check_deletion(entity, referencing))
    }

    /// Delete one entity with its audit trail and author links.
    pub async fn delete(&self, entity: EntityType, id: DbId) -> Result<(), IntegrityError> {
        let mut tx = self.store.begin().await?;

        if !tx.lock_for_delete(entity, id).await? {
            return Err(IntegrityError::NotFound { entity, id });
        }
        let check = check_deletion(entity, referencing_books(&mut tx, entity, id).await?);
        if !check.allowed {
            let reason = check.reason.unwrap_or_default();
            tracing::warn!(entity = entity.as_str(), id, %reason, "Delete blocked");
            return Err(IntegrityError::ConstraintBlocked { entity, id, reason });
        }

        let outcome = purge_audit_and_links(&mut tx, entity, id).await?;
        if !outcome.row_deleted {
            return Err(IntegrityError::NotFound { entity, id });
        }
        tx.commit().await?;

        tracing::info!(entity = entity.as_str(), id, "Entity deleted");
        Ok(())
    }

    /// Delete a batch of entities in one transaction.
    ///
    /// Ids are de-duplicated and processed in ascending order so concurrent
    /// batches lock rows in the same order. Blocked and missing ids are
    /// reported, not raised; a store failure fails the whole batch and
    /// nothing is committed.
    pub async fn bulk_delete(
        &self,
        entity: EntityType,
        ids: &[DbId],
    ) -> Result<BulkDeleteReport, IntegrityError> {
        let mut ids = ids.to_vec();
        ids.sort_unstable();
        ids.dedup();

        let mut report = BulkDeleteReport::default();
        if ids.is_empty() {
            return Ok(report);
        }

        let mut tx = self.store.begin().await?;
        for id in ids {
            if !tx.lock_for_delete(entity, id).await? {
                report.not_found.push(id);
                continue;
            }
            let check = check_deletion(entity, referencing_books(&mut tx, entity, id).await?);
            if !check.allowed {
                report.blocked.push(BlockedItem {
                    id,
                    reason: check.reason.unwrap_or_default(),
                });
                continue;
            }
            purge_audit_and_links(&mut tx, entity, id).await?;
            report.deleted.push(id);
        }
        tx.commit().await?;

        tracing::info!(
            entity = entity.as_str(),
            deleted = report.deleted.len(),
            blocked = report.blocked.len(),
            not_found = report.not_found.len(),
            "Bulk delete finished",
        );
        Ok(report)
    }
}

async fn referencing_books<T: CatalogTransaction>(
    tx: &mut T,
    entity: EntityType,
    id: DbId,
) -> Result<i64, StoreError> {
    match entity {
        EntityType::Category => tx.count_referencing_books(id).await,
        EntityType::Author | EntityType::Book => Ok(0),
    }
}
