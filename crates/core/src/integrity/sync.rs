//! Audit trail synchronizer.
//!
//! Removes everything that hangs off an entity and then the entity itself,
//! all through the caller's transaction. Nothing here commits.

use crate::catalog::EntityType;
use crate::types::DbId;

use super::store::{CatalogTransaction, StoreError};

/// What a successful purge removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PurgeOutcome {
    pub audit_records: u64,
    pub author_links: u64,
    /// `false` when the entity row was already gone.
    pub row_deleted: bool,
}

/// Delete audit records, then author links, then the entity row.
///
/// The first failing step aborts with its error; the caller drops the
/// transaction so none of the earlier steps become visible.
pub async fn purge_audit_and_links<T: CatalogTransaction>(
    tx: &mut T,
    entity: EntityType,
    id: DbId,
) -> Result<PurgeOutcome, StoreError> {
    let audit_records = tx.purge_audit(entity, id).await?;
    let author_links = match entity {
        EntityType::Book | EntityType::Author => tx.clear_author_links(entity, id).await?,
        EntityType::Category => 0,
    };
    let row_deleted = tx.delete_row(entity, id).await?;

    tracing::debug!(
        entity = entity.as_str(),
        id,
        audit_records,
        author_links,
        row_deleted,
        "Purged entity",
    );

    Ok(PurgeOutcome {
        audit_records,
        author_links,
        row_deleted,
    })
}
