//! In-memory [`CatalogStore`] for tests and local experiments.
//!
//! A transaction holds the store's mutex for its whole lifetime and works on
//! a private copy of the data. `commit` writes the copy back; dropping the
//! transaction throws it away. Foreign keys are emulated with RESTRICT
//! semantics so a delete that skips cleanup fails the same way Postgres
//! would.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::catalog::EntityType;
use crate::types::DbId;

use super::store::{CatalogStore, CatalogTransaction, StoreError};

/// Plain copy of everything the integrity service can touch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogSnapshot {
    pub categories: BTreeSet<DbId>,
    pub authors: BTreeSet<DbId>,
    /// Book id to category id.
    pub books: BTreeMap<DbId, DbId>,
    /// `(book_id, author_id)` pairs.
    pub book_authors: BTreeSet<(DbId, DbId)>,
    /// One entry per audit record.
    pub audit: Vec<(EntityType, DbId)>,
}

impl CatalogSnapshot {
    pub fn with_category(mut self, id: DbId) -> Self {
        self.categories.insert(id);
        self
    }

    pub fn with_author(mut self, id: DbId) -> Self {
        self.authors.insert(id);
        self
    }

    pub fn with_book(mut self, id: DbId, category_id: DbId, author_ids: &[DbId]) -> Self {
        self.books.insert(id, category_id);
        for author_id in author_ids {
            self.book_authors.insert((id, *author_id));
        }
        self
    }

    pub fn with_audit(mut self, entity: EntityType, id: DbId, count: usize) -> Self {
        self.audit.extend(std::iter::repeat((entity, id)).take(count));
        self
    }

    pub fn contains(&self, entity: EntityType, id: DbId) -> bool {
        match entity {
            EntityType::Category => self.categories.contains(&id),
            EntityType::Author => self.authors.contains(&id),
            EntityType::Book => self.books.contains_key(&id),
        }
    }

    pub fn audit_count(&self, entity: EntityType, id: DbId) -> usize {
        self.audit.iter().filter(|r| **r == (entity, id)).count()
    }

    pub fn books_in_category(&self, category_id: DbId) -> i64 {
        self.books.values().filter(|c| **c == category_id).count() as i64
    }

    pub fn links_of(&self, entity: EntityType, id: DbId) -> usize {
        self.book_authors
            .iter()
            .filter(|(book_id, author_id)| match entity {
                EntityType::Book => *book_id == id,
                EntityType::Author => *author_id == id,
                EntityType::Category => false,
            })
            .count()
    }
}

/// A step at which [`MemoryCatalogStore`] can be told to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailPoint {
    PurgeAudit,
    ClearAuthorLinks,
    DeleteRow,
    Commit,
}

#[derive(Debug, Clone, Copy)]
struct Fault {
    point: FailPoint,
    /// Only fail for this entity id. `None` fails every call.
    id: Option<DbId>,
}

impl Fault {
    fn check(faults: &[Fault], point: FailPoint, id: Option<DbId>) -> Result<(), StoreError> {
        let hit = faults
            .iter()
            .any(|f| f.point == point && (f.id.is_none() || f.id == id));
        if hit {
            return Err(StoreError::Unavailable("injected failure".to_string()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryCatalogStore {
    state: Arc<Mutex<CatalogSnapshot>>,
    faults: Vec<Fault>,
}

impl MemoryCatalogStore {
    pub fn new(snapshot: CatalogSnapshot) -> Self {
        Self {
            state: Arc::new(Mutex::new(snapshot)),
            faults: Vec::new(),
        }
    }

    /// Make every call at `point` fail with [`StoreError::Unavailable`].
    pub fn fail_on(mut self, point: FailPoint) -> Self {
        self.faults.push(Fault { point, id: None });
        self
    }

    /// Like [`fail_on`](Self::fail_on) but only for entity `id`.
    pub fn fail_on_id(mut self, point: FailPoint, id: DbId) -> Self {
        self.faults.push(Fault {
            point,
            id: Some(id),
        });
        self
    }

    /// Committed state.
    pub async fn snapshot(&self) -> CatalogSnapshot {
        self.state.lock().await.clone()
    }
}

#[async_trait]
impl CatalogStore for MemoryCatalogStore {
    type Tx = MemoryTransaction;

    async fn begin(&self) -> Result<Self::Tx, StoreError> {
        let guard = Arc::clone(&self.state).lock_owned().await;
        let working = guard.clone();
        Ok(MemoryTransaction {
            guard,
            working,
            faults: self.faults.clone(),
        })
    }
}

pub struct MemoryTransaction {
    guard: OwnedMutexGuard<CatalogSnapshot>,
    working: CatalogSnapshot,
    faults: Vec<Fault>,
}

#[async_trait]
impl CatalogTransaction for MemoryTransaction {
    async fn lock_for_delete(&mut self, entity: EntityType, id: DbId) -> Result<bool, StoreError> {
        // The whole store is already locked for this transaction.
        Ok(self.working.contains(entity, id))
    }

    async fn exists(&mut self, entity: EntityType, id: DbId) -> Result<bool, StoreError> {
        Ok(self.working.contains(entity, id))
    }

    async fn count_referencing_books(&mut self, category_id: DbId) -> Result<i64, StoreError> {
        Ok(self.working.books_in_category(category_id))
    }

    async fn purge_audit(&mut self, entity: EntityType, id: DbId) -> Result<u64, StoreError> {
        let before = self.working.audit.len();
        self.working.audit.retain(|r| *r != (entity, id));
        let removed = (before - self.working.audit.len()) as u64;
        Fault::check(&self.faults, FailPoint::PurgeAudit, Some(id))?;
        Ok(removed)
    }

    async fn clear_author_links(&mut self, entity: EntityType, id: DbId) -> Result<u64, StoreError> {
        let before = self.working.book_authors.len();
        self.working
            .book_authors
            .retain(|(book_id, author_id)| match entity {
                EntityType::Book => *book_id != id,
                EntityType::Author => *author_id != id,
                EntityType::Category => true,
            });
        let removed = (before - self.working.book_authors.len()) as u64;
        Fault::check(&self.faults, FailPoint::ClearAuthorLinks, Some(id))?;
        Ok(removed)
    }

    async fn delete_row(&mut self, entity: EntityType, id: DbId) -> Result<bool, StoreError> {
        Fault::check(&self.faults, FailPoint::DeleteRow, Some(id))?;
        let restricted = match entity {
            EntityType::Category => self.working.books_in_category(id) > 0,
            EntityType::Book | EntityType::Author => self.working.links_of(entity, id) > 0,
        };
        if restricted {
            return Err(StoreError::Query(format!(
                "delete on {} violates foreign key constraint",
                entity.table()
            )));
        }
        let deleted = match entity {
            EntityType::Category => self.working.categories.remove(&id),
            EntityType::Author => self.working.authors.remove(&id),
            EntityType::Book => self.working.books.remove(&id).is_some(),
        };
        Ok(deleted)
    }

    async fn commit(mut self) -> Result<(), StoreError> {
        Fault::check(&self.faults, FailPoint::Commit, None)?;
        *self.guard = std::mem::take(&mut self.working);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn dropped_transaction_discards_changes() {
        let store = MemoryCatalogStore::new(
            CatalogSnapshot::default()
                .with_category(1)
                .with_audit(EntityType::Category, 1, 2),
        );

        {
            let mut tx = store.begin().await.unwrap();
            assert_eq!(tx.purge_audit(EntityType::Category, 1).await.unwrap(), 2);
            assert!(tx.delete_row(EntityType::Category, 1).await.unwrap());
        }

        let snap = store.snapshot().await;
        assert!(snap.contains(EntityType::Category, 1));
        assert_eq!(snap.audit_count(EntityType::Category, 1), 2);
    }

    #[tokio::test]
    async fn committed_transaction_is_visible() {
        let store = MemoryCatalogStore::new(CatalogSnapshot::default().with_author(5));

        let mut tx = store.begin().await.unwrap();
        assert!(tx.delete_row(EntityType::Author, 5).await.unwrap());
        tx.commit().await.unwrap();

        assert!(!store.snapshot().await.contains(EntityType::Author, 5));
    }

    #[tokio::test]
    async fn delete_with_dangling_references_is_restricted() {
        let store = MemoryCatalogStore::new(
            CatalogSnapshot::default()
                .with_category(1)
                .with_author(2)
                .with_book(3, 1, &[2]),
        );

        let mut tx = store.begin().await.unwrap();
        assert!(tx.delete_row(EntityType::Category, 1).await.is_err());
        assert!(tx.delete_row(EntityType::Book, 3).await.is_err());
        assert!(tx.delete_row(EntityType::Author, 2).await.is_err());
    }

    #[tokio::test]
    async fn fail_on_id_only_hits_that_id() {
        let store = MemoryCatalogStore::new(
            CatalogSnapshot::default().with_author(1).with_author(2),
        )
        .fail_on_id(FailPoint::DeleteRow, 2);

        let mut tx = store.begin().await.unwrap();
        assert!(tx.delete_row(EntityType::Author, 1).await.is_ok());
        assert_eq!(
            tx.delete_row(EntityType::Author, 2).await,
            Err(StoreError::Unavailable("injected failure".to_string()))
        );
    }
}
