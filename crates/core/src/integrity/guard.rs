//! Relationship guard: decides whether a catalog entity may be deleted.
//!
//! Pure function over the referencing-book count; the coordinator supplies
//! the count from inside a transaction.

use serde::Serialize;

use crate::catalog::EntityType;

/// Result of checking whether a catalog entity can be deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeletionCheck {
    /// Whether deletion would be accepted.
    pub allowed: bool,
    /// Why deletion is refused. `None` when allowed.
    pub reason: Option<String>,
    /// Books pointing at the entity through a foreign key (categories only).
    pub referencing_books: i64,
}

impl DeletionCheck {
    fn allowed(referencing_books: i64) -> Self {
        Self {
            allowed: true,
            reason: None,
            referencing_books,
        }
    }
}

/// Evaluate the deletion rule for `entity` given its referencing-book count.
///
/// Only categories are guarded. Books and authors are always deletable; the
/// synchronizer cleans up their audit rows and author links instead.
pub fn check_deletion(entity: EntityType, referencing_books: i64) -> DeletionCheck {
    match entity {
        EntityType::Category if referencing_books > 0 => DeletionCheck {
            allowed: false,
            reason: Some(blocked_reason(entity, referencing_books)),
            referencing_books,
        },
        EntityType::Category => DeletionCheck::allowed(0),
        EntityType::Author | EntityType::Book => DeletionCheck::allowed(referencing_books),
    }
}

fn blocked_reason(entity: EntityType, count: i64) -> String {
    let noun = if count == 1 { "book" } else { "books" };
    format!("{} is referenced by {count} {noun}", entity.label())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_category_is_allowed() {
        let check = check_deletion(EntityType::Category, 0);
        assert!(check.allowed);
        assert_eq!(check.reason, None);
        assert_eq!(check.referencing_books, 0);
    }

    #[test]
    fn referenced_category_is_blocked_with_count() {
        let check = check_deletion(EntityType::Category, 3);
        assert!(!check.allowed);
        assert_eq!(check.referencing_books, 3);
        assert_eq!(
            check.reason.as_deref(),
            Some("Category is referenced by 3 books")
        );
    }

    #[test]
    fn single_reference_uses_singular() {
        let check = check_deletion(EntityType::Category, 1);
        assert_eq!(
            check.reason.as_deref(),
            Some("Category is referenced by 1 book")
        );
    }

    #[test]
    fn books_and_authors_are_never_blocked() {
        assert!(check_deletion(EntityType::Book, 0).allowed);
        assert!(check_deletion(EntityType::Author, 4).allowed);
    }

    #[test]
    fn any_positive_count_blocks_a_category() {
        for n in [1, 2, 17, i64::MAX] {
            assert!(!check_deletion(EntityType::Category, n).allowed);
        }
    }
}
