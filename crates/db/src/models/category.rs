//! Category entity model and DTOs.

use bookstore_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::book::BookListItem;

/// A row from the `categories` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Category {
    pub id: DbId,
    pub name: String,
    pub description: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a new category.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateCategory {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

/// DTO for updating an existing category. All fields are optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateCategory {
    pub name: Option<String>,
    pub description: Option<String>,
}

/// A category together with the books filed under it.
#[derive(Debug, Clone, Serialize)]
pub struct CategoryBooks {
    pub category: Category,
    pub books: Vec<BookListItem>,
    pub count: usize,
}
