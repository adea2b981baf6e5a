//! Author entity model and DTOs.

use bookstore_core::catalog::full_name;
use bookstore_core::types::{DbId, Timestamp};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::book::BookListItem;

/// A row from the `authors` table.
#[derive(Debug, Clone, FromRow)]
pub struct Author {
    pub id: DbId,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub bio: String,
    pub birth_date: Option<NaiveDate>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// API representation of an author, with the derived `full_name`.
#[derive(Debug, Clone, Serialize)]
pub struct AuthorResponse {
    pub id: DbId,
    pub first_name: String,
    pub last_name: String,
    pub full_name: String,
    pub email: Option<String>,
    pub bio: String,
    pub birth_date: Option<NaiveDate>,
    pub created_at: Timestamp,
}

impl From<Author> for AuthorResponse {
    fn from(a: Author) -> Self {
        Self {
            full_name: full_name(&a.first_name, &a.last_name),
            id: a.id,
            first_name: a.first_name,
            last_name: a.last_name,
            email: a.email,
            bio: a.bio,
            birth_date: a.birth_date,
            created_at: a.created_at,
        }
    }
}

/// DTO for creating a new author.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateAuthor {
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    #[serde(default)]
    pub bio: String,
    pub birth_date: Option<NaiveDate>,
}

/// DTO for updating an existing author. All fields are optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateAuthor {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub bio: Option<String>,
    pub birth_date: Option<NaiveDate>,
}

/// Query parameters for listing authors.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthorListParams {
    pub search: Option<String>,
    pub ordering: Option<String>,
}

/// An author together with their books.
#[derive(Debug, Clone, Serialize)]
pub struct AuthorBooks {
    pub author: AuthorResponse,
    pub books: Vec<BookListItem>,
    pub count: usize,
}
