//! Book entity model and DTOs.

use bookstore_core::catalog::BookCondition;
use bookstore_core::types::{DbId, Timestamp};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::author::AuthorResponse;
use super::category::Category;

/// A row from the `books` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Book {
    pub id: DbId,
    pub title: String,
    pub isbn: String,
    pub description: String,
    pub category_id: DbId,
    pub creator_id: Option<DbId>,
    pub price: Decimal,
    pub stock_quantity: i32,
    /// One of `new`, `good`, `fair`, `poor` (see [`BookCondition`]).
    pub condition: String,
    pub publication_date: Option<NaiveDate>,
    pub pages: Option<i32>,
    pub rating: Option<Decimal>,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Compact row used by every book listing.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct BookListItem {
    pub id: DbId,
    pub title: String,
    pub category_name: String,
    pub price: Decimal,
    pub stock_quantity: i32,
    pub authors_count: i64,
}

/// Full book view: the row plus its category, authors and creator.
#[derive(Debug, Clone, Serialize)]
pub struct BookDetail {
    #[serde(flatten)]
    pub book: Book,
    pub category_detail: Category,
    pub authors_detail: Vec<AuthorResponse>,
    pub created_by_name: Option<String>,
}

/// DTO for creating a new book.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateBook {
    pub title: String,
    pub isbn: String,
    #[serde(default)]
    pub description: String,
    pub category_id: DbId,
    pub author_ids: Vec<DbId>,
    pub price: Decimal,
    #[serde(default)]
    pub stock_quantity: i64,
    #[serde(default)]
    pub condition: BookCondition,
    pub publication_date: Option<NaiveDate>,
    pub pages: Option<i32>,
    pub rating: Option<Decimal>,
    pub is_active: Option<bool>,
}

/// DTO for updating an existing book. All fields are optional.
///
/// When `author_ids` is present it replaces the whole author set.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateBook {
    pub title: Option<String>,
    pub isbn: Option<String>,
    pub description: Option<String>,
    pub category_id: Option<DbId>,
    pub author_ids: Option<Vec<DbId>>,
    pub price: Option<Decimal>,
    pub stock_quantity: Option<i64>,
    pub condition: Option<BookCondition>,
    pub publication_date: Option<NaiveDate>,
    pub pages: Option<i32>,
    pub rating: Option<Decimal>,
    pub is_active: Option<bool>,
}

/// Query parameters for listing books.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BookListParams {
    pub search: Option<String>,
    pub category: Option<DbId>,
    pub author: Option<DbId>,
    pub ordering: Option<String>,
    pub include_inactive: Option<bool>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Body of `PUT /books/{id}/stock`.
#[derive(Debug, Clone, Deserialize)]
pub struct SetStock {
    pub stock_quantity: i64,
}

/// Body of `POST /books/{id}/stock/add` and `/stock/remove`.
#[derive(Debug, Clone, Deserialize)]
pub struct AdjustStock {
    pub quantity: i32,
}

/// Response body for stock-level listings.
#[derive(Debug, Clone, Serialize)]
pub struct StockListing {
    pub books: Vec<BookListItem>,
    pub count: usize,
}
