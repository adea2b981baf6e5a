//! Integration tests for catalog repositories.
//!
//! Exercises the repository layer against a real database:
//! - Case-insensitive uniqueness for names and titles
//! - Book listing filters, search and ordering
//! - Author replacement on update
//! - Stock adjustments and their audit trail

use assert_matches::assert_matches;
use bookstore_core::catalog::{BookCondition, EntityType};
use bookstore_core::inventory::{InventoryError, StockAdjustment};
use bookstore_db::models::author::{AuthorListParams, CreateAuthor};
use bookstore_db::models::book::{BookListParams, CreateBook, UpdateBook};
use bookstore_db::models::category::{CreateCategory, UpdateCategory};
use bookstore_db::repositories::{
    AuditRepo, AuthorRepo, BookRepo, CategoryRepo, StockUpdate,
};
use rust_decimal::Decimal;
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn new_category(name: &str) -> CreateCategory {
    CreateCategory {
        name: name.to_string(),
        description: String::new(),
    }
}

fn new_author(first: &str, last: &str) -> CreateAuthor {
    CreateAuthor {
        first_name: first.to_string(),
        last_name: last.to_string(),
        email: None,
        bio: String::new(),
        birth_date: None,
    }
}

fn new_book(title: &str, isbn: &str, category_id: i64, author_ids: &[i64]) -> CreateBook {
    CreateBook {
        title: title.to_string(),
        isbn: isbn.to_string(),
        description: String::new(),
        category_id,
        author_ids: author_ids.to_vec(),
        price: Decimal::new(1500, 2),
        stock_quantity: 10,
        condition: BookCondition::Good,
        publication_date: None,
        pages: Some(320),
        rating: None,
        is_active: None,
    }
}

fn unique_violation(err: &sqlx::Error) -> Option<String> {
    match err {
        sqlx::Error::Database(db) if db.code().as_deref() == Some("23505") => {
            db.constraint().map(str::to_string)
        }
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_category_name_unique_case_insensitive(pool: PgPool) {
    CategoryRepo::create(&pool, &new_category("Fiction"), None)
        .await
        .unwrap();
    let err = CategoryRepo::create(&pool, &new_category("FICTION"), None)
        .await
        .unwrap_err();
    assert_eq!(unique_violation(&err).as_deref(), Some("uq_categories_name"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_book_title_unique_case_insensitive_isbn_exact(pool: PgPool) {
    let cat = CategoryRepo::create(&pool, &new_category("Sci-Fi"), None)
        .await
        .unwrap();
    let a = AuthorRepo::create(&pool, &new_author("Frank", "Herbert"), None)
        .await
        .unwrap();

    BookRepo::create(&pool, &new_book("Dune", "9780441013593", cat.id, &[a.id]), None)
        .await
        .unwrap();

    let err = BookRepo::create(&pool, &new_book("dune", "9780441013594", cat.id, &[a.id]), None)
        .await
        .unwrap_err();
    assert_eq!(unique_violation(&err).as_deref(), Some("uq_books_title"));

    let err = BookRepo::create(
        &pool,
        &new_book("Dune Messiah", "9780441013593", cat.id, &[a.id]),
        None,
    )
    .await
    .unwrap_err();
    assert_eq!(unique_violation(&err).as_deref(), Some("uq_books_isbn"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_author_pair_unique_and_ordering(pool: PgPool) {
    AuthorRepo::create(&pool, &new_author("Zadie", "Smith"), None)
        .await
        .unwrap();
    AuthorRepo::create(&pool, &new_author("Chinua", "Achebe"), None)
        .await
        .unwrap();
    let err = AuthorRepo::create(&pool, &new_author("zadie", "SMITH"), None)
        .await
        .unwrap_err();
    assert_eq!(unique_violation(&err).as_deref(), Some("uq_authors_name"));

    let by_last = AuthorRepo::list(&pool, &AuthorListParams::default())
        .await
        .unwrap();
    assert_eq!(by_last[0].last_name, "Achebe");

    let by_first_desc = AuthorRepo::list(
        &pool,
        &AuthorListParams {
            search: None,
            ordering: Some("-first_name".to_string()),
        },
    )
    .await
    .unwrap();
    assert_eq!(by_first_desc[0].first_name, "Zadie");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_book_list_filters(pool: PgPool) {
    let fiction = CategoryRepo::create(&pool, &new_category("Fiction"), None)
        .await
        .unwrap();
    let history = CategoryRepo::create(&pool, &new_category("History"), None)
        .await
        .unwrap();
    let tolkien = AuthorRepo::create(&pool, &new_author("J.R.R.", "Tolkien"), None)
        .await
        .unwrap();
    let beard = AuthorRepo::create(&pool, &new_author("Mary", "Beard"), None)
        .await
        .unwrap();

    BookRepo::create(&pool, &new_book("The Hobbit", "9780547928227", fiction.id, &[tolkien.id]), None)
        .await
        .unwrap();
    BookRepo::create(&pool, &new_book("SPQR", "9781631492228", history.id, &[beard.id]), None)
        .await
        .unwrap();
    let hidden = BookRepo::create(
        &pool,
        &new_book("Unfinished Tales", "9780618154050", fiction.id, &[tolkien.id]),
        None,
    )
    .await
    .unwrap();
    BookRepo::update(
        &pool,
        hidden.id,
        &UpdateBook {
            is_active: Some(false),
            ..Default::default()
        },
        None,
    )
    .await
    .unwrap();

    let all = BookRepo::list(&pool, &BookListParams::default()).await.unwrap();
    assert_eq!(all.len(), 2);

    let with_inactive = BookRepo::list(
        &pool,
        &BookListParams {
            include_inactive: Some(true),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(with_inactive.len(), 3);

    let by_author_name = BookRepo::list(
        &pool,
        &BookListParams {
            search: Some("tolk".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(by_author_name.len(), 1);
    assert_eq!(by_author_name[0].title, "The Hobbit");
    assert_eq!(by_author_name[0].category_name, "Fiction");
    assert_eq!(by_author_name[0].authors_count, 1);

    let by_category = BookRepo::list(
        &pool,
        &BookListParams {
            category: Some(history.id),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(by_category.len(), 1);
    assert_eq!(by_category[0].title, "SPQR");

    let by_title = BookRepo::list(
        &pool,
        &BookListParams {
            ordering: Some("title".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(by_title[0].title, "SPQR");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_update_replaces_authors(pool: PgPool) {
    let cat = CategoryRepo::create(&pool, &new_category("Poetry"), None)
        .await
        .unwrap();
    let a1 = AuthorRepo::create(&pool, &new_author("Ted", "Hughes"), None)
        .await
        .unwrap();
    let a2 = AuthorRepo::create(&pool, &new_author("Sylvia", "Plath"), None)
        .await
        .unwrap();
    let book = BookRepo::create(&pool, &new_book("Ariel", "9780060931728", cat.id, &[a1.id]), None)
        .await
        .unwrap();

    BookRepo::update(
        &pool,
        book.id,
        &UpdateBook {
            author_ids: Some(vec![a2.id]),
            ..Default::default()
        },
        None,
    )
    .await
    .unwrap();

    let detail = BookRepo::find_detail(&pool, book.id).await.unwrap().unwrap();
    assert_eq!(detail.authors_detail.len(), 1);
    assert_eq!(detail.authors_detail[0].full_name, "Sylvia Plath");
    assert_eq!(detail.category_detail.name, "Poetry");
    assert_eq!(detail.book.condition, "good");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_stock_adjustments(pool: PgPool) {
    let cat = CategoryRepo::create(&pool, &new_category("Travel"), None)
        .await
        .unwrap();
    let a = AuthorRepo::create(&pool, &new_author("Bruce", "Chatwin"), None)
        .await
        .unwrap();
    let book = BookRepo::create(
        &pool,
        &new_book("In Patagonia", "9780142437193", cat.id, &[a.id]),
        None,
    )
    .await
    .unwrap();

    let updated = BookRepo::adjust_stock(&pool, book.id, StockAdjustment::Remove(7), None)
        .await
        .unwrap();
    assert_matches!(updated, StockUpdate::Updated(ref b) if b.stock_quantity == 3);

    let rejected = BookRepo::adjust_stock(&pool, book.id, StockAdjustment::Remove(4), None)
        .await
        .unwrap();
    assert_matches!(
        rejected,
        StockUpdate::Rejected(InventoryError::Insufficient { available: 3, requested: 4 })
    );

    let missing = BookRepo::adjust_stock(&pool, 999_999, StockAdjustment::Add(1), None)
        .await
        .unwrap();
    assert_matches!(missing, StockUpdate::NotFound);

    let low = BookRepo::list_low_stock(&pool).await.unwrap();
    assert_eq!(low.len(), 1);

    let trail = AuditRepo::list_for_entity(&pool, EntityType::Book, book.id)
        .await
        .unwrap();
    let actions: Vec<_> = trail.iter().map(|r| r.action.as_str()).collect();
    assert_eq!(actions, vec!["create", "stock_update"]);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_update_nonexistent_returns_none(pool: PgPool) {
    let result = CategoryRepo::update(
        &pool,
        999_999,
        &UpdateCategory {
            name: Some("Ghost".to_string()),
            description: None,
        },
        None,
    )
    .await
    .unwrap();
    assert!(result.is_none());
}
