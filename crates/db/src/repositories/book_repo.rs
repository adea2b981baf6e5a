//! Repository for the `books` and `book_authors` tables.

use bookstore_core::catalog::EntityType;
use bookstore_core::inventory::{
    apply_adjustment, InventoryError, StockAdjustment, LOW_STOCK_THRESHOLD,
};
use bookstore_core::search::{
    clamp_limit, clamp_offset, ilike_pattern, resolve_ordering, DEFAULT_LIST_LIMIT, MAX_LIST_LIMIT,
};
use bookstore_core::types::DbId;
use sqlx::PgPool;

use crate::models::audit::{CreateAuditRecord, ACTION_CREATE, ACTION_STOCK_UPDATE, ACTION_UPDATE};
use crate::models::author::AuthorResponse;
use crate::models::book::{Book, BookDetail, BookListItem, BookListParams, CreateBook, UpdateBook};
use crate::repositories::{AuditRepo, AuthorRepo, CategoryRepo, UserRepo};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, title, isbn, description, category_id, creator_id, price, \
                       stock_quantity, condition, publication_date, pages, rating, \
                       is_active, created_at, updated_at";

/// SELECT/FROM prefix producing [`BookListItem`] rows (`b` = books).
const LIST_SELECT: &str = "SELECT b.id, b.title, c.name AS category_name, b.price, \
                              b.stock_quantity, \
                              (SELECT COUNT(*) FROM book_authors ba WHERE ba.book_id = b.id) \
                                  AS authors_count \
                           FROM books b \
                           JOIN categories c ON c.id = b.category_id";

/// Columns accepted by `?ordering=`.
const ORDERING_FIELDS: &[&str] = &["title", "price", "created_at"];

/// Outcome of a stock change.
#[derive(Debug)]
pub enum StockUpdate {
    Updated(Book),
    NotFound,
    /// The adjustment broke a stock rule; nothing was written.
    Rejected(InventoryError),
}

/// Provides CRUD operations for books and their author links.
pub struct BookRepo;

impl BookRepo {
    /// Insert a new book with its author links and record its creation.
    ///
    /// `input` must already be validated (normalized ISBN, non-empty
    /// de-duplicated `author_ids`, stock within range).
    pub async fn create(
        pool: &PgPool,
        input: &CreateBook,
        creator_id: Option<DbId>,
    ) -> Result<Book, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "INSERT INTO books \
                (title, isbn, description, category_id, creator_id, price, stock_quantity, \
                 condition, publication_date, pages, rating, is_active) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, COALESCE($12, true)) \
             RETURNING {COLUMNS}"
        );
        let book = sqlx::query_as::<_, Book>(&query)
            .bind(&input.title)
            .bind(&input.isbn)
            .bind(&input.description)
            .bind(input.category_id)
            .bind(creator_id)
            .bind(input.price)
            .bind(input.stock_quantity as i32)
            .bind(input.condition.as_str())
            .bind(input.publication_date)
            .bind(input.pages)
            .bind(input.rating)
            .bind(input.is_active)
            .fetch_one(&mut *tx)
            .await?;

        Self::set_authors_inner(&mut tx, book.id, &input.author_ids).await?;

        AuditRepo::record(
            &mut *tx,
            &CreateAuditRecord {
                entity_type: EntityType::Book,
                entity_id: book.id,
                action: ACTION_CREATE,
                user_id: creator_id,
                details: Some(serde_json::json!({
                    "title": book.title,
                    "isbn": book.isbn,
                    "author_ids": input.author_ids,
                })),
            },
        )
        .await?;

        tx.commit().await?;
        Ok(book)
    }

    /// Find a book by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Book>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM books WHERE id = $1");
        sqlx::query_as::<_, Book>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a book by ID, enriched with its category, authors and creator.
    pub async fn find_detail(pool: &PgPool, id: DbId) -> Result<Option<BookDetail>, sqlx::Error> {
        let Some(book) = Self::find_by_id(pool, id).await? else {
            return Ok(None);
        };

        let category_detail = CategoryRepo::find_by_id(pool, book.category_id)
            .await?
            .ok_or(sqlx::Error::RowNotFound)?;
        let authors_detail = AuthorRepo::list_for_book(pool, book.id)
            .await?
            .into_iter()
            .map(AuthorResponse::from)
            .collect();
        let created_by_name = match book.creator_id {
            Some(user_id) => UserRepo::find_by_id(pool, user_id).await?.map(|u| u.username),
            None => None,
        };

        Ok(Some(BookDetail {
            book,
            category_detail,
            authors_detail,
            created_by_name,
        }))
    }

    /// List books with search, filters, ordering and pagination.
    ///
    /// Search matches title, description and author first/last names.
    /// Inactive books are hidden unless `include_inactive` is set.
    pub async fn list(
        pool: &PgPool,
        params: &BookListParams,
    ) -> Result<Vec<BookListItem>, sqlx::Error> {
        let limit = clamp_limit(params.limit, DEFAULT_LIST_LIMIT, MAX_LIST_LIMIT);
        let offset = clamp_offset(params.offset);
        let order_by = resolve_ordering(params.ordering.as_deref(), ORDERING_FIELDS, "-created_at");
        let pattern = params.search.as_deref().and_then(ilike_pattern);

        // Build dynamic WHERE clauses.
        let mut conditions = Vec::new();
        let mut bind_idx = 1u32;

        if !params.include_inactive.unwrap_or(false) {
            conditions.push("b.is_active = true".to_string());
        }
        if pattern.is_some() {
            conditions.push(format!(
                "(b.title ILIKE ${bind_idx} OR b.description ILIKE ${bind_idx} OR EXISTS ( \
                    SELECT 1 FROM book_authors ba \
                    JOIN authors a ON a.id = ba.author_id \
                    WHERE ba.book_id = b.id \
                      AND (a.first_name ILIKE ${bind_idx} OR a.last_name ILIKE ${bind_idx})))"
            ));
            bind_idx += 1;
        }
        if params.category.is_some() {
            conditions.push(format!("b.category_id = ${bind_idx}"));
            bind_idx += 1;
        }
        if params.author.is_some() {
            conditions.push(format!(
                "EXISTS (SELECT 1 FROM book_authors ba \
                         WHERE ba.book_id = b.id AND ba.author_id = ${bind_idx})"
            ));
            bind_idx += 1;
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let query = format!(
            "{LIST_SELECT} {where_clause} \
             ORDER BY b.{order_by}, b.id \
             LIMIT ${bind_idx} OFFSET ${next_idx}",
            next_idx = bind_idx + 1,
        );

        let mut q = sqlx::query_as::<_, BookListItem>(&query);

        // Bind dynamic parameters in order.
        if let Some(pattern) = pattern {
            q = q.bind(pattern);
        }
        if let Some(category_id) = params.category {
            q = q.bind(category_id);
        }
        if let Some(author_id) = params.author {
            q = q.bind(author_id);
        }

        q = q.bind(limit).bind(offset);
        q.fetch_all(pool).await
    }

    /// All books filed under a category, newest first.
    pub async fn list_by_category(
        pool: &PgPool,
        category_id: DbId,
    ) -> Result<Vec<BookListItem>, sqlx::Error> {
        let query =
            format!("{LIST_SELECT} WHERE b.category_id = $1 ORDER BY b.created_at DESC, b.id");
        sqlx::query_as::<_, BookListItem>(&query)
            .bind(category_id)
            .fetch_all(pool)
            .await
    }

    /// All books linked to an author, newest first.
    pub async fn list_by_author(
        pool: &PgPool,
        author_id: DbId,
    ) -> Result<Vec<BookListItem>, sqlx::Error> {
        let query = format!(
            "{LIST_SELECT} \
             WHERE EXISTS (SELECT 1 FROM book_authors ba \
                           WHERE ba.book_id = b.id AND ba.author_id = $1) \
             ORDER BY b.created_at DESC, b.id"
        );
        sqlx::query_as::<_, BookListItem>(&query)
            .bind(author_id)
            .fetch_all(pool)
            .await
    }

    /// Books with at most [`LOW_STOCK_THRESHOLD`] copies, scarcest first.
    pub async fn list_low_stock(pool: &PgPool) -> Result<Vec<BookListItem>, sqlx::Error> {
        let query = format!(
            "{LIST_SELECT} WHERE b.stock_quantity <= $1 ORDER BY b.stock_quantity, b.title"
        );
        sqlx::query_as::<_, BookListItem>(&query)
            .bind(LOW_STOCK_THRESHOLD)
            .fetch_all(pool)
            .await
    }

    /// Books with at least one copy in stock, by title.
    pub async fn list_in_stock(pool: &PgPool) -> Result<Vec<BookListItem>, sqlx::Error> {
        let query = format!("{LIST_SELECT} WHERE b.stock_quantity > 0 ORDER BY b.title");
        sqlx::query_as::<_, BookListItem>(&query).fetch_all(pool).await
    }

    /// Update a book. Only non-`None` fields in `input` are applied; a
    /// present `author_ids` replaces the author set.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateBook,
        actor: Option<DbId>,
    ) -> Result<Option<Book>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "UPDATE books SET
                title = COALESCE($2, title),
                isbn = COALESCE($3, isbn),
                description = COALESCE($4, description),
                category_id = COALESCE($5, category_id),
                price = COALESCE($6, price),
                stock_quantity = COALESCE($7, stock_quantity),
                condition = COALESCE($8, condition),
                publication_date = COALESCE($9, publication_date),
                pages = COALESCE($10, pages),
                rating = COALESCE($11, rating),
                is_active = COALESCE($12, is_active)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        let book = sqlx::query_as::<_, Book>(&query)
            .bind(id)
            .bind(&input.title)
            .bind(&input.isbn)
            .bind(&input.description)
            .bind(input.category_id)
            .bind(input.price)
            .bind(input.stock_quantity.map(|n| n as i32))
            .bind(input.condition.map(|c| c.as_str()))
            .bind(input.publication_date)
            .bind(input.pages)
            .bind(input.rating)
            .bind(input.is_active)
            .fetch_optional(&mut *tx)
            .await?;

        let Some(book) = book else {
            return Ok(None);
        };

        if let Some(ref author_ids) = input.author_ids {
            Self::set_authors_inner(&mut tx, id, author_ids).await?;
        }

        AuditRepo::record(
            &mut *tx,
            &CreateAuditRecord {
                entity_type: EntityType::Book,
                entity_id: id,
                action: ACTION_UPDATE,
                user_id: actor,
                details: input
                    .author_ids
                    .as_ref()
                    .map(|ids| serde_json::json!({ "author_ids": ids })),
            },
        )
        .await?;

        tx.commit().await?;
        Ok(Some(book))
    }

    /// Apply a stock adjustment under a row lock.
    ///
    /// The current quantity is read `FOR UPDATE`, so concurrent adjustments
    /// of the same book serialize and never lose an update.
    pub async fn adjust_stock(
        pool: &PgPool,
        id: DbId,
        adjustment: StockAdjustment,
        actor: Option<DbId>,
    ) -> Result<StockUpdate, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let current: Option<i32> =
            sqlx::query_scalar("SELECT stock_quantity FROM books WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;
        let Some(current) = current else {
            return Ok(StockUpdate::NotFound);
        };

        let quantity = match apply_adjustment(current, adjustment) {
            Ok(quantity) => quantity,
            Err(e) => return Ok(StockUpdate::Rejected(e)),
        };

        let query =
            format!("UPDATE books SET stock_quantity = $2 WHERE id = $1 RETURNING {COLUMNS}");
        let book = sqlx::query_as::<_, Book>(&query)
            .bind(id)
            .bind(quantity)
            .fetch_one(&mut *tx)
            .await?;

        AuditRepo::record(
            &mut *tx,
            &CreateAuditRecord {
                entity_type: EntityType::Book,
                entity_id: id,
                action: ACTION_STOCK_UPDATE,
                user_id: actor,
                details: Some(serde_json::json!({
                    "adjustment": adjustment,
                    "description": adjustment.describe(),
                    "previous": current,
                    "current": quantity,
                })),
            },
        )
        .await?;

        tx.commit().await?;
        tracing::debug!(book_id = id, previous = current, current = quantity, "Stock updated");
        Ok(StockUpdate::Updated(book))
    }

    // -----------------------------------------------------------------------
    // Internal helpers
    // -----------------------------------------------------------------------

    /// Replace author associations within an existing transaction.
    async fn set_authors_inner(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        book_id: DbId,
        author_ids: &[DbId],
    ) -> Result<(), sqlx::Error> {
        // Delete existing
        sqlx::query("DELETE FROM book_authors WHERE book_id = $1")
            .bind(book_id)
            .execute(&mut **tx)
            .await?;

        // Insert new associations
        for author_id in author_ids {
            sqlx::query(
                "INSERT INTO book_authors (book_id, author_id) VALUES ($1, $2) \
                 ON CONFLICT DO NOTHING",
            )
            .bind(book_id)
            .bind(author_id)
            .execute(&mut **tx)
            .await?;
        }

        Ok(())
    }
}
