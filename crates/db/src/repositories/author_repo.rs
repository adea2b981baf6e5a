//! Repository for the `authors` table.

use bookstore_core::catalog::EntityType;
use bookstore_core::search::{ilike_pattern, resolve_ordering};
use bookstore_core::types::DbId;
use sqlx::PgPool;

use crate::models::audit::{CreateAuditRecord, ACTION_CREATE, ACTION_UPDATE};
use crate::models::author::{Author, AuthorListParams, CreateAuthor, UpdateAuthor};
use crate::repositories::AuditRepo;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, first_name, last_name, email, bio, birth_date, created_at, updated_at";

/// Same columns qualified with the `a.` alias, for joins.
const JOIN_COLUMNS: &str = "a.id, a.first_name, a.last_name, a.email, a.bio, a.birth_date, \
                            a.created_at, a.updated_at";

/// Columns accepted by `?ordering=`.
const ORDERING_FIELDS: &[&str] = &["first_name", "last_name", "created_at"];

/// Provides create, read and update operations for authors.
pub struct AuthorRepo;

impl AuthorRepo {
    /// Insert a new author and record its creation.
    pub async fn create(
        pool: &PgPool,
        input: &CreateAuthor,
        actor: Option<DbId>,
    ) -> Result<Author, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "INSERT INTO authors (first_name, last_name, email, bio, birth_date)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        let author = sqlx::query_as::<_, Author>(&query)
            .bind(&input.first_name)
            .bind(&input.last_name)
            .bind(&input.email)
            .bind(&input.bio)
            .bind(input.birth_date)
            .fetch_one(&mut *tx)
            .await?;

        AuditRepo::record(
            &mut *tx,
            &CreateAuditRecord {
                entity_type: EntityType::Author,
                entity_id: author.id,
                action: ACTION_CREATE,
                user_id: actor,
                details: None,
            },
        )
        .await?;

        tx.commit().await?;
        Ok(author)
    }

    /// Find an author by internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Author>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM authors WHERE id = $1");
        sqlx::query_as::<_, Author>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List authors with optional free-text search over first name, last
    /// name and email. Ordering defaults to `last_name`.
    pub async fn list(
        pool: &PgPool,
        params: &AuthorListParams,
    ) -> Result<Vec<Author>, sqlx::Error> {
        let order_by = resolve_ordering(params.ordering.as_deref(), ORDERING_FIELDS, "last_name");

        match params.search.as_deref().and_then(ilike_pattern) {
            Some(pattern) => {
                let query = format!(
                    "SELECT {COLUMNS} FROM authors
                     WHERE first_name ILIKE $1 OR last_name ILIKE $1 OR email ILIKE $1
                     ORDER BY {order_by}, id"
                );
                sqlx::query_as::<_, Author>(&query)
                    .bind(pattern)
                    .fetch_all(pool)
                    .await
            }
            None => {
                let query = format!("SELECT {COLUMNS} FROM authors ORDER BY {order_by}, id");
                sqlx::query_as::<_, Author>(&query).fetch_all(pool).await
            }
        }
    }

    /// Authors linked to a book, ordered by last then first name.
    pub async fn list_for_book(pool: &PgPool, book_id: DbId) -> Result<Vec<Author>, sqlx::Error> {
        let query = format!(
            "SELECT {JOIN_COLUMNS}
             FROM authors a
             JOIN book_authors ba ON ba.author_id = a.id
             WHERE ba.book_id = $1
             ORDER BY a.last_name, a.first_name"
        );
        sqlx::query_as::<_, Author>(&query)
            .bind(book_id)
            .fetch_all(pool)
            .await
    }

    /// Return the subset of `ids` that do not exist, in input order.
    pub async fn find_missing(pool: &PgPool, ids: &[DbId]) -> Result<Vec<DbId>, sqlx::Error> {
        let found: Vec<DbId> = sqlx::query_scalar("SELECT id FROM authors WHERE id = ANY($1)")
            .bind(ids)
            .fetch_all(pool)
            .await?;
        Ok(ids.iter().copied().filter(|id| !found.contains(id)).collect())
    }

    /// Update an author. Only non-`None` fields in `input` are applied.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateAuthor,
        actor: Option<DbId>,
    ) -> Result<Option<Author>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "UPDATE authors SET
                first_name = COALESCE($2, first_name),
                last_name = COALESCE($3, last_name),
                email = COALESCE($4, email),
                bio = COALESCE($5, bio),
                birth_date = COALESCE($6, birth_date)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        let author = sqlx::query_as::<_, Author>(&query)
            .bind(id)
            .bind(&input.first_name)
            .bind(&input.last_name)
            .bind(&input.email)
            .bind(&input.bio)
            .bind(input.birth_date)
            .fetch_optional(&mut *tx)
            .await?;

        if author.is_some() {
            AuditRepo::record(
                &mut *tx,
                &CreateAuditRecord {
                    entity_type: EntityType::Author,
                    entity_id: id,
                    action: ACTION_UPDATE,
                    user_id: actor,
                    details: None,
                },
            )
            .await?;
        }

        tx.commit().await?;
        Ok(author)
    }
}
