//! Repository for `user_sessions`.
//!
//! A session is live while `revoked_at IS NULL` and `expires_at` is in the
//! future. Revocation stamps `revoked_at`; rows are never updated otherwise.

use bookstore_core::types::DbId;
use sqlx::{PgPool, Postgres};

use crate::models::session::{NewSession, UserSession};

const COLUMNS: &str = "id, user_id, refresh_token_hash, expires_at, revoked_at, created_at";

pub struct SessionRepo;

impl SessionRepo {
    pub async fn open(pool: &PgPool, session: &NewSession<'_>) -> Result<UserSession, sqlx::Error> {
        Self::insert(pool, session).await
    }

    /// The live session holding this refresh-token digest, if any.
    pub async fn find_live(pool: &PgPool, hash: &str) -> Result<Option<UserSession>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM user_sessions
             WHERE refresh_token_hash = $1 AND revoked_at IS NULL AND expires_at > NOW()"
        );
        sqlx::query_as::<_, UserSession>(&query)
            .bind(hash)
            .fetch_optional(pool)
            .await
    }

    /// Revoke session `old_id` and open `next` in one transaction.
    ///
    /// Returns `None` (and opens nothing) when `old_id` was already revoked,
    /// so two concurrent refreshes with the same token cannot both succeed.
    pub async fn rotate(
        pool: &PgPool,
        old_id: DbId,
        next: &NewSession<'_>,
    ) -> Result<Option<UserSession>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let revoked = sqlx::query(
            "UPDATE user_sessions SET revoked_at = NOW() WHERE id = $1 AND revoked_at IS NULL",
        )
        .bind(old_id)
        .execute(&mut *tx)
        .await?
        .rows_affected();
        if revoked == 0 {
            return Ok(None);
        }

        let session = Self::insert(&mut *tx, next).await?;
        tx.commit().await?;
        Ok(Some(session))
    }

    /// Revoke every live session of a user. Returns how many were revoked.
    pub async fn revoke_all(pool: &PgPool, user_id: DbId) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE user_sessions SET revoked_at = NOW()
             WHERE user_id = $1 AND revoked_at IS NULL",
        )
        .bind(user_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    async fn insert<'e, E>(executor: E, session: &NewSession<'_>) -> Result<UserSession, sqlx::Error>
    where
        E: sqlx::Executor<'e, Database = Postgres>,
    {
        let query = format!(
            "INSERT INTO user_sessions (user_id, refresh_token_hash, expires_at)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, UserSession>(&query)
            .bind(session.user_id)
            .bind(session.refresh_token_hash)
            .bind(session.expires_at)
            .fetch_one(executor)
            .await
    }
}
