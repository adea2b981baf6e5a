use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use bookstore_core::error::CoreError;
use bookstore_core::integrity::{IntegrityError, StoreError};
use bookstore_core::inventory::InventoryError;
use serde_json::json;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] and [`IntegrityError`] for domain errors and adds
/// HTTP-specific variants. Implements [`IntoResponse`] to produce consistent
/// JSON error responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `bookstore_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A failed delete or deletion check.
    #[error(transparent)]
    Integrity(#[from] IntegrityError),

    /// A database error from sqlx.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// An internal error with a human-readable message.
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl From<InventoryError> for AppError {
    fn from(err: InventoryError) -> Self {
        AppError::Core(CoreError::Validation(err.to_string()))
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::Core(CoreError::Validation(err.to_string()))
    }
}

/// Shorthand for a 400 with a validation message.
pub fn validation(msg: impl Into<String>) -> AppError {
    AppError::Core(CoreError::Validation(msg.into()))
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            // --- CoreError variants ---
            AppError::Core(core) => match core {
                CoreError::NotFound { entity, id } => (
                    StatusCode::NOT_FOUND,
                    "NOT_FOUND",
                    format!("{entity} with id {id} not found"),
                ),
                CoreError::Validation(msg) => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
                }
                CoreError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone()),
                CoreError::Unauthorized(msg) => {
                    (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone())
                }
                CoreError::Forbidden(msg) => (StatusCode::FORBIDDEN, "FORBIDDEN", msg.clone()),
                CoreError::Internal(msg) => {
                    tracing::error!(error = %msg, "Internal core error");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "INTERNAL_ERROR",
                        "An internal error occurred".to_string(),
                    )
                }
            },

            // --- Integrity errors ---
            AppError::Integrity(err) => classify_integrity_error(err),

            // --- Database errors ---
            AppError::Database(err) => classify_sqlx_error(err),

            // --- HTTP-specific errors ---
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}

/// Map an integrity failure to an HTTP status.
///
/// - `ConstraintBlocked` maps to 409 with the guard's reason.
/// - `NotFound` maps to 404.
/// - An unavailable store maps to 503, any other store failure to 500.
fn classify_integrity_error(err: &IntegrityError) -> (StatusCode, &'static str, String) {
    match err {
        IntegrityError::ConstraintBlocked { reason, .. } => {
            (StatusCode::CONFLICT, "DELETE_BLOCKED", reason.clone())
        }
        IntegrityError::NotFound { .. } => (StatusCode::NOT_FOUND, "NOT_FOUND", err.to_string()),
        IntegrityError::TransactionFailure(StoreError::Unavailable(msg)) => {
            tracing::error!(error = %msg, "Catalog store unavailable");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                "SERVICE_UNAVAILABLE",
                "The database is temporarily unavailable".to_string(),
            )
        }
        IntegrityError::TransactionFailure(StoreError::Query(msg)) => {
            tracing::error!(error = %msg, "Catalog transaction failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "An internal error occurred".to_string(),
            )
        }
    }
}

/// Classify a sqlx error into an HTTP status, error code, and message.
///
/// - `RowNotFound` maps to 404.
/// - Unique constraint violations (constraint name starting with `uq_`) map to 409.
/// - Foreign key and check constraint violations map to 400.
/// - Everything else maps to 500 with a sanitized message.
fn classify_sqlx_error(err: &sqlx::Error) -> (StatusCode, &'static str, String) {
    match err {
        sqlx::Error::RowNotFound => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            "Resource not found".to_string(),
        ),
        sqlx::Error::Database(db_err) => {
            let constraint = db_err.constraint().unwrap_or("unknown");
            match db_err.code().as_deref() {
                // unique_violation
                Some("23505") if constraint.starts_with("uq_") => {
                    return (
                        StatusCode::CONFLICT,
                        "CONFLICT",
                        format!("Duplicate value violates unique constraint: {constraint}"),
                    );
                }
                // foreign_key_violation
                Some("23503") => {
                    return (
                        StatusCode::BAD_REQUEST,
                        "VALIDATION_ERROR",
                        format!("Referenced record does not exist or is still in use: {constraint}"),
                    );
                }
                // check_violation
                Some("23514") => {
                    return (
                        StatusCode::BAD_REQUEST,
                        "VALIDATION_ERROR",
                        format!("Value violates check constraint: {constraint}"),
                    );
                }
                _ => {}
            }
            tracing::error!(error = %db_err, "Database error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "An internal error occurred".to_string(),
            )
        }
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed => {
            tracing::error!(error = %err, "Database pool unavailable");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                "SERVICE_UNAVAILABLE",
                "The database is temporarily unavailable".to_string(),
            )
        }
        other => {
            tracing::error!(error = %other, "Database error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "An internal error occurred".to_string(),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use bookstore_core::catalog::EntityType;

    use super::*;

    fn status_of(err: impl Into<AppError>) -> StatusCode {
        err.into().into_response().status()
    }

    #[test]
    fn blocked_delete_is_conflict() {
        let err = IntegrityError::ConstraintBlocked {
            entity: EntityType::Category,
            id: 1,
            reason: "Category is referenced by 2 books".into(),
        };
        assert_eq!(status_of(err), StatusCode::CONFLICT);
    }

    #[test]
    fn missing_entity_is_not_found() {
        let err = IntegrityError::NotFound {
            entity: EntityType::Book,
            id: 9,
        };
        assert_eq!(status_of(err), StatusCode::NOT_FOUND);
    }

    #[test]
    fn store_failures_split_by_kind() {
        let unavailable = IntegrityError::TransactionFailure(StoreError::Unavailable("x".into()));
        let query = IntegrityError::TransactionFailure(StoreError::Query("x".into()));
        assert_eq!(status_of(unavailable), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(status_of(query), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn inventory_errors_are_bad_requests() {
        let err = InventoryError::Insufficient {
            available: 2,
            requested: 5,
        };
        assert_eq!(status_of(err), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn row_not_found_is_not_found() {
        assert_eq!(status_of(sqlx::Error::RowNotFound), StatusCode::NOT_FOUND);
    }
}
