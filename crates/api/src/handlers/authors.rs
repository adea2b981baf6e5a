//! Handlers for the `/authors` resource.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use bookstore_core::catalog::{validate_required_text, EntityType, MAX_AUTHOR_NAME_LEN};
use bookstore_core::error::CoreError;
use bookstore_core::integrity::{BulkDeleteReport, DeletionCheck};
use bookstore_core::types::DbId;
use bookstore_db::models::author::{
    AuthorBooks, AuthorListParams, AuthorResponse, CreateAuthor, UpdateAuthor,
};
use bookstore_db::repositories::{AuthorRepo, BookRepo};

use super::deletion::{bulk_delete_entities, check_entity, delete_entity};
use crate::error::{validation, AppError, AppResult};
use crate::middleware::rbac::{RequireAuth, RequireModerator};
use crate::query::BulkDeleteRequest;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/authors
///
/// `?search=` matches first name, last name or email; `?ordering=` accepts
/// `first_name`, `last_name` or `created_at`, prefixed with `-` for
/// descending order.
pub async fn list_authors(
    State(state): State<AppState>,
    Query(params): Query<AuthorListParams>,
) -> AppResult<Json<DataResponse<Vec<AuthorResponse>>>> {
    let authors = AuthorRepo::list(&state.pool, &params).await?;
    Ok(Json(DataResponse {
        data: authors.into_iter().map(AuthorResponse::from).collect(),
    }))
}

/// POST /api/v1/authors
pub async fn create_author(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Json(input): Json<CreateAuthor>,
) -> AppResult<(StatusCode, Json<AuthorResponse>)> {
    let input = CreateAuthor {
        first_name: validate_required_text(&input.first_name, "First name", MAX_AUTHOR_NAME_LEN)
            .map_err(validation)?,
        last_name: validate_required_text(&input.last_name, "Last name", MAX_AUTHOR_NAME_LEN)
            .map_err(validation)?,
        email: normalize_email(input.email)?,
        bio: input.bio.trim().to_string(),
        birth_date: input.birth_date,
    };

    let author = AuthorRepo::create(&state.pool, &input, Some(user.user_id)).await?;
    tracing::info!(author_id = author.id, user_id = user.user_id, "Author created");
    Ok((StatusCode::CREATED, Json(author.into())))
}

/// GET /api/v1/authors/{id}
pub async fn get_author(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<AuthorResponse>> {
    let author = find_author(&state, id).await?;
    Ok(Json(author))
}

/// PUT /api/v1/authors/{id}
pub async fn update_author(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateAuthor>,
) -> AppResult<Json<AuthorResponse>> {
    let input = UpdateAuthor {
        first_name: input
            .first_name
            .map(|n| validate_required_text(&n, "First name", MAX_AUTHOR_NAME_LEN))
            .transpose()
            .map_err(validation)?,
        last_name: input
            .last_name
            .map(|n| validate_required_text(&n, "Last name", MAX_AUTHOR_NAME_LEN))
            .transpose()
            .map_err(validation)?,
        email: normalize_email(input.email)?,
        bio: input.bio.map(|b| b.trim().to_string()),
        birth_date: input.birth_date,
    };

    let author = AuthorRepo::update(&state.pool, id, &input, Some(user.user_id))
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Author",
            id,
        }))?;
    Ok(Json(author.into()))
}

/// DELETE /api/v1/authors/{id}
///
/// Never blocked: the author's book links are removed, the books stay.
pub async fn delete_author(
    State(state): State<AppState>,
    RequireModerator(user): RequireModerator,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    delete_entity(&state, &user, EntityType::Author, id).await
}

/// GET /api/v1/authors/{id}/deletion-check
pub async fn author_deletion_check(
    State(state): State<AppState>,
    RequireAuth(_user): RequireAuth,
    Path(id): Path<DbId>,
) -> AppResult<Json<DeletionCheck>> {
    check_entity(&state, EntityType::Author, id).await
}

/// POST /api/v1/authors/bulk-delete
pub async fn bulk_delete_authors(
    State(state): State<AppState>,
    RequireModerator(user): RequireModerator,
    Json(input): Json<BulkDeleteRequest>,
) -> AppResult<Json<BulkDeleteReport>> {
    bulk_delete_entities(&state, &user, EntityType::Author, input).await
}

/// GET /api/v1/authors/{id}/books
pub async fn author_books(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<AuthorBooks>> {
    let author = find_author(&state, id).await?;
    let books = BookRepo::list_by_author(&state.pool, id).await?;
    Ok(Json(AuthorBooks {
        author,
        count: books.len(),
        books,
    }))
}

async fn find_author(state: &AppState, id: DbId) -> AppResult<AuthorResponse> {
    AuthorRepo::find_by_id(&state.pool, id)
        .await?
        .map(AuthorResponse::from)
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Author",
            id,
        }))
}

/// Blank emails are stored as `NULL`; anything else must look like an
/// address. Only surrounding whitespace is removed: the address is an
/// identifier and keeps its case.
fn normalize_email(email: Option<String>) -> AppResult<Option<String>> {
    let Some(email) = email.map(|e| e.trim().to_string()) else {
        return Ok(None);
    };
    if email.is_empty() {
        return Ok(None);
    }
    if !validator::ValidateEmail::validate_email(&email) {
        return Err(validation(format!("'{email}' is not a valid email address")));
    }
    Ok(Some(email))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_is_trimmed_but_keeps_case() {
        assert_eq!(
            normalize_email(Some("  Ann.Smith@Example.com ".into())).unwrap(),
            Some("Ann.Smith@Example.com".to_string())
        );
    }

    #[test]
    fn blank_email_becomes_none() {
        assert_eq!(normalize_email(Some("   ".into())).unwrap(), None);
        assert_eq!(normalize_email(None).unwrap(), None);
    }

    #[test]
    fn malformed_email_is_rejected() {
        assert!(normalize_email(Some("not-an-address".into())).is_err());
    }
}
