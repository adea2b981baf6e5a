//! Delete, deletion-check and bulk-delete plumbing shared by the category,
//! author and book handlers.
//!
//! Every catalog delete goes through [`CatalogIntegrity`], never through a
//! repository, so audit records and author links are always purged with the
//! row.
//!
//! [`CatalogIntegrity`]: bookstore_core::integrity::CatalogIntegrity

use axum::http::StatusCode;
use axum::Json;
use bookstore_core::catalog::EntityType;
use bookstore_core::integrity::{BulkDeleteReport, DeletionCheck};
use bookstore_core::types::DbId;

use crate::error::{validation, AppResult};
use crate::middleware::auth::AuthUser;
use crate::query::BulkDeleteRequest;
use crate::state::AppState;

/// Upper bound on ids accepted by one bulk delete.
pub const MAX_BULK_DELETE_IDS: usize = 500;

/// Delete one entity. Returns 204 No Content.
pub async fn delete_entity(
    state: &AppState,
    user: &AuthUser,
    entity: EntityType,
    id: DbId,
) -> AppResult<StatusCode> {
    state.integrity().delete(entity, id).await?;
    tracing::info!(
        entity = entity.as_str(),
        id,
        user_id = user.user_id,
        "Catalog entry deleted",
    );
    Ok(StatusCode::NO_CONTENT)
}

/// Report whether an entity could be deleted right now.
pub async fn check_entity(
    state: &AppState,
    entity: EntityType,
    id: DbId,
) -> AppResult<Json<DeletionCheck>> {
    let check = state.integrity().can_delete(entity, id).await?;
    Ok(Json(check))
}

/// Delete many entities in one transaction and report each id's outcome.
pub async fn bulk_delete_entities(
    state: &AppState,
    user: &AuthUser,
    entity: EntityType,
    input: BulkDeleteRequest,
) -> AppResult<Json<BulkDeleteReport>> {
    if input.ids.len() > MAX_BULK_DELETE_IDS {
        return Err(validation(format!(
            "At most {MAX_BULK_DELETE_IDS} ids can be deleted at once"
        )));
    }

    let report = state.integrity().bulk_delete(entity, &input.ids).await?;
    tracing::info!(
        entity = entity.as_str(),
        user_id = user.user_id,
        requested = input.ids.len(),
        deleted = report.deleted.len(),
        blocked = report.blocked.len(),
        "Bulk delete requested",
    );
    Ok(Json(report))
}
