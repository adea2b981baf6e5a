//! Handler for reading an entity's audit trail.

use axum::extract::{Path, State};
use axum::Json;
use bookstore_core::catalog::EntityType;
use bookstore_core::types::DbId;
use bookstore_db::models::audit::AuditRecord;
use bookstore_db::repositories::AuditRepo;

use crate::error::{validation, AppResult};
use crate::middleware::rbac::RequireModerator;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/audit/{entity_type}/{id}
///
/// `entity_type` is one of `category`, `author`, `book`. Records of deleted
/// entities are gone with them, so an unknown id yields an empty list.
pub async fn entity_audit_trail(
    State(state): State<AppState>,
    RequireModerator(_user): RequireModerator,
    Path((entity_type, id)): Path<(String, DbId)>,
) -> AppResult<Json<DataResponse<Vec<AuditRecord>>>> {
    let entity: EntityType = entity_type.parse().map_err(validation)?;
    let records = AuditRepo::list_for_entity(&state.pool, entity, id).await?;
    Ok(Json(DataResponse { data: records }))
}
