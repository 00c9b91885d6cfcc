// handlers/protected/organizations/delete.rs - DELETE /api/organizations/:id handler

use axum::{extract::State, Extension};
use chrono::Utc;
use serde_json::{json, Value};

use crate::access::{ensure, role_required};
use crate::api::ResourceId;
use crate::handlers::protected::utils::load_organization;
use crate::middleware::{ApiResponse, ApiResult, ValidatedUser};
use crate::state::AppState;
use crate::types::Role;

/// super_admin only; deactivates rather than removes
pub async fn organization_delete(
    State(state): State<AppState>,
    Extension(current): Extension<ValidatedUser>,
    ResourceId(id): ResourceId,
) -> ApiResult<Value> {
    ensure(role_required(&[Role::SuperAdmin], &current.actor), "Insufficient permissions")?;

    let mut uow = state.store.begin().await?;
    let mut organization = load_organization(uow.as_mut(), id).await?;

    organization.is_active = false;
    organization.updated_at = Utc::now();
    uow.update_organization(&organization).await?;
    uow.commit().await?;

    tracing::info!("Organization {} deactivated by user {}", id, current.actor.id);
    Ok(ApiResponse::success(json!({ "message": "Organization deactivated successfully" })))
}
