// handlers/protected/organizations/show.rs - GET /api/organizations/:id handler

use axum::{extract::State, Extension};

use crate::access::{can_access_organization, ensure};
use crate::api::ResourceId;
use crate::database::models::OrganizationSummary;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, ValidatedUser};
use crate::state::AppState;

/// Organization with its user and campaign counts.
/// Access is decided before lookup so other tenants' ids stay opaque.
pub async fn organization_show(
    State(state): State<AppState>,
    Extension(current): Extension<ValidatedUser>,
    ResourceId(id): ResourceId,
) -> ApiResult<OrganizationSummary> {
    ensure(can_access_organization(&current.actor, id), "Insufficient permissions")?;

    let mut uow = state.store.begin().await?;
    let summary = uow
        .organization_summary(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Organization not found"))?;

    Ok(ApiResponse::success(summary))
}
