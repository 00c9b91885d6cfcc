// handlers/protected/campaigns/delete.rs - DELETE /api/campaigns/:id handler

use axum::{extract::State, Extension};
use serde_json::{json, Value};

use crate::access::{can_edit_campaign, ensure};
use crate::api::ResourceId;
use crate::handlers::protected::utils::load_campaign;
use crate::middleware::{ApiResponse, ApiResult, ValidatedUser};
use crate::state::AppState;

/// Hard delete. Recommendations, content and metrics go with the campaign;
/// audit entries that mention it are kept.
pub async fn campaign_delete(
    State(state): State<AppState>,
    Extension(current): Extension<ValidatedUser>,
    ResourceId(id): ResourceId,
) -> ApiResult<Value> {
    let mut uow = state.store.begin().await?;
    let campaign = load_campaign(uow.as_mut(), id).await?;

    ensure(can_edit_campaign(&current.actor, &campaign), "Insufficient permissions")?;

    uow.delete_campaign(campaign.id).await?;
    uow.commit().await?;

    tracing::info!("Campaign {} deleted by user {}", campaign.id, current.actor.id);
    Ok(ApiResponse::success(json!({ "message": "Campaign deleted successfully" })))
}
