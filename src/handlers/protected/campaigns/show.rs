// handlers/protected/campaigns/show.rs - GET /api/campaigns/:id handler

use axum::{extract::State, Extension};

use crate::access::{can_access_campaign, ensure};
use crate::api::ResourceId;
use crate::database::models::Campaign;
use crate::handlers::protected::utils::load_campaign;
use crate::middleware::{ApiResponse, ApiResult, ValidatedUser};
use crate::state::AppState;

pub async fn campaign_show(
    State(state): State<AppState>,
    Extension(current): Extension<ValidatedUser>,
    ResourceId(id): ResourceId,
) -> ApiResult<Campaign> {
    let mut uow = state.store.begin().await?;
    let campaign = load_campaign(uow.as_mut(), id).await?;

    ensure(can_access_campaign(&current.actor, &campaign), "Insufficient permissions")?;

    Ok(ApiResponse::success(campaign))
}
