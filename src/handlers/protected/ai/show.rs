// handlers/protected/ai/show.rs - GET /api/ai/recommendations/:id handler

use axum::{extract::State, Extension};

use crate::access::{can_access_campaign, ensure};
use crate::api::ResourceId;
use crate::database::models::Recommendation;
use crate::handlers::protected::utils::{load_campaign, load_recommendation};
use crate::middleware::{ApiResponse, ApiResult, ValidatedUser};
use crate::state::AppState;

pub async fn recommendation_show(
    State(state): State<AppState>,
    Extension(current): Extension<ValidatedUser>,
    ResourceId(id): ResourceId,
) -> ApiResult<Recommendation> {
    let mut uow = state.store.begin().await?;
    let recommendation = load_recommendation(uow.as_mut(), id).await?;
    let campaign = load_campaign(uow.as_mut(), recommendation.campaign_id).await?;

    ensure(can_access_campaign(&current.actor, &campaign), "Insufficient permissions")?;

    Ok(ApiResponse::success(recommendation))
}
