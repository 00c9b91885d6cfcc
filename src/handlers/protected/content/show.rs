// handlers/protected/content/show.rs - GET /api/content/:id handler

use axum::{extract::State, Extension};

use crate::access::{can_access_campaign, ensure};
use crate::api::ResourceId;
use crate::database::models::Content;
use crate::handlers::protected::utils::{load_campaign, load_content};
use crate::middleware::{ApiResponse, ApiResult, ValidatedUser};
use crate::state::AppState;

pub async fn content_show(
    State(state): State<AppState>,
    Extension(current): Extension<ValidatedUser>,
    ResourceId(id): ResourceId,
) -> ApiResult<Content> {
    let mut uow = state.store.begin().await?;
    let content = load_content(uow.as_mut(), id).await?;
    let campaign = load_campaign(uow.as_mut(), content.campaign_id).await?;

    ensure(can_access_campaign(&current.actor, &campaign), "Insufficient permissions")?;

    Ok(ApiResponse::success(content))
}
