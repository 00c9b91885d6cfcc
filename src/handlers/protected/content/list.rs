// handlers/protected/content/list.rs - GET /api/campaigns/:id/content handler

use axum::{extract::State, Extension};
use serde::Deserialize;
use serde_json::Value;

use crate::access::{can_access_campaign, ensure};
use crate::api::{paginated, QueryParams, ResourceId};
use crate::database::PageRequest;
use crate::handlers::protected::utils::load_campaign;
use crate::middleware::{ApiResponse, ApiResult, ValidatedUser};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct ContentListQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

pub async fn content_list(
    State(state): State<AppState>,
    Extension(current): Extension<ValidatedUser>,
    ResourceId(campaign_id): ResourceId,
    QueryParams(query): QueryParams<ContentListQuery>,
) -> ApiResult<Value> {
    let mut uow = state.store.begin().await?;
    let campaign = load_campaign(uow.as_mut(), campaign_id).await?;

    ensure(can_access_campaign(&current.actor, &campaign), "Insufficient permissions")?;

    let page = uow
        .list_content(campaign.id, PageRequest::new(query.page, query.per_page))
        .await?;

    Ok(ApiResponse::success(paginated("content", page)))
}
