// handlers/protected/campaigns/list.rs - GET /api/campaigns handler

use axum::{extract::State, Extension};
use serde::Deserialize;
use serde_json::Value;

use crate::api::{paginated, parse_field, QueryParams};
use crate::database::models::CampaignFilter;
use crate::database::{Page, PageRequest};
use crate::handlers::protected::utils::scoped_organization;
use crate::middleware::{ApiResponse, ApiResult, ValidatedUser};
use crate::state::AppState;
use crate::types::{CampaignStatus, CampaignType};

#[derive(Debug, Default, Deserialize)]
pub struct CampaignListQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub organization_id: Option<i64>,
    pub status: Option<String>,
    pub campaign_type: Option<String>,
}

/// Newest first, restricted to the caller's tenant
pub async fn campaign_list(
    State(state): State<AppState>,
    Extension(current): Extension<ValidatedUser>,
    QueryParams(query): QueryParams<CampaignListQuery>,
) -> ApiResult<Value> {
    let request = PageRequest::new(query.page, query.per_page);
    let status = parse_field::<CampaignStatus>("status", query.status.as_deref())?;
    let campaign_type = parse_field::<CampaignType>("campaign_type", query.campaign_type.as_deref())?;

    let Some(organization_id) = scoped_organization(&current.actor, query.organization_id) else {
        return Ok(ApiResponse::success(paginated("campaigns", Page::<()>::empty(request))));
    };

    let filter = CampaignFilter {
        organization_id,
        status,
        campaign_type,
    };

    let mut uow = state.store.begin().await?;
    let page = uow.list_campaigns(&filter, request).await?;

    Ok(ApiResponse::success(paginated("campaigns", page)))
}
