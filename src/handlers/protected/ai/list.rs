// handlers/protected/ai/list.rs - GET /api/ai/recommendations handler

use axum::{extract::State, Extension};
use serde::Deserialize;
use serde_json::Value;

use crate::access::{list_scope, ListScope};
use crate::api::{paginated, parse_field, QueryParams};
use crate::database::models::RecommendationFilter;
use crate::database::{Page, PageRequest};
use crate::middleware::{ApiResponse, ApiResult, ValidatedUser};
use crate::state::AppState;
use crate::types::{AgentType, RecommendationStatus};

#[derive(Debug, Default, Deserialize)]
pub struct RecommendationListQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub agent_type: Option<String>,
    pub status: Option<String>,
    pub campaign_id: Option<i64>,
}

/// Newest first. Only recommendations on campaigns of the caller's tenant.
pub async fn recommendation_list(
    State(state): State<AppState>,
    Extension(current): Extension<ValidatedUser>,
    QueryParams(query): QueryParams<RecommendationListQuery>,
) -> ApiResult<Value> {
    let request = PageRequest::new(query.page, query.per_page);
    let agent_type = parse_field::<AgentType>("agent_type", query.agent_type.as_deref())?;
    let status = parse_field::<RecommendationStatus>("status", query.status.as_deref())?;

    let organization_id = match list_scope(&current.actor) {
        ListScope::All => None,
        ListScope::Organization(own) => Some(own),
        ListScope::Nothing => {
            return Ok(ApiResponse::success(paginated("recommendations", Page::<()>::empty(request))));
        }
    };

    let filter = RecommendationFilter {
        organization_id,
        campaign_id: query.campaign_id,
        agent_type,
        status,
    };

    let mut uow = state.store.begin().await?;
    let page = uow.list_recommendations(&filter, request).await?;

    Ok(ApiResponse::success(paginated("recommendations", page)))
}
