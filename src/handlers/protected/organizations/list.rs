// handlers/protected/organizations/list.rs - GET /api/organizations handler

use axum::{extract::State, Extension};
use serde::Deserialize;
use serde_json::Value;

use crate::access::{list_scope, ListScope};
use crate::api::{paginated, parse_field, QueryParams};
use crate::database::models::OrganizationFilter;
use crate::database::{Page, PageRequest};
use crate::middleware::{ApiResponse, ApiResult, ValidatedUser};
use crate::state::AppState;
use crate::types::OrganizationType;

#[derive(Debug, Default, Deserialize)]
pub struct OrganizationListQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    #[serde(rename = "type")]
    pub org_type: Option<String>,
    pub is_active: Option<bool>,
}

/// super_admin sees every organization; everyone else only their own
pub async fn organization_list(
    State(state): State<AppState>,
    Extension(current): Extension<ValidatedUser>,
    QueryParams(query): QueryParams<OrganizationListQuery>,
) -> ApiResult<Value> {
    let request = PageRequest::new(query.page, query.per_page);
    let org_type = parse_field::<OrganizationType>("type", query.org_type.as_deref())?;

    let id = match list_scope(&current.actor) {
        ListScope::All => None,
        ListScope::Organization(own) => Some(own),
        ListScope::Nothing => {
            return Ok(ApiResponse::success(paginated("organizations", Page::<()>::empty(request))));
        }
    };

    let filter = OrganizationFilter {
        id,
        org_type,
        is_active: query.is_active,
    };

    let mut uow = state.store.begin().await?;
    let page = uow.list_organizations(&filter, request).await?;

    Ok(ApiResponse::success(paginated("organizations", page)))
}
