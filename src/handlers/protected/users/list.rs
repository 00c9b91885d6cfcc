// handlers/protected/users/list.rs - GET /api/users handler

use axum::{extract::State, Extension};
use serde::Deserialize;
use serde_json::Value;

use crate::access::{ensure, role_required, USER_MANAGERS};
use crate::api::{paginated, parse_field, QueryParams};
use crate::database::models::UserFilter;
use crate::database::{Page, PageRequest};
use crate::handlers::protected::utils::scoped_organization;
use crate::middleware::{ApiResponse, ApiResult, ValidatedUser};
use crate::state::AppState;
use crate::types::Role;

#[derive(Debug, Default, Deserialize)]
pub struct UserListQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub role: Option<String>,
    pub is_active: Option<bool>,
    pub organization_id: Option<i64>,
}

/// Paginated users of the caller's tenant (every tenant for super_admin)
pub async fn user_list(
    State(state): State<AppState>,
    Extension(current): Extension<ValidatedUser>,
    QueryParams(query): QueryParams<UserListQuery>,
) -> ApiResult<Value> {
    let actor = current.actor;
    ensure(role_required(USER_MANAGERS, &actor), "Insufficient permissions")?;

    let request = PageRequest::new(query.page, query.per_page);
    let role = parse_field::<Role>("role", query.role.as_deref())?;

    let Some(organization_id) = scoped_organization(&actor, query.organization_id) else {
        return Ok(ApiResponse::success(paginated("users", Page::<()>::empty(request))));
    };

    let filter = UserFilter {
        organization_id,
        role,
        is_active: query.is_active,
    };

    let mut uow = state.store.begin().await?;
    let page = uow.list_users(&filter, request).await?;

    Ok(ApiResponse::success(paginated("users", page)))
}
