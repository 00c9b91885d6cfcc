// handlers/elevated/audit_logs.rs - GET /api/audit-logs handler

use axum::{extract::State, Extension};
use serde::Deserialize;
use serde_json::Value;

use crate::access::{list_scope, ListScope};
use crate::api::{paginated, QueryParams};
use crate::audit::{AuditAction, AuditResource};
use crate::database::models::AuditFilter;
use crate::database::{Page, PageRequest};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, ValidatedUser};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct AuditLogQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub action: Option<String>,
    pub resource_type: Option<String>,
    pub user_id: Option<i64>,
}

/**
 * GET /api/audit-logs - Paginated audit trail, newest first
 *
 * super_admin sees every entry. org_admin sees entries whose actor belongs
 * to their organization; entries without an actor (failed logins for
 * unknown emails) are only visible to super_admin.
 */
pub async fn audit_log_list(
    State(state): State<AppState>,
    Extension(current): Extension<ValidatedUser>,
    QueryParams(query): QueryParams<AuditLogQuery>,
) -> ApiResult<Value> {
    let request = PageRequest::new(query.page, query.per_page);

    let action = match query.action.as_deref() {
        Some(value) => Some(
            AuditAction::parse(value)
                .ok_or_else(|| ApiError::field_error("action", format!("unrecognized audit action: '{}'", value)))?,
        ),
        None => None,
    };
    let resource_type = match query.resource_type.as_deref() {
        Some(value) => Some(AuditResource::parse(value).ok_or_else(|| {
            ApiError::field_error("resource_type", format!("unrecognized resource type: '{}'", value))
        })?),
        None => None,
    };

    let organization_id = match list_scope(&current.actor) {
        ListScope::All => None,
        ListScope::Organization(own) => Some(own),
        ListScope::Nothing => {
            return Ok(ApiResponse::success(paginated("audit_logs", Page::<()>::empty(request))));
        }
    };

    let filter = AuditFilter {
        organization_id,
        user_id: query.user_id,
        action: action.map(|a| a.as_str().to_string()),
        resource_type: resource_type.map(|r| r.as_str().to_string()),
    };

    let page = state.audit.store().list(&filter, request).await?;

    Ok(ApiResponse::success(paginated("audit_logs", page)))
}
