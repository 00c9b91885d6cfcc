// handlers/protected/organizations/create.rs - POST /api/organizations handler

use axum::{extract::State, Extension};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::access::{ensure, role_required};
use crate::api::{optional_text, parse_field, require, require_text, JsonBody};
use crate::database::models::NewOrganization;
use crate::middleware::{ApiResponse, ApiResult, ValidatedUser};
use crate::state::AppState;
use crate::types::{ComplianceStatus, OrganizationType, Role};

#[derive(Debug, Deserialize)]
pub struct CreateOrganizationRequest {
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub org_type: Option<String>,
    pub registration_number: Option<String>,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
    pub address: Option<String>,
    pub compliance_status: Option<String>,
}

/// super_admin only. New organizations start active with compliance pending
/// unless a status is given.
pub async fn organization_create(
    State(state): State<AppState>,
    Extension(current): Extension<ValidatedUser>,
    JsonBody(body): JsonBody<CreateOrganizationRequest>,
) -> ApiResult<Value> {
    ensure(role_required(&[Role::SuperAdmin], &current.actor), "Insufficient permissions")?;

    let name = require_text("name", body.name)?;
    let org_type = require("type", parse_field::<OrganizationType>("type", body.org_type.as_deref())?)?;
    let compliance_status = parse_field::<ComplianceStatus>("compliance_status", body.compliance_status.as_deref())?
        .unwrap_or(ComplianceStatus::Pending);

    let mut uow = state.store.begin().await?;
    let organization = uow
        .insert_organization(NewOrganization {
            name,
            org_type,
            registration_number: optional_text(body.registration_number),
            contact_email: optional_text(body.contact_email),
            contact_phone: optional_text(body.contact_phone),
            address: optional_text(body.address),
            is_active: true,
            compliance_status,
        })
        .await?;
    uow.commit().await?;

    tracing::info!("Organization {} created by user {}", organization.id, current.actor.id);
    Ok(ApiResponse::created(json!({
        "message": "Organization created successfully",
        "organization": organization
    })))
}
