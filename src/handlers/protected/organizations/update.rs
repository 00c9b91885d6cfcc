// handlers/protected/organizations/update.rs - PUT /api/organizations/:id handler

use axum::{extract::State, Extension};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::access::{can_edit_organization, ensure};
use crate::api::{optional_text, parse_field, JsonBody, ResourceId};
use crate::error::ApiError;
use crate::handlers::protected::utils::load_organization;
use crate::middleware::{ApiResponse, ApiResult, ValidatedUser};
use crate::state::AppState;
use crate::types::{ComplianceStatus, OrganizationType};

#[derive(Debug, Default, Deserialize)]
pub struct UpdateOrganizationRequest {
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub org_type: Option<String>,
    pub registration_number: Option<String>,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
    pub address: Option<String>,
    pub is_active: Option<bool>,
    pub compliance_status: Option<String>,
}

pub async fn organization_update(
    State(state): State<AppState>,
    Extension(current): Extension<ValidatedUser>,
    ResourceId(id): ResourceId,
    JsonBody(body): JsonBody<UpdateOrganizationRequest>,
) -> ApiResult<Value> {
    let actor = current.actor;
    ensure(can_edit_organization(&actor, id), "Insufficient permissions")?;

    // type, is_active and compliance_status belong to the platform operator
    if !actor.is_super_admin() {
        let restricted = [
            ("type", body.org_type.is_some()),
            ("is_active", body.is_active.is_some()),
            ("compliance_status", body.compliance_status.is_some()),
        ];
        if let Some((field, _)) = restricted.iter().find(|(_, present)| *present) {
            return Err(ApiError::forbidden(format!("Only super_admin can modify {}", field)));
        }
    }

    let org_type = parse_field::<OrganizationType>("type", body.org_type.as_deref())?;
    let compliance_status = parse_field::<ComplianceStatus>("compliance_status", body.compliance_status.as_deref())?;

    let mut uow = state.store.begin().await?;
    let mut organization = load_organization(uow.as_mut(), id).await?;

    if let Some(name) = body.name {
        organization.name = optional_text(Some(name))
            .ok_or_else(|| ApiError::field_error("name", "name must not be empty"))?;
    }
    if let Some(value) = body.registration_number {
        organization.registration_number = optional_text(Some(value));
    }
    if let Some(value) = body.contact_email {
        organization.contact_email = optional_text(Some(value));
    }
    if let Some(value) = body.contact_phone {
        organization.contact_phone = optional_text(Some(value));
    }
    if let Some(value) = body.address {
        organization.address = optional_text(Some(value));
    }
    if let Some(org_type) = org_type {
        organization.org_type = org_type;
    }
    if let Some(is_active) = body.is_active {
        organization.is_active = is_active;
    }
    if let Some(status) = compliance_status {
        organization.compliance_status = status;
    }

    organization.updated_at = Utc::now();
    uow.update_organization(&organization).await?;
    uow.commit().await?;

    tracing::info!("Organization {} updated by user {}", organization.id, actor.id);
    Ok(ApiResponse::success(json!({
        "message": "Organization updated successfully",
        "organization": organization
    })))
}
