// handlers/protected/campaigns/update.rs - PUT /api/campaigns/:id handler

use axum::{extract::State, Extension};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};

use super::{check_date_range, parse_date};
use crate::access::{can_edit_campaign, ensure};
use crate::api::{optional_text, parse_field, JsonBody, ResourceId};
use crate::error::ApiError;
use crate::handlers::protected::utils::load_campaign;
use crate::middleware::{ApiResponse, ApiResult, ValidatedUser};
use crate::state::AppState;
use crate::types::CampaignStatus;

#[derive(Debug, Default, Deserialize)]
pub struct UpdateCampaignRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub target_audience: Option<String>,
    pub objectives: Option<String>,
}

/// Any status may be set by an editor; there is no transition order
pub async fn campaign_update(
    State(state): State<AppState>,
    Extension(current): Extension<ValidatedUser>,
    ResourceId(id): ResourceId,
    JsonBody(body): JsonBody<UpdateCampaignRequest>,
) -> ApiResult<Value> {
    let mut uow = state.store.begin().await?;
    let mut campaign = load_campaign(uow.as_mut(), id).await?;

    ensure(can_edit_campaign(&current.actor, &campaign), "Insufficient permissions")?;

    if let Some(name) = body.name {
        campaign.name =
            optional_text(Some(name)).ok_or_else(|| ApiError::field_error("name", "name must not be empty"))?;
    }
    if let Some(description) = body.description {
        campaign.description = optional_text(Some(description));
    }
    if let Some(status) = parse_field::<CampaignStatus>("status", body.status.as_deref())? {
        campaign.status = status;
    }
    if let Some(target_audience) = body.target_audience {
        campaign.target_audience = optional_text(Some(target_audience));
    }
    if let Some(objectives) = body.objectives {
        campaign.objectives = optional_text(Some(objectives));
    }
    if let Some(start_date) = body.start_date.as_deref() {
        campaign.start_date = Some(parse_date("start_date", start_date)?);
    }
    if let Some(end_date) = body.end_date.as_deref() {
        campaign.end_date = Some(parse_date("end_date", end_date)?);
    }
    check_date_range(campaign.start_date, campaign.end_date)?;

    campaign.updated_at = Utc::now();
    uow.update_campaign(&campaign).await?;
    uow.commit().await?;

    tracing::info!("Campaign {} updated by user {}", campaign.id, current.actor.id);
    Ok(ApiResponse::success(json!({
        "message": "Campaign updated successfully",
        "campaign": campaign
    })))
}
