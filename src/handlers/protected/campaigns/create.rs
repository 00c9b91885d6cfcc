// handlers/protected/campaigns/create.rs - POST /api/campaigns handler

use axum::{extract::State, Extension};
use serde::Deserialize;
use serde_json::{json, Value};

use super::{check_date_range, parse_date};
use crate::api::{optional_text, parse_field, require, require_text, JsonBody};
use crate::audit::Origin;
use crate::database::models::NewCampaign;
use crate::error::ApiError;
use crate::handlers::protected::utils::load_organization;
use crate::middleware::{ApiResponse, ApiResult, ValidatedUser};
use crate::state::AppState;
use crate::types::{CampaignStatus, CampaignType};

#[derive(Debug, Deserialize)]
pub struct CreateCampaignRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub campaign_type: Option<String>,
    pub status: Option<String>,
    pub organization_id: Option<i64>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub target_audience: Option<String>,
    pub objectives: Option<String>,
}

/**
 * POST /api/campaigns - Create a campaign
 *
 * Expected Input:
 * ```json
 * {
 *   "name": "string",               // Required
 *   "campaign_type": "advocacy",    // Required: political | civic_education | advocacy
 *   "organization_id": 1,           // super_admin only; others use their own organization
 *   "status": "draft",              // Optional, defaults to draft
 *   "start_date": "2024-03-01",     // Optional
 *   "end_date": "2024-06-01"        // Optional
 * }
 * ```
 */
pub async fn campaign_create(
    State(state): State<AppState>,
    Extension(current): Extension<ValidatedUser>,
    origin: Origin,
    JsonBody(body): JsonBody<CreateCampaignRequest>,
) -> ApiResult<Value> {
    let actor = current.actor;

    let name = require_text("name", body.name)?;
    let campaign_type = require(
        "campaign_type",
        parse_field::<CampaignType>("campaign_type", body.campaign_type.as_deref())?,
    )?;
    let status = parse_field::<CampaignStatus>("status", body.status.as_deref())?.unwrap_or(CampaignStatus::Draft);

    let organization_id = if actor.is_super_admin() {
        body.organization_id
    } else {
        actor.organization_id
    };
    let organization_id =
        organization_id.ok_or_else(|| ApiError::field_error("organization_id", "Organization ID is required"))?;

    let start_date = body.start_date.as_deref().map(|v| parse_date("start_date", v)).transpose()?;
    let end_date = body.end_date.as_deref().map(|v| parse_date("end_date", v)).transpose()?;
    check_date_range(start_date, end_date)?;

    let mut uow = state.store.begin().await?;
    load_organization(uow.as_mut(), organization_id).await?;

    let campaign = uow
        .insert_campaign(NewCampaign {
            name,
            description: optional_text(body.description),
            organization_id,
            campaign_type,
            status,
            start_date,
            end_date,
            target_audience: optional_text(body.target_audience),
            objectives: optional_text(body.objectives),
            created_by: actor.id,
        })
        .await?;
    uow.commit().await?;

    tracing::info!("Campaign {} created in organization {} by user {}", campaign.id, organization_id, actor.id);
    state.audit.campaign_created(actor.id, campaign.id, &origin).await;

    Ok(ApiResponse::created(json!({
        "message": "Campaign created successfully",
        "campaign": campaign
    })))
}
