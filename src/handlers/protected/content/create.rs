// handlers/protected/content/create.rs - POST /api/campaigns/:id/content handler

use axum::{extract::State, Extension};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::access::{can_access_campaign, ensure, role_required, CONTENT_CREATORS};
use crate::api::{optional_text, parse_field, require, require_text, JsonBody, ResourceId};
use crate::audit::Origin;
use crate::database::models::{NewContent, Recommendation};
use crate::error::ApiError;
use crate::handlers::protected::utils::{load_campaign, load_recommendation};
use crate::middleware::{ApiResponse, ApiResult, ValidatedUser};
use crate::state::AppState;
use crate::types::{ContentStatus, ContentType, RecommendationStatus};

#[derive(Debug, Deserialize)]
pub struct CreateContentRequest {
    pub content_type: Option<String>,
    pub title: Option<String>,
    pub body: Option<String>,
    pub status: Option<String>,
    pub recommendation_id: Option<i64>,
}

/// Where AI-generated content came from
fn provenance(recommendation: &Recommendation) -> Value {
    json!({
        "recommendation_id": recommendation.id,
        "agent_type": recommendation.agent_type,
        "model_used": recommendation
            .recommendation_data
            .get("model_used")
            .cloned()
            .unwrap_or(Value::Null),
    })
}

/**
 * POST /api/campaigns/:id/content - Create content for a campaign
 *
 * Expected Input:
 * ```json
 * {
 *   "content_type": "post",       // Required: post | video_script | infographic | article
 *   "body": "string",             // Required
 *   "title": "string",            // Optional
 *   "status": "pending_review",   // Optional: draft (default) | pending_review
 *   "recommendation_id": 12       // Optional: approved recommendation of this campaign
 * }
 * ```
 */
pub async fn content_create(
    State(state): State<AppState>,
    Extension(current): Extension<ValidatedUser>,
    origin: Origin,
    ResourceId(campaign_id): ResourceId,
    JsonBody(body): JsonBody<CreateContentRequest>,
) -> ApiResult<Value> {
    let actor = current.actor;

    let content_type = require(
        "content_type",
        parse_field::<ContentType>("content_type", body.content_type.as_deref())?,
    )?;
    let text = require_text("body", body.body)?;
    let status = parse_field::<ContentStatus>("status", body.status.as_deref())?.unwrap_or(ContentStatus::Draft);
    if !matches!(status, ContentStatus::Draft | ContentStatus::PendingReview) {
        return Err(ApiError::field_error("status", "New content must be draft or pending_review"));
    }

    let mut uow = state.store.begin().await?;
    let campaign = load_campaign(uow.as_mut(), campaign_id).await?;

    ensure(can_access_campaign(&actor, &campaign), "Insufficient permissions")?;
    ensure(role_required(CONTENT_CREATORS, &actor), "Insufficient permissions to create content")?;

    let source = match body.recommendation_id {
        Some(id) => {
            let recommendation = load_recommendation(uow.as_mut(), id).await?;
            if recommendation.campaign_id != campaign.id {
                return Err(ApiError::field_error(
                    "recommendation_id",
                    "Recommendation does not belong to this campaign",
                ));
            }
            if recommendation.status != RecommendationStatus::Approved {
                return Err(ApiError::field_error(
                    "recommendation_id",
                    "Only approved recommendations can be used for content",
                ));
            }
            Some(recommendation)
        }
        None => None,
    };

    let content = uow
        .insert_content(NewContent {
            campaign_id: campaign.id,
            content_type,
            title: optional_text(body.title),
            body: text,
            ai_generated: source.is_some(),
            provenance_metadata: source.as_ref().map(provenance).unwrap_or_else(|| json!({})),
            status,
            created_by: actor.id,
        })
        .await?;
    uow.commit().await?;

    tracing::info!("Content {} created for campaign {} by user {}", content.id, campaign.id, actor.id);
    state
        .audit
        .content_created(actor.id, content.id, content.ai_generated, &origin)
        .await;

    Ok(ApiResponse::created(json!({
        "message": "Content created successfully",
        "content": content
    })))
}
