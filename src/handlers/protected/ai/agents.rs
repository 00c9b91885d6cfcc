// handlers/protected/ai/agents.rs - AI agent invocation handlers

use axum::{extract::State, Extension};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::access::{can_access_campaign, ensure, Actor};
use crate::api::{optional_text, parse_field, require, require_text, JsonBody};
use crate::audit::Origin;
use crate::database::models::{Campaign, NewRecommendation};
use crate::handlers::protected::utils::load_campaign;
use crate::middleware::{ApiResponse, ApiResult, ValidatedUser};
use crate::services::GenerationRequest;
use crate::state::AppState;
use crate::types::{AgentType, ContentType, RecommendationStatus};

/// What gets stored once generation succeeds
struct AgentCall {
    agent_type: AgentType,
    prompt: Option<String>,
    status: RecommendationStatus,
    message: &'static str,
}

/// Shared flow: load and authorize the campaign, generate, store, audit.
///
/// The campaign is read in its own unit of work so no transaction stays
/// open across the generation call.
async fn run_agent(
    state: &AppState,
    actor: &Actor,
    origin: &Origin,
    campaign_id: Option<i64>,
    call: AgentCall,
    build: impl FnOnce(&Campaign) -> GenerationRequest,
) -> ApiResult<Value> {
    let campaign_id = require("campaign_id", campaign_id)?;

    let campaign = {
        let mut uow = state.store.begin().await?;
        load_campaign(uow.as_mut(), campaign_id).await?
    };
    ensure(can_access_campaign(actor, &campaign), "Insufficient permissions")?;

    let request = build(&campaign);
    let payload = state.generator.generate(&request).await?;

    let mut uow = state.store.begin().await?;
    let recommendation = uow
        .insert_recommendation(NewRecommendation {
            campaign_id: campaign.id,
            agent_type: call.agent_type,
            prompt: call.prompt,
            recommendation_data: payload,
            status: call.status,
            requested_by: actor.id,
        })
        .await?;
    uow.commit().await?;

    tracing::info!(
        "{} recommendation {} stored for campaign {} (model {})",
        call.agent_type,
        recommendation.id,
        campaign.id,
        state.generator.model_name()
    );
    state
        .audit
        .recommendation_requested(actor.id, recommendation.id, call.agent_type, origin)
        .await;

    Ok(ApiResponse::created(json!({
        "message": call.message,
        "recommendation_id": recommendation.id,
        "recommendation": recommendation
    })))
}

fn campaign_context(request: GenerationRequest, campaign: &Campaign) -> GenerationRequest {
    request
        .with("name", campaign.name.as_str())
        .with("campaign_type", campaign.campaign_type.as_str())
        .with("objectives", campaign.objectives.as_deref().unwrap_or("Not specified"))
        .with("target_audience", campaign.target_audience.as_deref().unwrap_or("General public"))
}

#[derive(Debug, Deserialize)]
pub struct NarrativeRequest {
    pub campaign_id: Option<i64>,
}

pub async fn narrative_architect_post(
    State(state): State<AppState>,
    Extension(current): Extension<ValidatedUser>,
    origin: Origin,
    JsonBody(body): JsonBody<NarrativeRequest>,
) -> ApiResult<Value> {
    let call = AgentCall {
        agent_type: AgentType::NarrativeArchitect,
        prompt: None,
        status: RecommendationStatus::Pending,
        message: "Narrative recommendations generated successfully",
    };
    run_agent(&state, &current.actor, &origin, body.campaign_id, call, |campaign| {
        campaign_context(GenerationRequest::new(AgentType::NarrativeArchitect), campaign)
    })
    .await
}

#[derive(Debug, Deserialize)]
pub struct ContentSynthesisRequest {
    pub campaign_id: Option<i64>,
    pub content_type: Option<String>,
    pub topic: Option<String>,
    pub narrative: Option<String>,
    pub platform: Option<String>,
}

pub async fn content_synthesizer_post(
    State(state): State<AppState>,
    Extension(current): Extension<ValidatedUser>,
    origin: Origin,
    JsonBody(body): JsonBody<ContentSynthesisRequest>,
) -> ApiResult<Value> {
    let content_type = require(
        "content_type",
        parse_field::<ContentType>("content_type", body.content_type.as_deref())?,
    )?;
    let topic = require_text("topic", body.topic)?;
    let narrative = optional_text(body.narrative).unwrap_or_default();
    let platform = optional_text(body.platform).unwrap_or_else(|| "general".to_string());

    let call = AgentCall {
        agent_type: AgentType::ContentSynthesizer,
        prompt: Some(topic.clone()),
        status: RecommendationStatus::Pending,
        message: "Content generated successfully",
    };
    run_agent(&state, &current.actor, &origin, body.campaign_id, call, |_| {
        GenerationRequest::new(AgentType::ContentSynthesizer)
            .with("content_type", content_type.as_str())
            .with("topic", topic)
            .with("narrative", narrative)
            .with("platform", platform)
    })
    .await
}

#[derive(Debug, Deserialize)]
pub struct DistributionRequest {
    pub campaign_id: Option<i64>,
    pub content_summary: Option<String>,
    pub target_audience: Option<String>,
    pub platforms: Option<Vec<String>>,
    pub budget: Option<Value>,
}

pub async fn distribution_optimizer_post(
    State(state): State<AppState>,
    Extension(current): Extension<ValidatedUser>,
    origin: Origin,
    JsonBody(body): JsonBody<DistributionRequest>,
) -> ApiResult<Value> {
    let content_summary = require_text("content_summary", body.content_summary)?;
    let platforms = body
        .platforms
        .unwrap_or_else(|| vec!["facebook".to_string(), "twitter".to_string(), "instagram".to_string()]);
    let budget = body.budget.unwrap_or_else(|| json!("N/A"));
    let target_audience = optional_text(body.target_audience);

    let call = AgentCall {
        agent_type: AgentType::DistributionOptimizer,
        prompt: Some(content_summary.clone()),
        status: RecommendationStatus::Pending,
        message: "Distribution recommendations generated successfully",
    };
    run_agent(&state, &current.actor, &origin, body.campaign_id, call, |campaign| {
        let audience = target_audience
            .or_else(|| campaign.target_audience.clone())
            .unwrap_or_else(|| "General public".to_string());
        GenerationRequest::new(AgentType::DistributionOptimizer)
            .with("content_summary", content_summary)
            .with("target_audience", audience)
            .with("platforms", platforms)
            .with("budget", budget)
    })
    .await
}

#[derive(Debug, Deserialize)]
pub struct FeedbackRequest {
    pub campaign_id: Option<i64>,
    pub engagement_metrics: Option<Value>,
    pub sample_comments: Option<Vec<Value>>,
    pub mentions: Option<Vec<Value>>,
}

/// Feedback analysis is informational and stored as `completed`
pub async fn feedback_intelligence_post(
    State(state): State<AppState>,
    Extension(current): Extension<ValidatedUser>,
    origin: Origin,
    JsonBody(body): JsonBody<FeedbackRequest>,
) -> ApiResult<Value> {
    let engagement_metrics = body.engagement_metrics.unwrap_or_else(|| json!({}));
    let sample_comments = body.sample_comments.unwrap_or_default();
    let mentions = body.mentions.unwrap_or_default();

    let call = AgentCall {
        agent_type: AgentType::FeedbackIntelligence,
        prompt: None,
        status: RecommendationStatus::Completed,
        message: "Feedback analysis completed successfully",
    };
    run_agent(&state, &current.actor, &origin, body.campaign_id, call, |_| {
        GenerationRequest::new(AgentType::FeedbackIntelligence)
            .with("engagement_metrics", engagement_metrics)
            .with("sample_comments", sample_comments)
            .with("mentions", mentions)
    })
    .await
}

#[derive(Debug, Deserialize)]
pub struct CreateRecommendationRequest {
    pub campaign_id: Option<i64>,
    pub agent_type: Option<String>,
    pub prompt: Option<String>,
}

/// Generic entry point: any agent, driven by a free-form prompt
pub async fn recommendation_create(
    State(state): State<AppState>,
    Extension(current): Extension<ValidatedUser>,
    origin: Origin,
    JsonBody(body): JsonBody<CreateRecommendationRequest>,
) -> ApiResult<Value> {
    let agent_type = require(
        "agent_type",
        parse_field::<AgentType>("agent_type", body.agent_type.as_deref())?,
    )?;
    let prompt = require_text("prompt", body.prompt)?;

    let call = AgentCall {
        agent_type,
        prompt: Some(prompt.clone()),
        status: RecommendationStatus::Pending,
        message: "Recommendation created successfully",
    };
    run_agent(&state, &current.actor, &origin, body.campaign_id, call, |campaign| {
        campaign_context(GenerationRequest::new(agent_type), campaign).with("prompt", prompt)
    })
    .await
}
