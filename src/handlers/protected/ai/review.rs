// handlers/protected/ai/review.rs - Recommendation review handlers
//
// PUT /api/ai/recommendations/:id/approve
// PUT /api/ai/recommendations/:id/reject
// PUT /api/ai/recommendations/:id/review

use axum::{extract::State, Extension};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::access::{can_access_campaign, can_review_recommendation, ensure, Actor};
use crate::api::{parse_field, require, JsonBody, ResourceId};
use crate::audit::Origin;
use crate::database::models::recommendation::validate_review_notes;
use crate::database::models::ReviewDecision;
use crate::error::ApiError;
use crate::handlers::protected::utils::{load_campaign, lock_recommendation};
use crate::middleware::{ApiResponse, ApiResult, ValidatedUser};
use crate::state::AppState;
use crate::types::RecommendationStatus;

#[derive(Debug, Default, Deserialize)]
pub struct ReviewRequest {
    pub status: Option<String>,
    pub review_notes: Option<String>,
}

/**
 * Applies one review decision.
 *
 * Order of checks:
 * 1. rejection without notes → 400, whoever the caller is
 * 2. unknown recommendation → 404
 * 3. campaign outside the caller's tenant → 403
 * 4. role not allowed to review → 403
 * 5. already reviewed → 409
 *
 * The row is locked while the decision is made, and the write only lands if
 * the stored status is still the one the decision was made against.
 * The audit entry is written only after the decision is committed.
 */
async fn review(
    state: &AppState,
    actor: &Actor,
    origin: &Origin,
    id: i64,
    decision: ReviewDecision,
    notes: Option<String>,
) -> ApiResult<Value> {
    validate_review_notes(decision, notes.as_deref())?;

    let mut uow = state.store.begin().await?;
    let mut recommendation = lock_recommendation(uow.as_mut(), id).await?;
    let campaign = load_campaign(uow.as_mut(), recommendation.campaign_id).await?;

    ensure(can_access_campaign(actor, &campaign), "Insufficient permissions")?;
    ensure(can_review_recommendation(actor, &campaign), "Insufficient permissions to review")?;

    let from = recommendation.status;
    recommendation.apply_review(actor.id, decision, notes.as_deref(), Utc::now())?;
    uow.update_recommendation(&recommendation, from).await?;
    uow.commit().await?;

    let status = recommendation.status;
    tracing::info!("Recommendation {} {} by user {}", recommendation.id, status, actor.id);
    state
        .audit
        .recommendation_reviewed(actor.id, recommendation.id, status, origin)
        .await;

    Ok(ApiResponse::success(json!({
        "message": format!("Recommendation {} successfully", status),
        "recommendation": recommendation
    })))
}

pub async fn recommendation_approve(
    State(state): State<AppState>,
    Extension(current): Extension<ValidatedUser>,
    origin: Origin,
    ResourceId(id): ResourceId,
    body: Option<JsonBody<ReviewRequest>>,
) -> ApiResult<Value> {
    let notes = body.and_then(|JsonBody(b)| b.review_notes);
    review(&state, &current.actor, &origin, id, ReviewDecision::Approve, notes).await
}

pub async fn recommendation_reject(
    State(state): State<AppState>,
    Extension(current): Extension<ValidatedUser>,
    origin: Origin,
    ResourceId(id): ResourceId,
    body: Option<JsonBody<ReviewRequest>>,
) -> ApiResult<Value> {
    let notes = body.and_then(|JsonBody(b)| b.review_notes);
    review(&state, &current.actor, &origin, id, ReviewDecision::Reject, notes).await
}

/// `status` must be `approved` or `rejected`
pub async fn recommendation_review(
    State(state): State<AppState>,
    Extension(current): Extension<ValidatedUser>,
    origin: Origin,
    ResourceId(id): ResourceId,
    JsonBody(body): JsonBody<ReviewRequest>,
) -> ApiResult<Value> {
    let status = require(
        "status",
        parse_field::<RecommendationStatus>("status", body.status.as_deref())?,
    )?;
    let decision = ReviewDecision::from_status(status).ok_or_else(|| {
        ApiError::field_error("status", "status must be either \"approved\" or \"rejected\"")
    })?;

    review(&state, &current.actor, &origin, id, decision, body.review_notes).await
}
