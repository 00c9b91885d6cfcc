// handlers/protected/campaigns/analytics.rs - GET/POST /api/campaigns/:id/analytics handlers

use axum::{extract::State, Extension};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::access::{can_access_campaign, ensure, role_required, METRIC_RECORDERS};
use crate::api::{optional_text, parse_field, require, JsonBody, ResourceId};
use crate::database::models::analytics::aggregate;
use crate::database::models::{Metric, NewMetric};
use crate::error::ApiError;
use crate::handlers::protected::utils::{load_campaign, load_content};
use crate::middleware::{ApiResponse, ApiResult, ValidatedUser};
use crate::state::AppState;
use crate::types::MetricType;

/// Totals, average sentiment, per-platform totals and the raw timeline
pub async fn analytics_get(
    State(state): State<AppState>,
    Extension(current): Extension<ValidatedUser>,
    ResourceId(id): ResourceId,
) -> ApiResult<Value> {
    let mut uow = state.store.begin().await?;
    let campaign = load_campaign(uow.as_mut(), id).await?;

    ensure(can_access_campaign(&current.actor, &campaign), "Insufficient permissions")?;

    let metrics = uow.metrics_for_campaign(campaign.id).await?;

    Ok(ApiResponse::success(json!({
        "campaign_id": campaign.id,
        "campaign_name": campaign.name,
        "metrics": aggregate(metrics)
    })))
}

#[derive(Debug, Deserialize)]
pub struct RecordMetricRequest {
    pub metric_type: Option<String>,
    pub metric_value: Option<f64>,
    pub platform: Option<String>,
    pub content_id: Option<i64>,
}

pub async fn analytics_post(
    State(state): State<AppState>,
    Extension(current): Extension<ValidatedUser>,
    ResourceId(id): ResourceId,
    JsonBody(body): JsonBody<RecordMetricRequest>,
) -> ApiResult<Metric> {
    let metric_type = require(
        "metric_type",
        parse_field::<MetricType>("metric_type", body.metric_type.as_deref())?,
    )?;
    let metric_value = require("metric_value", body.metric_value)?;
    if !metric_value.is_finite() {
        return Err(ApiError::field_error("metric_value", "metric_value must be a finite number"));
    }

    let mut uow = state.store.begin().await?;
    let campaign = load_campaign(uow.as_mut(), id).await?;

    ensure(can_access_campaign(&current.actor, &campaign), "Insufficient permissions")?;
    ensure(role_required(METRIC_RECORDERS, &current.actor), "Insufficient permissions to record analytics")?;

    if let Some(content_id) = body.content_id {
        let content = load_content(uow.as_mut(), content_id).await?;
        if content.campaign_id != campaign.id {
            return Err(ApiError::field_error("content_id", "Content does not belong to this campaign"));
        }
    }

    let metric = uow
        .insert_metric(NewMetric {
            campaign_id: campaign.id,
            content_id: body.content_id,
            metric_type,
            metric_value,
            platform: optional_text(body.platform),
        })
        .await?;
    uow.commit().await?;

    tracing::debug!("Recorded {} metric for campaign {}", metric.metric_type, campaign.id);
    Ok(ApiResponse::created(metric))
}
