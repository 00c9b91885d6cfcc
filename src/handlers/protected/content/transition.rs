// handlers/protected/content/transition.rs - Content approval and publication
//
// PUT /api/content/:id/approve - reviewers and administrators
// PUT /api/content/:id/publish - administrators only

use axum::{extract::State, Extension};
use chrono::Utc;
use serde_json::{json, Value};

use crate::access::{can_access_campaign, can_approve_content, ensure, role_required, CONTENT_PUBLISHERS};
use crate::api::ResourceId;
use crate::audit::Origin;
use crate::handlers::protected::utils::{load_campaign, lock_content};
use crate::middleware::{ApiResponse, ApiResult, ValidatedUser};
use crate::state::AppState;

pub async fn content_approve(
    State(state): State<AppState>,
    Extension(current): Extension<ValidatedUser>,
    origin: Origin,
    ResourceId(id): ResourceId,
) -> ApiResult<Value> {
    let actor = current.actor;
    let mut uow = state.store.begin().await?;
    let mut content = lock_content(uow.as_mut(), id).await?;
    let campaign = load_campaign(uow.as_mut(), content.campaign_id).await?;

    ensure(can_access_campaign(&actor, &campaign), "Insufficient permissions")?;
    ensure(can_approve_content(&actor), "Insufficient permissions to approve content")?;

    let from = content.status;
    content.approve(actor.id, Utc::now())?;
    uow.update_content(&content, from).await?;
    uow.commit().await?;

    tracing::info!("Content {} approved by user {}", content.id, actor.id);
    state.audit.content_approved(actor.id, content.id, &origin).await;

    Ok(ApiResponse::success(json!({
        "message": "Content approved successfully",
        "content": content
    })))
}

pub async fn content_publish(
    State(state): State<AppState>,
    Extension(current): Extension<ValidatedUser>,
    origin: Origin,
    ResourceId(id): ResourceId,
) -> ApiResult<Value> {
    let actor = current.actor;
    let mut uow = state.store.begin().await?;
    let mut content = lock_content(uow.as_mut(), id).await?;
    let campaign = load_campaign(uow.as_mut(), content.campaign_id).await?;

    ensure(can_access_campaign(&actor, &campaign), "Insufficient permissions")?;
    ensure(role_required(CONTENT_PUBLISHERS, &actor), "Insufficient permissions to publish content")?;

    let from = content.status;
    content.publish(Utc::now())?;
    uow.update_content(&content, from).await?;
    uow.commit().await?;

    tracing::info!("Content {} published by user {}", content.id, actor.id);
    state.audit.content_published(actor.id, content.id, &origin).await;

    Ok(ApiResponse::success(json!({
        "message": "Content published successfully",
        "content": content
    })))
}
