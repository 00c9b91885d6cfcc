//! Audit trail.
//!
//! Handlers call the recorder only after their unit of work has committed.
//! The recorder writes through [`AuditStore`] on its own connection, so an
//! audit failure can neither roll back nor fail the request that caused it.

use axum::{
    async_trait,
    extract::{ConnectInfo, FromRequestParts},
    http::{request::Parts, HeaderMap},
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;

use crate::database::models::NewAuditEntry;
use crate::database::AuditStore;
use crate::types::{AgentType, RecommendationStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    LoginSuccess,
    LoginFailed,
    Logout,
    UserCreated,
    CampaignCreated,
    RecommendationRequested,
    RecommendationReviewed,
    ContentCreated,
    ContentApproved,
    ContentPublished,
}

impl AuditAction {
    pub const ALL: &'static [AuditAction] = &[
        AuditAction::LoginSuccess,
        AuditAction::LoginFailed,
        AuditAction::Logout,
        AuditAction::UserCreated,
        AuditAction::CampaignCreated,
        AuditAction::RecommendationRequested,
        AuditAction::RecommendationReviewed,
        AuditAction::ContentCreated,
        AuditAction::ContentApproved,
        AuditAction::ContentPublished,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::LoginSuccess => "login_success",
            AuditAction::LoginFailed => "login_failed",
            AuditAction::Logout => "logout",
            AuditAction::UserCreated => "user_created",
            AuditAction::CampaignCreated => "campaign_created",
            AuditAction::RecommendationRequested => "recommendation_requested",
            AuditAction::RecommendationReviewed => "recommendation_reviewed",
            AuditAction::ContentCreated => "content_created",
            AuditAction::ContentApproved => "content_approved",
            AuditAction::ContentPublished => "content_published",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|a| a.as_str() == value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditResource {
    User,
    Organization,
    Campaign,
    Recommendation,
    Content,
}

impl AuditResource {
    pub const ALL: &'static [AuditResource] = &[
        AuditResource::User,
        AuditResource::Organization,
        AuditResource::Campaign,
        AuditResource::Recommendation,
        AuditResource::Content,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AuditResource::User => "user",
            AuditResource::Organization => "organization",
            AuditResource::Campaign => "campaign",
            AuditResource::Recommendation => "recommendation",
            AuditResource::Content => "content",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|r| r.as_str() == value)
    }
}

/// Where a request came from
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Origin {
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

impl Origin {
    pub fn from_headers(headers: &HeaderMap, peer: Option<SocketAddr>) -> Self {
        let forwarded = headers
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty());

        let user_agent = headers
            .get(axum::http::header::USER_AGENT)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        Self {
            ip_address: forwarded.or_else(|| peer.map(|addr| addr.ip().to_string())),
            user_agent,
        }
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for Origin
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let peer = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| *addr);
        Ok(Origin::from_headers(&parts.headers, peer))
    }
}

/// Best-effort audit writer
#[derive(Clone)]
pub struct AuditRecorder {
    store: Arc<dyn AuditStore>,
}

impl AuditRecorder {
    pub fn new(store: Arc<dyn AuditStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn AuditStore> {
        &self.store
    }

    /// Appends one entry. Failures are logged and dropped.
    pub async fn record(
        &self,
        actor_id: Option<i64>,
        action: AuditAction,
        resource_type: AuditResource,
        resource_id: Option<i64>,
        details: Option<Value>,
        origin: Option<&Origin>,
    ) {
        let origin = origin.cloned().unwrap_or_default();
        let entry = NewAuditEntry {
            user_id: actor_id,
            action: action.as_str().to_string(),
            resource_type: resource_type.as_str().to_string(),
            resource_id,
            details: details.unwrap_or_else(|| json!({})),
            ip_address: origin.ip_address,
            user_agent: origin.user_agent,
            created_at: Utc::now(),
        };

        match self.store.append(entry).await {
            Ok(stored) => tracing::debug!(
                "Audit {} recorded for {}:{:?} (entry {})",
                action.as_str(),
                resource_type.as_str(),
                resource_id,
                stored.id
            ),
            Err(e) => tracing::error!(
                "Failed to record audit action {} on {}:{:?} by {:?}: {}",
                action.as_str(),
                resource_type.as_str(),
                resource_id,
                actor_id,
                e
            ),
        }
    }

    pub async fn login_success(&self, user_id: i64, origin: &Origin) {
        self.record(
            Some(user_id),
            AuditAction::LoginSuccess,
            AuditResource::User,
            Some(user_id),
            None,
            Some(origin),
        )
        .await;
    }

    /// `user_id` is None when the email matched no account
    pub async fn login_failed(&self, user_id: Option<i64>, reason: &str, origin: &Origin) {
        self.record(
            user_id,
            AuditAction::LoginFailed,
            AuditResource::User,
            user_id,
            Some(json!({ "reason": reason })),
            Some(origin),
        )
        .await;
    }

    pub async fn logout(&self, user_id: i64, origin: &Origin) {
        self.record(
            Some(user_id),
            AuditAction::Logout,
            AuditResource::User,
            Some(user_id),
            None,
            Some(origin),
        )
        .await;
    }

    pub async fn user_created(&self, creator_id: i64, new_user_id: i64, origin: &Origin) {
        self.record(
            Some(creator_id),
            AuditAction::UserCreated,
            AuditResource::User,
            Some(new_user_id),
            None,
            Some(origin),
        )
        .await;
    }

    pub async fn user_registered(&self, new_user_id: i64, origin: &Origin) {
        self.record(
            Some(new_user_id),
            AuditAction::UserCreated,
            AuditResource::User,
            Some(new_user_id),
            Some(json!({ "self_registered": true })),
            Some(origin),
        )
        .await;
    }

    pub async fn campaign_created(&self, user_id: i64, campaign_id: i64, origin: &Origin) {
        self.record(
            Some(user_id),
            AuditAction::CampaignCreated,
            AuditResource::Campaign,
            Some(campaign_id),
            None,
            Some(origin),
        )
        .await;
    }

    pub async fn recommendation_requested(
        &self,
        user_id: i64,
        recommendation_id: i64,
        agent_type: AgentType,
        origin: &Origin,
    ) {
        self.record(
            Some(user_id),
            AuditAction::RecommendationRequested,
            AuditResource::Recommendation,
            Some(recommendation_id),
            Some(json!({ "agent_type": agent_type })),
            Some(origin),
        )
        .await;
    }

    pub async fn recommendation_reviewed(
        &self,
        user_id: i64,
        recommendation_id: i64,
        status: RecommendationStatus,
        origin: &Origin,
    ) {
        self.record(
            Some(user_id),
            AuditAction::RecommendationReviewed,
            AuditResource::Recommendation,
            Some(recommendation_id),
            Some(json!({ "status": status })),
            Some(origin),
        )
        .await;
    }

    pub async fn content_created(&self, user_id: i64, content_id: i64, ai_generated: bool, origin: &Origin) {
        self.record(
            Some(user_id),
            AuditAction::ContentCreated,
            AuditResource::Content,
            Some(content_id),
            Some(json!({ "ai_generated": ai_generated })),
            Some(origin),
        )
        .await;
    }

    pub async fn content_approved(&self, user_id: i64, content_id: i64, origin: &Origin) {
        self.record(
            Some(user_id),
            AuditAction::ContentApproved,
            AuditResource::Content,
            Some(content_id),
            None,
            Some(origin),
        )
        .await;
    }

    pub async fn content_published(&self, user_id: i64, content_id: i64, origin: &Origin) {
        self.record(
            Some(user_id),
            AuditAction::ContentPublished,
            AuditResource::Content,
            Some(content_id),
            None,
            Some(origin),
        )
        .await;
    }
}
