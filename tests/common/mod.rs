#![allow(dead_code)]

use std::sync::{Arc, OnceLock};

use anyhow::{Context, Result};
use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use civic_api::auth::hash_password;
use civic_api::database::models::{
    AuditFilter, AuditLogEntry, Campaign, NewAuditEntry, NewCampaign, NewOrganization, NewUser,
};
use civic_api::database::{AuditStore, DatabaseError, MemoryStore, Page, PageRequest, Store, Stores};
use civic_api::services::{DemoGenerator, GenerationError, GenerationRequest, TextGenerator};
use civic_api::types::{CampaignStatus, CampaignType, ComplianceStatus, OrganizationType, Role};
use civic_api::{app, AppState};

pub const PASSWORD: &str = "correct-horse-battery";

/// One hash shared by every seeded user; argon2 is slow in debug builds
fn password_hash() -> &'static str {
    static HASH: OnceLock<String> = OnceLock::new();
    HASH.get_or_init(|| hash_password(PASSWORD).expect("hash test password"))
}

/// Audit backend that refuses every write
pub struct FailingAuditStore;

#[async_trait]
impl AuditStore for FailingAuditStore {
    async fn append(&self, _entry: NewAuditEntry) -> Result<AuditLogEntry, DatabaseError> {
        Err(DatabaseError::QueryError("audit_logs unavailable".to_string()))
    }

    async fn list(&self, _filter: &AuditFilter, _page: PageRequest) -> Result<Page<AuditLogEntry>, DatabaseError> {
        Err(DatabaseError::QueryError("audit_logs unavailable".to_string()))
    }
}

/// Generator whose upstream is always down
pub struct FailingGenerator;

#[async_trait]
impl TextGenerator for FailingGenerator {
    async fn generate(&self, _request: &GenerationRequest) -> Result<Value, GenerationError> {
        Err(GenerationError::Status {
            status: 503,
            body: "model is loading".to_string(),
        })
    }

    fn model_name(&self) -> &str {
        "offline-model"
    }
}

pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryStore>,
}

impl TestApp {
    pub fn new() -> Self {
        Self::build(None, Arc::new(DemoGenerator))
    }

    pub fn with_failing_audit() -> Self {
        Self::build(Some(Arc::new(FailingAuditStore)), Arc::new(DemoGenerator))
    }

    pub fn with_failing_generator() -> Self {
        Self::build(None, Arc::new(FailingGenerator))
    }

    fn build(audit: Option<Arc<dyn AuditStore>>, generator: Arc<dyn TextGenerator>) -> Self {
        let store = Arc::new(MemoryStore::new());
        let audit: Arc<dyn AuditStore> = match audit {
            Some(audit) => audit,
            None => store.clone(),
        };
        let stores = Stores {
            store: store.clone(),
            audit,
        };
        let router = app(AppState::new(stores, generator));
        Self { router, store }
    }

    pub async fn create_organization(&self, name: &str) -> Result<i64> {
        let mut uow = self.store.begin().await?;
        let organization = uow
            .insert_organization(NewOrganization {
                name: name.to_string(),
                org_type: OrganizationType::Ngo,
                registration_number: None,
                contact_email: None,
                contact_phone: None,
                address: None,
                is_active: true,
                compliance_status: ComplianceStatus::Approved,
            })
            .await?;
        uow.commit().await?;
        Ok(organization.id)
    }

    pub async fn create_user(&self, email: &str, role: Role, organization_id: Option<i64>) -> Result<i64> {
        let mut uow = self.store.begin().await?;
        let user = uow
            .insert_user(NewUser {
                email: email.to_string(),
                password_hash: password_hash().to_string(),
                full_name: format!("Test {}", role),
                role,
                organization_id,
                is_active: true,
                is_verified: true,
            })
            .await?;
        uow.commit().await?;
        Ok(user.id)
    }

    pub async fn create_campaign(&self, name: &str, organization_id: i64, created_by: i64) -> Result<Campaign> {
        let mut uow = self.store.begin().await?;
        let campaign = uow
            .insert_campaign(NewCampaign {
                name: name.to_string(),
                description: Some("Get out the vote".to_string()),
                organization_id,
                campaign_type: CampaignType::CivicEducation,
                status: CampaignStatus::Active,
                start_date: None,
                end_date: None,
                target_audience: Some("first-time voters".to_string()),
                objectives: None,
                created_by,
            })
            .await?;
        uow.commit().await?;
        Ok(campaign)
    }

    pub async fn deactivate_user(&self, id: i64) -> Result<()> {
        let mut uow = self.store.begin().await?;
        let mut user = uow.user_by_id(id).await?.context("user exists")?;
        user.is_active = false;
        uow.update_user(&user).await?;
        uow.commit().await?;
        Ok(())
    }

    /// Creates a user and returns (id, access token)
    pub async fn user_with_token(&self, email: &str, role: Role, organization_id: Option<i64>) -> Result<(i64, String)> {
        let id = self.create_user(email, role, organization_id).await?;
        let token = self.login(email).await?;
        Ok((id, token))
    }

    pub async fn login(&self, email: &str) -> Result<String> {
        let (status, body) = self
            .send(Method::POST, "/api/auth/login", None, Some(json!({ "email": email, "password": PASSWORD })))
            .await?;
        anyhow::ensure!(status == StatusCode::OK, "login for {} failed: {} {}", email, status, body);
        body["data"]["access_token"]
            .as_str()
            .map(str::to_string)
            .context("access_token in login response")
    }

    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> Result<(StatusCode, Value)> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))?,
            None => builder.body(Body::empty())?,
        };
        self.dispatch(request).await
    }

    pub async fn dispatch(&self, request: Request<Body>) -> Result<(StatusCode, Value)> {
        let response = self.router.clone().oneshot(request).await?;
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).with_context(|| format!("non-JSON body with status {}", status))?
        };
        Ok((status, value))
    }

    pub async fn get(&self, uri: &str, token: &str) -> Result<(StatusCode, Value)> {
        self.send(Method::GET, uri, Some(token), None).await
    }

    pub async fn post(&self, uri: &str, token: &str, body: Value) -> Result<(StatusCode, Value)> {
        self.send(Method::POST, uri, Some(token), Some(body)).await
    }

    pub async fn put(&self, uri: &str, token: &str, body: Value) -> Result<(StatusCode, Value)> {
        self.send(Method::PUT, uri, Some(token), Some(body)).await
    }

    pub async fn delete(&self, uri: &str, token: &str) -> Result<(StatusCode, Value)> {
        self.send(Method::DELETE, uri, Some(token), None).await
    }

    /// Every stored audit entry, newest first
    pub async fn audit_actions(&self) -> Result<Vec<String>> {
        let page = self
            .store
            .list(&AuditFilter::default(), PageRequest { page: 1, per_page: 1000 })
            .await?;
        Ok(page.items.into_iter().map(|entry| entry.action).collect())
    }
}

pub fn error_code(body: &Value) -> &str {
    body["code"].as_str().unwrap_or_default()
}
