use async_trait::async_trait;
use serde::Serialize;

use crate::config;
use crate::database::manager::DatabaseError;
use crate::database::models::{
    AuditFilter, AuditLogEntry, Campaign, CampaignFilter, Content, Metric, NewAuditEntry,
    NewCampaign, NewContent, NewMetric, NewOrganization, NewRecommendation, NewUser,
    Organization, OrganizationFilter, OrganizationSummary, Recommendation, RecommendationFilter,
    User, UserFilter,
};
use crate::types::{ContentStatus, RecommendationStatus};

/// Requested slice of a listing. Page numbers start at 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub per_page: u32,
}

impl PageRequest {
    /// Applies the configured default and maximum page size
    pub fn new(page: Option<u32>, per_page: Option<u32>) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            per_page: config::config().page_size(per_page),
        }
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.per_page)
    }

    pub fn limit(&self) -> u64 {
        u64::from(self.per_page)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(None, None)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub page: u32,
    pub per_page: u32,
    pub pages: u32,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total: i64, request: PageRequest) -> Self {
        let per_page = i64::from(request.per_page.max(1));
        let pages = ((total.max(0) + per_page - 1) / per_page) as u32;
        Self {
            items,
            total,
            page: request.page,
            per_page: request.per_page,
            pages,
        }
    }

    /// The page returned to actors whose tenant scope is empty
    pub fn empty(request: PageRequest) -> Self {
        Self::new(Vec::new(), 0, request)
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            per_page: self.per_page,
            pages: self.pages,
        }
    }
}

/// Entry point to persistence. Every request works inside one unit of work.
#[async_trait]
pub trait Store: Send + Sync {
    async fn begin(&self) -> Result<Box<dyn UnitOfWork>, DatabaseError>;

    async fn health_check(&self) -> Result<(), DatabaseError>;
}

/// One transaction. Dropping it without `commit` discards every change.
#[async_trait]
pub trait UnitOfWork: Send {
    // Users
    async fn user_by_id(&mut self, id: i64) -> Result<Option<User>, DatabaseError>;
    async fn user_by_email(&mut self, email: &str) -> Result<Option<User>, DatabaseError>;
    async fn insert_user(&mut self, user: NewUser) -> Result<User, DatabaseError>;
    async fn update_user(&mut self, user: &User) -> Result<(), DatabaseError>;
    async fn list_users(&mut self, filter: &UserFilter, page: PageRequest) -> Result<Page<User>, DatabaseError>;

    // Organizations
    async fn organization_by_id(&mut self, id: i64) -> Result<Option<Organization>, DatabaseError>;
    async fn organization_summary(&mut self, id: i64) -> Result<Option<OrganizationSummary>, DatabaseError>;
    async fn insert_organization(&mut self, organization: NewOrganization) -> Result<Organization, DatabaseError>;
    async fn update_organization(&mut self, organization: &Organization) -> Result<(), DatabaseError>;
    async fn list_organizations(
        &mut self,
        filter: &OrganizationFilter,
        page: PageRequest,
    ) -> Result<Page<OrganizationSummary>, DatabaseError>;

    // Campaigns
    async fn campaign_by_id(&mut self, id: i64) -> Result<Option<Campaign>, DatabaseError>;
    async fn insert_campaign(&mut self, campaign: NewCampaign) -> Result<Campaign, DatabaseError>;
    async fn update_campaign(&mut self, campaign: &Campaign) -> Result<(), DatabaseError>;
    /// Removes the campaign together with its recommendations, content and metrics
    async fn delete_campaign(&mut self, id: i64) -> Result<(), DatabaseError>;
    async fn list_campaigns(&mut self, filter: &CampaignFilter, page: PageRequest) -> Result<Page<Campaign>, DatabaseError>;

    // Recommendations
    async fn recommendation_by_id(&mut self, id: i64) -> Result<Option<Recommendation>, DatabaseError>;
    async fn insert_recommendation(&mut self, recommendation: NewRecommendation) -> Result<Recommendation, DatabaseError>;
    /// Like `recommendation_by_id`, but the row stays locked until the unit of work ends
    async fn recommendation_for_update(&mut self, id: i64) -> Result<Option<Recommendation>, DatabaseError>;
    /// Fails with `DatabaseError::Stale` unless the stored status is still `from`
    async fn update_recommendation(
        &mut self,
        recommendation: &Recommendation,
        from: RecommendationStatus,
    ) -> Result<(), DatabaseError>;
    async fn list_recommendations(
        &mut self,
        filter: &RecommendationFilter,
        page: PageRequest,
    ) -> Result<Page<Recommendation>, DatabaseError>;

    // Content
    async fn content_by_id(&mut self, id: i64) -> Result<Option<Content>, DatabaseError>;
    async fn insert_content(&mut self, content: NewContent) -> Result<Content, DatabaseError>;
    async fn content_for_update(&mut self, id: i64) -> Result<Option<Content>, DatabaseError>;
    /// Fails with `DatabaseError::Stale` unless the stored status is still `from`
    async fn update_content(&mut self, content: &Content, from: ContentStatus) -> Result<(), DatabaseError>;
    async fn list_content(&mut self, campaign_id: i64, page: PageRequest) -> Result<Page<Content>, DatabaseError>;

    // Analytics
    async fn insert_metric(&mut self, metric: NewMetric) -> Result<Metric, DatabaseError>;
    /// Oldest first
    async fn metrics_for_campaign(&mut self, campaign_id: i64) -> Result<Vec<Metric>, DatabaseError>;

    async fn commit(self: Box<Self>) -> Result<(), DatabaseError>;
    async fn rollback(self: Box<Self>) -> Result<(), DatabaseError>;
}

/// Append-only audit storage: entries can be added and read, never changed.
#[async_trait]
pub trait AuditStore: Send + Sync {
    async fn append(&self, entry: NewAuditEntry) -> Result<AuditLogEntry, DatabaseError>;

    /// Newest first
    async fn list(&self, filter: &AuditFilter, page: PageRequest) -> Result<Page<AuditLogEntry>, DatabaseError>;
}
