//! In-process backend used when no `DATABASE_URL` is configured and by the tests.
//!
//! A unit of work holds the store lock for its whole lifetime and edits a
//! private copy of the state; `commit` swaps the copy in. Units of work are
//! therefore serialized, and a dropped one leaves nothing behind.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};

use crate::database::manager::DatabaseError;
use crate::database::models::{
    AuditFilter, AuditLogEntry, Campaign, CampaignFilter, Content, Metric, NewAuditEntry,
    NewCampaign, NewContent, NewMetric, NewOrganization, NewRecommendation, NewUser,
    Organization, OrganizationFilter, OrganizationSummary, Recommendation, RecommendationFilter,
    User, UserFilter,
};
use crate::database::repository::{AuditStore, Page, PageRequest, Store, UnitOfWork};
use crate::types::{ContentStatus, RecommendationStatus};

#[derive(Debug, Clone, Default)]
struct Sequences {
    user: i64,
    organization: i64,
    campaign: i64,
    recommendation: i64,
    content: i64,
    metric: i64,
}

fn next(counter: &mut i64) -> i64 {
    *counter += 1;
    *counter
}

#[derive(Debug, Clone, Default)]
struct MemoryState {
    users: BTreeMap<i64, User>,
    organizations: BTreeMap<i64, Organization>,
    campaigns: BTreeMap<i64, Campaign>,
    recommendations: BTreeMap<i64, Recommendation>,
    content: BTreeMap<i64, Content>,
    metrics: BTreeMap<i64, Metric>,
    sequences: Sequences,
}

impl MemoryState {
    fn summarize(&self, organization: &Organization) -> OrganizationSummary {
        let user_count = self
            .users
            .values()
            .filter(|u| u.organization_id == Some(organization.id))
            .count() as i64;
        let campaign_count = self
            .campaigns
            .values()
            .filter(|c| c.organization_id == organization.id)
            .count() as i64;
        OrganizationSummary {
            organization: organization.clone(),
            user_count,
            campaign_count,
        }
    }

    fn email_taken(&self, email: &str, except: Option<i64>) -> bool {
        self.users
            .values()
            .any(|u| u.email.eq_ignore_ascii_case(email) && Some(u.id) != except)
    }
}

fn paginate<T>(items: Vec<T>, page: PageRequest) -> Page<T> {
    let total = items.len() as i64;
    let items = items
        .into_iter()
        .skip(page.offset() as usize)
        .take(page.limit() as usize)
        .collect();
    Page::new(items, total, page)
}

#[derive(Default)]
struct AuditLog {
    entries: Vec<AuditLogEntry>,
    next_id: i64,
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<MemoryState>>,
    audit: Arc<RwLock<AuditLog>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn begin(&self) -> Result<Box<dyn UnitOfWork>, DatabaseError> {
        let guard = self.state.clone().lock_owned().await;
        let working = guard.clone();
        Ok(Box::new(MemoryUnitOfWork { guard, working }))
    }

    async fn health_check(&self) -> Result<(), DatabaseError> {
        Ok(())
    }
}

#[async_trait]
impl AuditStore for MemoryStore {
    async fn append(&self, entry: NewAuditEntry) -> Result<AuditLogEntry, DatabaseError> {
        let mut log = self.audit.write().await;
        let id = next(&mut log.next_id);
        let stored = AuditLogEntry {
            id,
            user_id: entry.user_id,
            action: entry.action,
            resource_type: entry.resource_type,
            resource_id: entry.resource_id,
            details: entry.details,
            ip_address: entry.ip_address,
            user_agent: entry.user_agent,
            created_at: entry.created_at,
        };
        log.entries.push(stored.clone());
        Ok(stored)
    }

    async fn list(&self, filter: &AuditFilter, page: PageRequest) -> Result<Page<AuditLogEntry>, DatabaseError> {
        let members: Option<Vec<i64>> = match filter.organization_id {
            Some(org) => {
                let state = self.state.lock().await;
                Some(
                    state
                        .users
                        .values()
                        .filter(|u| u.organization_id == Some(org))
                        .map(|u| u.id)
                        .collect(),
                )
            }
            None => None,
        };

        let log = self.audit.read().await;
        let matching: Vec<AuditLogEntry> = log
            .entries
            .iter()
            .rev()
            .filter(|e| filter.matches(e))
            .filter(|e| match (&members, e.user_id) {
                (None, _) => true,
                (Some(ids), Some(user_id)) => ids.contains(&user_id),
                (Some(_), None) => false,
            })
            .cloned()
            .collect();
        Ok(paginate(matching, page))
    }
}

struct MemoryUnitOfWork {
    guard: OwnedMutexGuard<MemoryState>,
    working: MemoryState,
}

#[async_trait]
impl UnitOfWork for MemoryUnitOfWork {
    async fn user_by_id(&mut self, id: i64) -> Result<Option<User>, DatabaseError> {
        Ok(self.working.users.get(&id).cloned())
    }

    async fn user_by_email(&mut self, email: &str) -> Result<Option<User>, DatabaseError> {
        Ok(self
            .working
            .users
            .values()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn insert_user(&mut self, user: NewUser) -> Result<User, DatabaseError> {
        if self.working.email_taken(&user.email, None) {
            return Err(DatabaseError::Conflict(format!("email '{}' already exists", user.email)));
        }
        let now = Utc::now();
        let id = next(&mut self.working.sequences.user);
        let stored = User {
            id,
            email: user.email,
            password_hash: user.password_hash,
            full_name: user.full_name,
            role: user.role,
            organization_id: user.organization_id,
            is_active: user.is_active,
            is_verified: user.is_verified,
            created_at: now,
            updated_at: now,
            last_login: None,
        };
        self.working.users.insert(id, stored.clone());
        Ok(stored)
    }

    async fn update_user(&mut self, user: &User) -> Result<(), DatabaseError> {
        if !self.working.users.contains_key(&user.id) {
            return Err(DatabaseError::NotFound(format!("user {}", user.id)));
        }
        if self.working.email_taken(&user.email, Some(user.id)) {
            return Err(DatabaseError::Conflict(format!("email '{}' already exists", user.email)));
        }
        self.working.users.insert(user.id, user.clone());
        Ok(())
    }

    async fn list_users(&mut self, filter: &UserFilter, page: PageRequest) -> Result<Page<User>, DatabaseError> {
        let matching = self
            .working
            .users
            .values()
            .filter(|u| filter.matches(u))
            .cloned()
            .collect();
        Ok(paginate(matching, page))
    }

    async fn organization_by_id(&mut self, id: i64) -> Result<Option<Organization>, DatabaseError> {
        Ok(self.working.organizations.get(&id).cloned())
    }

    async fn organization_summary(&mut self, id: i64) -> Result<Option<OrganizationSummary>, DatabaseError> {
        Ok(self
            .working
            .organizations
            .get(&id)
            .map(|o| self.working.summarize(o)))
    }

    async fn insert_organization(&mut self, organization: NewOrganization) -> Result<Organization, DatabaseError> {
        let now = Utc::now();
        let id = next(&mut self.working.sequences.organization);
        let stored = Organization {
            id,
            name: organization.name,
            org_type: organization.org_type,
            registration_number: organization.registration_number,
            contact_email: organization.contact_email,
            contact_phone: organization.contact_phone,
            address: organization.address,
            is_active: organization.is_active,
            compliance_status: organization.compliance_status,
            created_at: now,
            updated_at: now,
        };
        self.working.organizations.insert(id, stored.clone());
        Ok(stored)
    }

    async fn update_organization(&mut self, organization: &Organization) -> Result<(), DatabaseError> {
        match self.working.organizations.get_mut(&organization.id) {
            Some(slot) => {
                *slot = organization.clone();
                Ok(())
            }
            None => Err(DatabaseError::NotFound(format!("organization {}", organization.id))),
        }
    }

    async fn list_organizations(
        &mut self,
        filter: &OrganizationFilter,
        page: PageRequest,
    ) -> Result<Page<OrganizationSummary>, DatabaseError> {
        let matching = self
            .working
            .organizations
            .values()
            .filter(|o| filter.matches(o))
            .map(|o| self.working.summarize(o))
            .collect();
        Ok(paginate(matching, page))
    }

    async fn campaign_by_id(&mut self, id: i64) -> Result<Option<Campaign>, DatabaseError> {
        Ok(self.working.campaigns.get(&id).cloned())
    }

    async fn insert_campaign(&mut self, campaign: NewCampaign) -> Result<Campaign, DatabaseError> {
        if !self.working.organizations.contains_key(&campaign.organization_id) {
            return Err(DatabaseError::NotFound(format!("organization {}", campaign.organization_id)));
        }
        let now = Utc::now();
        let id = next(&mut self.working.sequences.campaign);
        let stored = Campaign {
            id,
            name: campaign.name,
            description: campaign.description,
            organization_id: campaign.organization_id,
            campaign_type: campaign.campaign_type,
            status: campaign.status,
            start_date: campaign.start_date,
            end_date: campaign.end_date,
            target_audience: campaign.target_audience,
            objectives: campaign.objectives,
            created_by: campaign.created_by,
            created_at: now,
            updated_at: now,
        };
        self.working.campaigns.insert(id, stored.clone());
        Ok(stored)
    }

    async fn update_campaign(&mut self, campaign: &Campaign) -> Result<(), DatabaseError> {
        match self.working.campaigns.get_mut(&campaign.id) {
            Some(slot) => {
                *slot = campaign.clone();
                Ok(())
            }
            None => Err(DatabaseError::NotFound(format!("campaign {}", campaign.id))),
        }
    }

    async fn delete_campaign(&mut self, id: i64) -> Result<(), DatabaseError> {
        if self.working.campaigns.remove(&id).is_none() {
            return Err(DatabaseError::NotFound(format!("campaign {}", id)));
        }
        self.working.recommendations.retain(|_, r| r.campaign_id != id);
        self.working.content.retain(|_, c| c.campaign_id != id);
        self.working.metrics.retain(|_, m| m.campaign_id != id);
        Ok(())
    }

    async fn list_campaigns(&mut self, filter: &CampaignFilter, page: PageRequest) -> Result<Page<Campaign>, DatabaseError> {
        let matching = self
            .working
            .campaigns
            .values()
            .rev()
            .filter(|c| filter.matches(c))
            .cloned()
            .collect();
        Ok(paginate(matching, page))
    }

    async fn recommendation_by_id(&mut self, id: i64) -> Result<Option<Recommendation>, DatabaseError> {
        Ok(self.working.recommendations.get(&id).cloned())
    }

    // The store lock already serializes units of work
    async fn recommendation_for_update(&mut self, id: i64) -> Result<Option<Recommendation>, DatabaseError> {
        self.recommendation_by_id(id).await
    }

    async fn insert_recommendation(&mut self, recommendation: NewRecommendation) -> Result<Recommendation, DatabaseError> {
        if !self.working.campaigns.contains_key(&recommendation.campaign_id) {
            return Err(DatabaseError::NotFound(format!("campaign {}", recommendation.campaign_id)));
        }
        let id = next(&mut self.working.sequences.recommendation);
        let stored = Recommendation {
            id,
            campaign_id: recommendation.campaign_id,
            agent_type: recommendation.agent_type,
            prompt: recommendation.prompt,
            recommendation_data: recommendation.recommendation_data,
            status: recommendation.status,
            requested_by: recommendation.requested_by,
            reviewed_by: None,
            review_notes: None,
            created_at: Utc::now(),
            reviewed_at: None,
        };
        self.working.recommendations.insert(id, stored.clone());
        Ok(stored)
    }

    async fn update_recommendation(
        &mut self,
        recommendation: &Recommendation,
        from: RecommendationStatus,
    ) -> Result<(), DatabaseError> {
        match self.working.recommendations.get_mut(&recommendation.id) {
            Some(slot) if slot.status == from => {
                *slot = recommendation.clone();
                Ok(())
            }
            Some(_) => Err(DatabaseError::Stale(format!(
                "recommendation {} is no longer {}",
                recommendation.id, from
            ))),
            None => Err(DatabaseError::NotFound(format!("recommendation {}", recommendation.id))),
        }
    }

    async fn list_recommendations(
        &mut self,
        filter: &RecommendationFilter,
        page: PageRequest,
    ) -> Result<Page<Recommendation>, DatabaseError> {
        let campaigns = &self.working.campaigns;
        let matching = self
            .working
            .recommendations
            .values()
            .rev()
            .filter(|r| filter.matches(r))
            .filter(|r| match filter.organization_id {
                Some(org) => campaigns
                    .get(&r.campaign_id)
                    .map_or(false, |c| c.organization_id == org),
                None => true,
            })
            .cloned()
            .collect();
        Ok(paginate(matching, page))
    }

    async fn content_by_id(&mut self, id: i64) -> Result<Option<Content>, DatabaseError> {
        Ok(self.working.content.get(&id).cloned())
    }

    async fn content_for_update(&mut self, id: i64) -> Result<Option<Content>, DatabaseError> {
        self.content_by_id(id).await
    }

    async fn insert_content(&mut self, content: NewContent) -> Result<Content, DatabaseError> {
        if !self.working.campaigns.contains_key(&content.campaign_id) {
            return Err(DatabaseError::NotFound(format!("campaign {}", content.campaign_id)));
        }
        let now = Utc::now();
        let id = next(&mut self.working.sequences.content);
        let stored = Content {
            id,
            campaign_id: content.campaign_id,
            content_type: content.content_type,
            title: content.title,
            body: content.body,
            ai_generated: content.ai_generated,
            provenance_metadata: content.provenance_metadata,
            status: content.status,
            created_by: content.created_by,
            reviewed_by: None,
            published_at: None,
            created_at: now,
            updated_at: now,
        };
        self.working.content.insert(id, stored.clone());
        Ok(stored)
    }

    async fn update_content(&mut self, content: &Content, from: ContentStatus) -> Result<(), DatabaseError> {
        match self.working.content.get_mut(&content.id) {
            Some(slot) if slot.status == from => {
                *slot = content.clone();
                Ok(())
            }
            Some(_) => Err(DatabaseError::Stale(format!("content {} is no longer {}", content.id, from))),
            None => Err(DatabaseError::NotFound(format!("content {}", content.id))),
        }
    }

    async fn list_content(&mut self, campaign_id: i64, page: PageRequest) -> Result<Page<Content>, DatabaseError> {
        let matching = self
            .working
            .content
            .values()
            .rev()
            .filter(|c| c.campaign_id == campaign_id)
            .cloned()
            .collect();
        Ok(paginate(matching, page))
    }

    async fn insert_metric(&mut self, metric: NewMetric) -> Result<Metric, DatabaseError> {
        if !self.working.campaigns.contains_key(&metric.campaign_id) {
            return Err(DatabaseError::NotFound(format!("campaign {}", metric.campaign_id)));
        }
        let id = next(&mut self.working.sequences.metric);
        let stored = Metric {
            id,
            campaign_id: metric.campaign_id,
            content_id: metric.content_id,
            metric_type: metric.metric_type,
            metric_value: metric.metric_value,
            platform: metric.platform,
            recorded_at: Utc::now(),
        };
        self.working.metrics.insert(id, stored.clone());
        Ok(stored)
    }

    async fn metrics_for_campaign(&mut self, campaign_id: i64) -> Result<Vec<Metric>, DatabaseError> {
        Ok(self
            .working
            .metrics
            .values()
            .filter(|m| m.campaign_id == campaign_id)
            .cloned()
            .collect())
    }

    async fn commit(self: Box<Self>) -> Result<(), DatabaseError> {
        let MemoryUnitOfWork { mut guard, working } = *self;
        *guard = working;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), DatabaseError> {
        Ok(())
    }
}
