use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde_json::Value;
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder, Transaction};
use std::str::FromStr;

use crate::database::manager::DatabaseError;
use crate::database::models::{
    AuditFilter, AuditLogEntry, Campaign, CampaignFilter, Content, Metric, NewAuditEntry,
    NewCampaign, NewContent, NewMetric, NewOrganization, NewRecommendation, NewUser,
    Organization, OrganizationFilter, OrganizationSummary, Recommendation, RecommendationFilter,
    User, UserFilter,
};
use crate::database::repository::{AuditStore, Page, PageRequest, Store, UnitOfWork};
use crate::types::{ContentStatus, RecommendationStatus, UnknownValue};

/// Postgres backend. Each unit of work is one transaction.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// Unique and foreign key violations become domain errors
fn write_error(err: sqlx::Error) -> DatabaseError {
    if let Some(db) = err.as_database_error() {
        if db.is_unique_violation() {
            return DatabaseError::Conflict(db.message().to_string());
        }
        if db.is_foreign_key_violation() {
            return DatabaseError::NotFound(db.message().to_string());
        }
    }
    DatabaseError::Sqlx(err)
}

fn parse<T>(column: &'static str, value: String) -> Result<T, DatabaseError>
where
    T: FromStr<Err = UnknownValue>,
{
    value
        .parse()
        .map_err(|_| DatabaseError::InvalidValue { column, value })
}

fn push_page(qb: &mut QueryBuilder<'_, Postgres>, page: PageRequest) {
    qb.push(" LIMIT ")
        .push_bind(page.limit() as i64)
        .push(" OFFSET ")
        .push_bind(page.offset() as i64);
}

// Row types hold vocabulary columns as text; conversion rejects unknown values.

#[derive(FromRow)]
struct UserRow {
    id: i64,
    email: String,
    password_hash: String,
    full_name: String,
    role: String,
    organization_id: Option<i64>,
    is_active: bool,
    is_verified: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    last_login: Option<DateTime<Utc>>,
}

impl TryFrom<UserRow> for User {
    type Error = DatabaseError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        Ok(User {
            id: row.id,
            email: row.email,
            password_hash: row.password_hash,
            full_name: row.full_name,
            role: parse("role", row.role)?,
            organization_id: row.organization_id,
            is_active: row.is_active,
            is_verified: row.is_verified,
            created_at: row.created_at,
            updated_at: row.updated_at,
            last_login: row.last_login,
        })
    }
}

#[derive(FromRow)]
struct OrganizationRow {
    id: i64,
    name: String,
    #[sqlx(rename = "type")]
    org_type: String,
    registration_number: Option<String>,
    contact_email: Option<String>,
    contact_phone: Option<String>,
    address: Option<String>,
    is_active: bool,
    compliance_status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<OrganizationRow> for Organization {
    type Error = DatabaseError;

    fn try_from(row: OrganizationRow) -> Result<Self, Self::Error> {
        Ok(Organization {
            id: row.id,
            name: row.name,
            org_type: parse("type", row.org_type)?,
            registration_number: row.registration_number,
            contact_email: row.contact_email,
            contact_phone: row.contact_phone,
            address: row.address,
            is_active: row.is_active,
            compliance_status: parse("compliance_status", row.compliance_status)?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(FromRow)]
struct OrganizationSummaryRow {
    #[sqlx(flatten)]
    organization: OrganizationRow,
    user_count: i64,
    campaign_count: i64,
}

impl TryFrom<OrganizationSummaryRow> for OrganizationSummary {
    type Error = DatabaseError;

    fn try_from(row: OrganizationSummaryRow) -> Result<Self, Self::Error> {
        Ok(OrganizationSummary {
            organization: row.organization.try_into()?,
            user_count: row.user_count,
            campaign_count: row.campaign_count,
        })
    }
}

const ORGANIZATION_SUMMARY_SELECT: &str = "SELECT o.*, \
    (SELECT COUNT(*) FROM users u WHERE u.organization_id = o.id) AS user_count, \
    (SELECT COUNT(*) FROM campaigns c WHERE c.organization_id = o.id) AS campaign_count \
    FROM organizations o WHERE TRUE";

#[derive(FromRow)]
struct CampaignRow {
    id: i64,
    name: String,
    description: Option<String>,
    organization_id: i64,
    campaign_type: String,
    status: String,
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
    target_audience: Option<String>,
    objectives: Option<String>,
    created_by: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<CampaignRow> for Campaign {
    type Error = DatabaseError;

    fn try_from(row: CampaignRow) -> Result<Self, Self::Error> {
        Ok(Campaign {
            id: row.id,
            name: row.name,
            description: row.description,
            organization_id: row.organization_id,
            campaign_type: parse("campaign_type", row.campaign_type)?,
            status: parse("status", row.status)?,
            start_date: row.start_date,
            end_date: row.end_date,
            target_audience: row.target_audience,
            objectives: row.objectives,
            created_by: row.created_by,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(FromRow)]
struct RecommendationRow {
    id: i64,
    campaign_id: i64,
    agent_type: String,
    prompt: Option<String>,
    recommendation_data: Value,
    status: String,
    requested_by: i64,
    reviewed_by: Option<i64>,
    review_notes: Option<String>,
    created_at: DateTime<Utc>,
    reviewed_at: Option<DateTime<Utc>>,
}

impl TryFrom<RecommendationRow> for Recommendation {
    type Error = DatabaseError;

    fn try_from(row: RecommendationRow) -> Result<Self, Self::Error> {
        Ok(Recommendation {
            id: row.id,
            campaign_id: row.campaign_id,
            agent_type: parse("agent_type", row.agent_type)?,
            prompt: row.prompt,
            recommendation_data: row.recommendation_data,
            status: parse("status", row.status)?,
            requested_by: row.requested_by,
            reviewed_by: row.reviewed_by,
            review_notes: row.review_notes,
            created_at: row.created_at,
            reviewed_at: row.reviewed_at,
        })
    }
}

#[derive(FromRow)]
struct ContentRow {
    id: i64,
    campaign_id: i64,
    content_type: String,
    title: Option<String>,
    body: String,
    ai_generated: bool,
    provenance_metadata: Value,
    status: String,
    created_by: i64,
    reviewed_by: Option<i64>,
    published_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ContentRow> for Content {
    type Error = DatabaseError;

    fn try_from(row: ContentRow) -> Result<Self, Self::Error> {
        Ok(Content {
            id: row.id,
            campaign_id: row.campaign_id,
            content_type: parse("content_type", row.content_type)?,
            title: row.title,
            body: row.body,
            ai_generated: row.ai_generated,
            provenance_metadata: row.provenance_metadata,
            status: parse("status", row.status)?,
            created_by: row.created_by,
            reviewed_by: row.reviewed_by,
            published_at: row.published_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(FromRow)]
struct MetricRow {
    id: i64,
    campaign_id: i64,
    content_id: Option<i64>,
    metric_type: String,
    metric_value: f64,
    platform: Option<String>,
    recorded_at: DateTime<Utc>,
}

impl TryFrom<MetricRow> for Metric {
    type Error = DatabaseError;

    fn try_from(row: MetricRow) -> Result<Self, Self::Error> {
        Ok(Metric {
            id: row.id,
            campaign_id: row.campaign_id,
            content_id: row.content_id,
            metric_type: parse("metric_type", row.metric_type)?,
            metric_value: row.metric_value,
            platform: row.platform,
            recorded_at: row.recorded_at,
        })
    }
}

#[derive(FromRow)]
struct AuditRow {
    id: i64,
    user_id: Option<i64>,
    action: String,
    resource_type: String,
    resource_id: Option<i64>,
    details: Value,
    ip_address: Option<String>,
    user_agent: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<AuditRow> for AuditLogEntry {
    fn from(row: AuditRow) -> Self {
        AuditLogEntry {
            id: row.id,
            user_id: row.user_id,
            action: row.action,
            resource_type: row.resource_type,
            resource_id: row.resource_id,
            details: row.details,
            ip_address: row.ip_address,
            user_agent: row.user_agent,
            created_at: row.created_at,
        }
    }
}

fn convert_all<R, T>(rows: Vec<R>) -> Result<Vec<T>, DatabaseError>
where
    T: TryFrom<R, Error = DatabaseError>,
{
    rows.into_iter().map(T::try_from).collect()
}

#[async_trait]
impl Store for PgStore {
    async fn begin(&self) -> Result<Box<dyn UnitOfWork>, DatabaseError> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(PgUnitOfWork { tx }))
    }

    async fn health_check(&self) -> Result<(), DatabaseError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl AuditStore for PgStore {
    async fn append(&self, entry: NewAuditEntry) -> Result<AuditLogEntry, DatabaseError> {
        let row = sqlx::query_as::<_, AuditRow>(
            "INSERT INTO audit_logs \
             (user_id, action, resource_type, resource_id, details, ip_address, user_agent, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING *",
        )
        .bind(entry.user_id)
        .bind(entry.action)
        .bind(entry.resource_type)
        .bind(entry.resource_id)
        .bind(entry.details)
        .bind(entry.ip_address)
        .bind(entry.user_agent)
        .bind(entry.created_at)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.into())
    }

    async fn list(&self, filter: &AuditFilter, page: PageRequest) -> Result<Page<AuditLogEntry>, DatabaseError> {
        fn push_filter<'a>(qb: &mut QueryBuilder<'a, Postgres>, filter: &'a AuditFilter) {
            if let Some(org) = filter.organization_id {
                qb.push(" AND user_id IN (SELECT id FROM users WHERE organization_id = ")
                    .push_bind(org)
                    .push(")");
            }
            if let Some(user_id) = filter.user_id {
                qb.push(" AND user_id = ").push_bind(user_id);
            }
            if let Some(action) = &filter.action {
                qb.push(" AND action = ").push_bind(action.as_str());
            }
            if let Some(resource_type) = &filter.resource_type {
                qb.push(" AND resource_type = ").push_bind(resource_type.as_str());
            }
        }

        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM audit_logs WHERE TRUE");
        push_filter(&mut count, filter);
        let total: i64 = count.build_query_scalar().fetch_one(&self.pool).await?;

        let mut select = QueryBuilder::<Postgres>::new("SELECT * FROM audit_logs WHERE TRUE");
        push_filter(&mut select, filter);
        select.push(" ORDER BY created_at DESC, id DESC");
        push_page(&mut select, page);
        let rows = select.build_query_as::<AuditRow>().fetch_all(&self.pool).await?;

        Ok(Page::new(rows.into_iter().map(Into::into).collect(), total, page))
    }
}

pub struct PgUnitOfWork {
    tx: Transaction<'static, Postgres>,
}

fn push_user_filter(qb: &mut QueryBuilder<'_, Postgres>, filter: &UserFilter) {
    if let Some(org) = filter.organization_id {
        qb.push(" AND organization_id = ").push_bind(org);
    }
    if let Some(role) = filter.role {
        qb.push(" AND role = ").push_bind(role.as_str());
    }
    if let Some(active) = filter.is_active {
        qb.push(" AND is_active = ").push_bind(active);
    }
}

fn push_organization_filter(qb: &mut QueryBuilder<'_, Postgres>, filter: &OrganizationFilter) {
    if let Some(id) = filter.id {
        qb.push(" AND o.id = ").push_bind(id);
    }
    if let Some(org_type) = filter.org_type {
        qb.push(" AND o.type = ").push_bind(org_type.as_str());
    }
    if let Some(active) = filter.is_active {
        qb.push(" AND o.is_active = ").push_bind(active);
    }
}

fn push_campaign_filter(qb: &mut QueryBuilder<'_, Postgres>, filter: &CampaignFilter) {
    if let Some(org) = filter.organization_id {
        qb.push(" AND organization_id = ").push_bind(org);
    }
    if let Some(status) = filter.status {
        qb.push(" AND status = ").push_bind(status.as_str());
    }
    if let Some(campaign_type) = filter.campaign_type {
        qb.push(" AND campaign_type = ").push_bind(campaign_type.as_str());
    }
}

fn push_recommendation_filter(qb: &mut QueryBuilder<'_, Postgres>, filter: &RecommendationFilter) {
    if let Some(org) = filter.organization_id {
        qb.push(" AND campaign_id IN (SELECT id FROM campaigns WHERE organization_id = ")
            .push_bind(org)
            .push(")");
    }
    if let Some(campaign_id) = filter.campaign_id {
        qb.push(" AND campaign_id = ").push_bind(campaign_id);
    }
    if let Some(agent_type) = filter.agent_type {
        qb.push(" AND agent_type = ").push_bind(agent_type.as_str());
    }
    if let Some(status) = filter.status {
        qb.push(" AND status = ").push_bind(status.as_str());
    }
}

fn expect_one(rows_affected: u64, what: &str, id: i64) -> Result<(), DatabaseError> {
    if rows_affected == 0 {
        return Err(DatabaseError::NotFound(format!("{} {}", what, id)));
    }
    Ok(())
}

/// A guarded write that matched nothing lost a race with another transaction
fn expect_transition(rows_affected: u64, what: &str, id: i64, from: &str) -> Result<(), DatabaseError> {
    if rows_affected == 0 {
        return Err(DatabaseError::Stale(format!("{} {} is no longer {}", what, id, from)));
    }
    Ok(())
}

#[async_trait]
impl UnitOfWork for PgUnitOfWork {
    async fn user_by_id(&mut self, id: i64) -> Result<Option<User>, DatabaseError> {
        sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *self.tx)
            .await?
            .map(User::try_from)
            .transpose()
    }

    async fn user_by_email(&mut self, email: &str) -> Result<Option<User>, DatabaseError> {
        sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE LOWER(email) = LOWER($1)")
            .bind(email)
            .fetch_optional(&mut *self.tx)
            .await?
            .map(User::try_from)
            .transpose()
    }

    async fn insert_user(&mut self, user: NewUser) -> Result<User, DatabaseError> {
        sqlx::query_as::<_, UserRow>(
            "INSERT INTO users \
             (email, password_hash, full_name, role, organization_id, is_active, is_verified) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING *",
        )
        .bind(user.email)
        .bind(user.password_hash)
        .bind(user.full_name)
        .bind(user.role.as_str())
        .bind(user.organization_id)
        .bind(user.is_active)
        .bind(user.is_verified)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(write_error)?
        .try_into()
    }

    async fn update_user(&mut self, user: &User) -> Result<(), DatabaseError> {
        let result = sqlx::query(
            "UPDATE users SET email = $2, password_hash = $3, full_name = $4, role = $5, \
             organization_id = $6, is_active = $7, is_verified = $8, last_login = $9, updated_at = NOW() \
             WHERE id = $1",
        )
        .bind(user.id)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.full_name)
        .bind(user.role.as_str())
        .bind(user.organization_id)
        .bind(user.is_active)
        .bind(user.is_verified)
        .bind(user.last_login)
        .execute(&mut *self.tx)
        .await
        .map_err(write_error)?;
        expect_one(result.rows_affected(), "user", user.id)
    }

    async fn list_users(&mut self, filter: &UserFilter, page: PageRequest) -> Result<Page<User>, DatabaseError> {
        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM users WHERE TRUE");
        push_user_filter(&mut count, filter);
        let total: i64 = count.build_query_scalar().fetch_one(&mut *self.tx).await?;

        let mut select = QueryBuilder::<Postgres>::new("SELECT * FROM users WHERE TRUE");
        push_user_filter(&mut select, filter);
        select.push(" ORDER BY id");
        push_page(&mut select, page);
        let rows = select.build_query_as::<UserRow>().fetch_all(&mut *self.tx).await?;

        Ok(Page::new(convert_all(rows)?, total, page))
    }

    async fn organization_by_id(&mut self, id: i64) -> Result<Option<Organization>, DatabaseError> {
        sqlx::query_as::<_, OrganizationRow>("SELECT * FROM organizations WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *self.tx)
            .await?
            .map(Organization::try_from)
            .transpose()
    }

    async fn organization_summary(&mut self, id: i64) -> Result<Option<OrganizationSummary>, DatabaseError> {
        let mut select = QueryBuilder::<Postgres>::new(ORGANIZATION_SUMMARY_SELECT);
        select.push(" AND o.id = ").push_bind(id);
        select
            .build_query_as::<OrganizationSummaryRow>()
            .fetch_optional(&mut *self.tx)
            .await?
            .map(OrganizationSummary::try_from)
            .transpose()
    }

    async fn insert_organization(&mut self, organization: NewOrganization) -> Result<Organization, DatabaseError> {
        sqlx::query_as::<_, OrganizationRow>(
            "INSERT INTO organizations \
             (name, type, registration_number, contact_email, contact_phone, address, is_active, compliance_status) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING *",
        )
        .bind(organization.name)
        .bind(organization.org_type.as_str())
        .bind(organization.registration_number)
        .bind(organization.contact_email)
        .bind(organization.contact_phone)
        .bind(organization.address)
        .bind(organization.is_active)
        .bind(organization.compliance_status.as_str())
        .fetch_one(&mut *self.tx)
        .await
        .map_err(write_error)?
        .try_into()
    }

    async fn update_organization(&mut self, organization: &Organization) -> Result<(), DatabaseError> {
        let result = sqlx::query(
            "UPDATE organizations SET name = $2, type = $3, registration_number = $4, contact_email = $5, \
             contact_phone = $6, address = $7, is_active = $8, compliance_status = $9, updated_at = NOW() \
             WHERE id = $1",
        )
        .bind(organization.id)
        .bind(&organization.name)
        .bind(organization.org_type.as_str())
        .bind(&organization.registration_number)
        .bind(&organization.contact_email)
        .bind(&organization.contact_phone)
        .bind(&organization.address)
        .bind(organization.is_active)
        .bind(organization.compliance_status.as_str())
        .execute(&mut *self.tx)
        .await
        .map_err(write_error)?;
        expect_one(result.rows_affected(), "organization", organization.id)
    }

    async fn list_organizations(
        &mut self,
        filter: &OrganizationFilter,
        page: PageRequest,
    ) -> Result<Page<OrganizationSummary>, DatabaseError> {
        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM organizations o WHERE TRUE");
        push_organization_filter(&mut count, filter);
        let total: i64 = count.build_query_scalar().fetch_one(&mut *self.tx).await?;

        let mut select = QueryBuilder::<Postgres>::new(ORGANIZATION_SUMMARY_SELECT);
        push_organization_filter(&mut select, filter);
        select.push(" ORDER BY o.id");
        push_page(&mut select, page);
        let rows = select
            .build_query_as::<OrganizationSummaryRow>()
            .fetch_all(&mut *self.tx)
            .await?;

        Ok(Page::new(convert_all(rows)?, total, page))
    }

    async fn campaign_by_id(&mut self, id: i64) -> Result<Option<Campaign>, DatabaseError> {
        sqlx::query_as::<_, CampaignRow>("SELECT * FROM campaigns WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *self.tx)
            .await?
            .map(Campaign::try_from)
            .transpose()
    }

    async fn insert_campaign(&mut self, campaign: NewCampaign) -> Result<Campaign, DatabaseError> {
        sqlx::query_as::<_, CampaignRow>(
            "INSERT INTO campaigns \
             (name, description, organization_id, campaign_type, status, start_date, end_date, \
              target_audience, objectives, created_by) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) RETURNING *",
        )
        .bind(campaign.name)
        .bind(campaign.description)
        .bind(campaign.organization_id)
        .bind(campaign.campaign_type.as_str())
        .bind(campaign.status.as_str())
        .bind(campaign.start_date)
        .bind(campaign.end_date)
        .bind(campaign.target_audience)
        .bind(campaign.objectives)
        .bind(campaign.created_by)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(write_error)?
        .try_into()
    }

    async fn update_campaign(&mut self, campaign: &Campaign) -> Result<(), DatabaseError> {
        let result = sqlx::query(
            "UPDATE campaigns SET name = $2, description = $3, campaign_type = $4, status = $5, \
             start_date = $6, end_date = $7, target_audience = $8, objectives = $9, updated_at = NOW() \
             WHERE id = $1",
        )
        .bind(campaign.id)
        .bind(&campaign.name)
        .bind(&campaign.description)
        .bind(campaign.campaign_type.as_str())
        .bind(campaign.status.as_str())
        .bind(campaign.start_date)
        .bind(campaign.end_date)
        .bind(&campaign.target_audience)
        .bind(&campaign.objectives)
        .execute(&mut *self.tx)
        .await
        .map_err(write_error)?;
        expect_one(result.rows_affected(), "campaign", campaign.id)
    }

    async fn delete_campaign(&mut self, id: i64) -> Result<(), DatabaseError> {
        let result = sqlx::query("DELETE FROM campaigns WHERE id = $1")
            .bind(id)
            .execute(&mut *self.tx)
            .await?;
        expect_one(result.rows_affected(), "campaign", id)
    }

    async fn list_campaigns(&mut self, filter: &CampaignFilter, page: PageRequest) -> Result<Page<Campaign>, DatabaseError> {
        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM campaigns WHERE TRUE");
        push_campaign_filter(&mut count, filter);
        let total: i64 = count.build_query_scalar().fetch_one(&mut *self.tx).await?;

        let mut select = QueryBuilder::<Postgres>::new("SELECT * FROM campaigns WHERE TRUE");
        push_campaign_filter(&mut select, filter);
        select.push(" ORDER BY created_at DESC, id DESC");
        push_page(&mut select, page);
        let rows = select.build_query_as::<CampaignRow>().fetch_all(&mut *self.tx).await?;

        Ok(Page::new(convert_all(rows)?, total, page))
    }

    async fn recommendation_by_id(&mut self, id: i64) -> Result<Option<Recommendation>, DatabaseError> {
        sqlx::query_as::<_, RecommendationRow>("SELECT * FROM ai_recommendations WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *self.tx)
            .await?
            .map(Recommendation::try_from)
            .transpose()
    }

    async fn recommendation_for_update(&mut self, id: i64) -> Result<Option<Recommendation>, DatabaseError> {
        sqlx::query_as::<_, RecommendationRow>("SELECT * FROM ai_recommendations WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *self.tx)
            .await?
            .map(Recommendation::try_from)
            .transpose()
    }

    async fn insert_recommendation(&mut self, recommendation: NewRecommendation) -> Result<Recommendation, DatabaseError> {
        sqlx::query_as::<_, RecommendationRow>(
            "INSERT INTO ai_recommendations \
             (campaign_id, agent_type, prompt, recommendation_data, status, requested_by) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING *",
        )
        .bind(recommendation.campaign_id)
        .bind(recommendation.agent_type.as_str())
        .bind(recommendation.prompt)
        .bind(recommendation.recommendation_data)
        .bind(recommendation.status.as_str())
        .bind(recommendation.requested_by)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(write_error)?
        .try_into()
    }

    async fn update_recommendation(
        &mut self,
        recommendation: &Recommendation,
        from: RecommendationStatus,
    ) -> Result<(), DatabaseError> {
        let result = sqlx::query(
            "UPDATE ai_recommendations SET status = $2, reviewed_by = $3, review_notes = $4, reviewed_at = $5 \
             WHERE id = $1 AND status = $6",
        )
        .bind(recommendation.id)
        .bind(recommendation.status.as_str())
        .bind(recommendation.reviewed_by)
        .bind(&recommendation.review_notes)
        .bind(recommendation.reviewed_at)
        .bind(from.as_str())
        .execute(&mut *self.tx)
        .await
        .map_err(write_error)?;
        expect_transition(result.rows_affected(), "recommendation", recommendation.id, from.as_str())
    }

    async fn list_recommendations(
        &mut self,
        filter: &RecommendationFilter,
        page: PageRequest,
    ) -> Result<Page<Recommendation>, DatabaseError> {
        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM ai_recommendations WHERE TRUE");
        push_recommendation_filter(&mut count, filter);
        let total: i64 = count.build_query_scalar().fetch_one(&mut *self.tx).await?;

        let mut select = QueryBuilder::<Postgres>::new("SELECT * FROM ai_recommendations WHERE TRUE");
        push_recommendation_filter(&mut select, filter);
        select.push(" ORDER BY created_at DESC, id DESC");
        push_page(&mut select, page);
        let rows = select
            .build_query_as::<RecommendationRow>()
            .fetch_all(&mut *self.tx)
            .await?;

        Ok(Page::new(convert_all(rows)?, total, page))
    }

    async fn content_by_id(&mut self, id: i64) -> Result<Option<Content>, DatabaseError> {
        sqlx::query_as::<_, ContentRow>("SELECT * FROM content WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *self.tx)
            .await?
            .map(Content::try_from)
            .transpose()
    }

    async fn content_for_update(&mut self, id: i64) -> Result<Option<Content>, DatabaseError> {
        sqlx::query_as::<_, ContentRow>("SELECT * FROM content WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *self.tx)
            .await?
            .map(Content::try_from)
            .transpose()
    }

    async fn insert_content(&mut self, content: NewContent) -> Result<Content, DatabaseError> {
        sqlx::query_as::<_, ContentRow>(
            "INSERT INTO content \
             (campaign_id, content_type, title, body, ai_generated, provenance_metadata, status, created_by) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING *",
        )
        .bind(content.campaign_id)
        .bind(content.content_type.as_str())
        .bind(content.title)
        .bind(content.body)
        .bind(content.ai_generated)
        .bind(content.provenance_metadata)
        .bind(content.status.as_str())
        .bind(content.created_by)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(write_error)?
        .try_into()
    }

    async fn update_content(&mut self, content: &Content, from: ContentStatus) -> Result<(), DatabaseError> {
        let result = sqlx::query(
            "UPDATE content SET title = $2, body = $3, status = $4, reviewed_by = $5, published_at = $6, \
             updated_at = NOW() WHERE id = $1 AND status = $7",
        )
        .bind(content.id)
        .bind(&content.title)
        .bind(&content.body)
        .bind(content.status.as_str())
        .bind(content.reviewed_by)
        .bind(content.published_at)
        .bind(from.as_str())
        .execute(&mut *self.tx)
        .await
        .map_err(write_error)?;
        expect_transition(result.rows_affected(), "content", content.id, from.as_str())
    }

    async fn list_content(&mut self, campaign_id: i64, page: PageRequest) -> Result<Page<Content>, DatabaseError> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM content WHERE campaign_id = $1")
            .bind(campaign_id)
            .fetch_one(&mut *self.tx)
            .await?;

        let mut select = QueryBuilder::<Postgres>::new("SELECT * FROM content WHERE campaign_id = ");
        select.push_bind(campaign_id);
        select.push(" ORDER BY created_at DESC, id DESC");
        push_page(&mut select, page);
        let rows = select.build_query_as::<ContentRow>().fetch_all(&mut *self.tx).await?;

        Ok(Page::new(convert_all(rows)?, total, page))
    }

    async fn insert_metric(&mut self, metric: NewMetric) -> Result<Metric, DatabaseError> {
        sqlx::query_as::<_, MetricRow>(
            "INSERT INTO analytics (campaign_id, content_id, metric_type, metric_value, platform) \
             VALUES ($1, $2, $3, $4, $5) RETURNING *",
        )
        .bind(metric.campaign_id)
        .bind(metric.content_id)
        .bind(metric.metric_type.as_str())
        .bind(metric.metric_value)
        .bind(metric.platform)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(write_error)?
        .try_into()
    }

    async fn metrics_for_campaign(&mut self, campaign_id: i64) -> Result<Vec<Metric>, DatabaseError> {
        let rows = sqlx::query_as::<_, MetricRow>(
            "SELECT * FROM analytics WHERE campaign_id = $1 ORDER BY recorded_at, id",
        )
        .bind(campaign_id)
        .fetch_all(&mut *self.tx)
        .await?;
        convert_all(rows)
    }

    async fn commit(self: Box<Self>) -> Result<(), DatabaseError> {
        self.tx.commit().await?;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), DatabaseError> {
        self.tx.rollback().await?;
        Ok(())
    }
}
