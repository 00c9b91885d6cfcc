pub mod analytics;
pub mod audit_log;
pub mod campaign;
pub mod content;
pub mod organization;
pub mod recommendation;
pub mod user;

pub use analytics::{CampaignMetrics, Metric, NewMetric};
pub use audit_log::{AuditFilter, AuditLogEntry, NewAuditEntry};
pub use campaign::{Campaign, CampaignFilter, NewCampaign};
pub use content::{Content, ContentTransitionError, NewContent};
pub use organization::{NewOrganization, Organization, OrganizationFilter, OrganizationSummary};
pub use recommendation::{NewRecommendation, Recommendation, RecommendationFilter, ReviewDecision, ReviewError};
pub use user::{NewUser, User, UserFilter};
