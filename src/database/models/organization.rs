use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{ComplianceStatus, OrganizationType};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Organization {
    pub id: i64,
    pub name: String,
    #[serde(rename = "type")]
    pub org_type: OrganizationType,
    pub registration_number: Option<String>,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
    pub address: Option<String>,
    pub is_active: bool,
    pub compliance_status: ComplianceStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Organization as returned by the API, with membership counts
#[derive(Debug, Clone, Serialize)]
pub struct OrganizationSummary {
    #[serde(flatten)]
    pub organization: Organization,
    pub user_count: i64,
    pub campaign_count: i64,
}

#[derive(Debug, Clone)]
pub struct NewOrganization {
    pub name: String,
    pub org_type: OrganizationType,
    pub registration_number: Option<String>,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
    pub address: Option<String>,
    pub is_active: bool,
    pub compliance_status: ComplianceStatus,
}

#[derive(Debug, Clone, Default)]
pub struct OrganizationFilter {
    /// Restricts the listing to a single organization (tenant pre-filter)
    pub id: Option<i64>,
    pub org_type: Option<OrganizationType>,
    pub is_active: Option<bool>,
}

impl OrganizationFilter {
    pub fn matches(&self, organization: &Organization) -> bool {
        self.id.map_or(true, |id| organization.id == id)
            && self.org_type.map_or(true, |t| organization.org_type == t)
            && self.is_active.map_or(true, |active| organization.is_active == active)
    }
}
