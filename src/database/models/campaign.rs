use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{CampaignStatus, CampaignType};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Campaign {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub organization_id: i64,
    pub campaign_type: CampaignType,
    pub status: CampaignStatus,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub target_audience: Option<String>,
    pub objectives: Option<String>,
    pub created_by: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewCampaign {
    pub name: String,
    pub description: Option<String>,
    pub organization_id: i64,
    pub campaign_type: CampaignType,
    pub status: CampaignStatus,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub target_audience: Option<String>,
    pub objectives: Option<String>,
    pub created_by: i64,
}

#[derive(Debug, Clone, Default)]
pub struct CampaignFilter {
    pub organization_id: Option<i64>,
    pub status: Option<CampaignStatus>,
    pub campaign_type: Option<CampaignType>,
}

impl CampaignFilter {
    pub fn matches(&self, campaign: &Campaign) -> bool {
        self.organization_id.map_or(true, |org| campaign.organization_id == org)
            && self.status.map_or(true, |s| campaign.status == s)
            && self.campaign_type.map_or(true, |t| campaign.campaign_type == t)
    }
}
