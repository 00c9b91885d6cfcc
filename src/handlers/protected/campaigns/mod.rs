// handlers/protected/campaigns/mod.rs - Campaign handlers
//
// Read access follows the tenant; edit access is narrower (see
// access::can_edit_campaign). Campaign status is a flat enumeration.

pub mod analytics; // GET/POST /api/campaigns/:id/analytics
pub mod create;    // POST /api/campaigns
pub mod delete;    // DELETE /api/campaigns/:id
pub mod list;      // GET /api/campaigns
pub mod show;      // GET /api/campaigns/:id
pub mod update;    // PUT /api/campaigns/:id

pub use analytics::{analytics_get, analytics_post};
pub use create::campaign_create;
pub use delete::campaign_delete;
pub use list::campaign_list;
pub use show::campaign_show;
pub use update::campaign_update;

use chrono::NaiveDate;

use crate::error::ApiError;

/// Accepts `YYYY-MM-DD` or a full RFC 3339 timestamp
pub(crate) fn parse_date(field: &str, value: &str) -> Result<NaiveDate, ApiError> {
    let value = value.trim();
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .or_else(|_| chrono::DateTime::parse_from_rfc3339(value).map(|dt| dt.date_naive()))
        .map_err(|_| ApiError::field_error(field, format!("Invalid {} format", field)))
}

pub(crate) fn check_date_range(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Result<(), ApiError> {
    match (start, end) {
        (Some(start), Some(end)) if end < start => {
            Err(ApiError::field_error("end_date", "end_date must not be before start_date"))
        }
        _ => Ok(()),
    }
}
