use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::{AgentType, RecommendationStatus};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recommendation {
    pub id: i64,
    pub campaign_id: i64,
    pub agent_type: AgentType,
    pub prompt: Option<String>,
    pub recommendation_data: Value,
    pub status: RecommendationStatus,
    pub requested_by: i64,
    pub reviewed_by: Option<i64>,
    pub review_notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub reviewed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub struct NewRecommendation {
    pub campaign_id: i64,
    pub agent_type: AgentType,
    pub prompt: Option<String>,
    pub recommendation_data: Value,
    pub status: RecommendationStatus,
    pub requested_by: i64,
}

#[derive(Debug, Clone, Default)]
pub struct RecommendationFilter {
    /// Tenant pre-filter: only recommendations of this organization's campaigns
    pub organization_id: Option<i64>,
    pub campaign_id: Option<i64>,
    pub agent_type: Option<AgentType>,
    pub status: Option<RecommendationStatus>,
}

impl RecommendationFilter {
    /// Everything except the organization restriction, which needs the owning campaign
    pub fn matches(&self, recommendation: &Recommendation) -> bool {
        self.campaign_id.map_or(true, |id| recommendation.campaign_id == id)
            && self.agent_type.map_or(true, |t| recommendation.agent_type == t)
            && self.status.map_or(true, |s| recommendation.status == s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewDecision {
    Approve,
    Reject,
}

impl ReviewDecision {
    pub fn from_status(status: RecommendationStatus) -> Option<Self> {
        match status {
            RecommendationStatus::Approved => Some(ReviewDecision::Approve),
            RecommendationStatus::Rejected => Some(ReviewDecision::Reject),
            RecommendationStatus::Pending | RecommendationStatus::Completed => None,
        }
    }

    pub fn status(&self) -> RecommendationStatus {
        match self {
            ReviewDecision::Approve => RecommendationStatus::Approved,
            ReviewDecision::Reject => RecommendationStatus::Rejected,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReviewError {
    #[error("review_notes is required for rejection")]
    NotesRequired,

    #[error("Recommendation has already been reviewed (status: {0})")]
    AlreadyReviewed(RecommendationStatus),
}

/// Normalizes review notes and enforces the rejection rule.
///
/// Depends only on the request, so it gives the same answer for every caller.
pub fn validate_review_notes(
    decision: ReviewDecision,
    notes: Option<&str>,
) -> Result<Option<String>, ReviewError> {
    let notes = notes.map(str::trim).filter(|n| !n.is_empty()).map(str::to_string);
    if decision == ReviewDecision::Reject && notes.is_none() {
        return Err(ReviewError::NotesRequired);
    }
    Ok(notes)
}

impl Recommendation {
    /// Only pending recommendations accept a decision; the transition is one-way.
    pub fn is_reviewable(&self) -> bool {
        self.status == RecommendationStatus::Pending && self.reviewed_at.is_none()
    }

    pub fn apply_review(
        &mut self,
        reviewer_id: i64,
        decision: ReviewDecision,
        notes: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<(), ReviewError> {
        let notes = validate_review_notes(decision, notes)?;
        if !self.is_reviewable() {
            return Err(ReviewError::AlreadyReviewed(self.status));
        }

        self.status = decision.status();
        self.reviewed_by = Some(reviewer_id);
        self.reviewed_at = Some(now);
        self.review_notes = notes;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn pending() -> Recommendation {
        Recommendation {
            id: 1,
            campaign_id: 10,
            agent_type: AgentType::NarrativeArchitect,
            prompt: None,
            recommendation_data: json!({"success": true}),
            status: RecommendationStatus::Pending,
            requested_by: 42,
            reviewed_by: None,
            review_notes: None,
            created_at: Utc::now(),
            reviewed_at: None,
        }
    }

    #[test]
    fn reject_requires_notes() {
        let mut rec = pending();
        assert_eq!(
            rec.apply_review(7, ReviewDecision::Reject, Some(""), Utc::now()),
            Err(ReviewError::NotesRequired)
        );
        assert_eq!(
            rec.apply_review(7, ReviewDecision::Reject, Some("   "), Utc::now()),
            Err(ReviewError::NotesRequired)
        );
        assert_eq!(
            rec.apply_review(7, ReviewDecision::Reject, None, Utc::now()),
            Err(ReviewError::NotesRequired)
        );
        assert!(rec.is_reviewable());
    }

    #[test]
    fn approve_without_notes_is_allowed() {
        let mut rec = pending();
        rec.apply_review(7, ReviewDecision::Approve, None, Utc::now()).unwrap();
        assert_eq!(rec.status, RecommendationStatus::Approved);
        assert_eq!(rec.reviewed_by, Some(7));
        assert!(rec.reviewed_at.is_some());
        assert!(rec.review_notes.is_none());
    }

    #[test]
    fn review_is_one_way() {
        let mut rec = pending();
        let first = Utc::now();
        rec.apply_review(7, ReviewDecision::Reject, Some("not aligned"), first).unwrap();
        assert_eq!(rec.status, RecommendationStatus::Rejected);

        let err = rec
            .apply_review(8, ReviewDecision::Approve, None, Utc::now())
            .unwrap_err();
        assert_eq!(err, ReviewError::AlreadyReviewed(RecommendationStatus::Rejected));
        assert_eq!(rec.reviewed_by, Some(7));
        assert_eq!(rec.reviewed_at, Some(first));
        assert_eq!(rec.review_notes.as_deref(), Some("not aligned"));
    }

    #[test]
    fn completed_recommendations_are_not_reviewable() {
        let mut rec = pending();
        rec.status = RecommendationStatus::Completed;
        assert!(!rec.is_reviewable());
    }

    #[test]
    fn decision_from_status() {
        assert_eq!(ReviewDecision::from_status(RecommendationStatus::Rejected), Some(ReviewDecision::Reject));
        assert_eq!(ReviewDecision::from_status(RecommendationStatus::Pending), None);
    }
}
