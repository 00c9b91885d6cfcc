use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::{ContentStatus, ContentType};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Content {
    pub id: i64,
    pub campaign_id: i64,
    pub content_type: ContentType,
    pub title: Option<String>,
    pub body: String,
    pub ai_generated: bool,
    pub provenance_metadata: Value,
    pub status: ContentStatus,
    pub created_by: i64,
    pub reviewed_by: Option<i64>,
    pub published_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewContent {
    pub campaign_id: i64,
    pub content_type: ContentType,
    pub title: Option<String>,
    pub body: String,
    pub ai_generated: bool,
    pub provenance_metadata: Value,
    pub status: ContentStatus,
    pub created_by: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ContentTransitionError {
    #[error("Content in status '{0}' cannot be approved")]
    NotApprovable(ContentStatus),

    #[error("Content must be approved before publishing (status: {0})")]
    NotPublishable(ContentStatus),
}

impl Content {
    pub fn approve(&mut self, reviewer_id: i64, now: DateTime<Utc>) -> Result<(), ContentTransitionError> {
        match self.status {
            ContentStatus::Draft | ContentStatus::PendingReview => {
                self.status = ContentStatus::Approved;
                self.reviewed_by = Some(reviewer_id);
                self.updated_at = now;
                Ok(())
            }
            other => Err(ContentTransitionError::NotApprovable(other)),
        }
    }

    pub fn publish(&mut self, now: DateTime<Utc>) -> Result<(), ContentTransitionError> {
        if self.status != ContentStatus::Approved {
            return Err(ContentTransitionError::NotPublishable(self.status));
        }
        self.status = ContentStatus::Published;
        self.published_at = Some(now);
        self.updated_at = now;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn draft() -> Content {
        let now = Utc::now();
        Content {
            id: 1,
            campaign_id: 1,
            content_type: ContentType::Post,
            title: None,
            body: "body".into(),
            ai_generated: false,
            provenance_metadata: json!({}),
            status: ContentStatus::Draft,
            created_by: 1,
            reviewed_by: None,
            published_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn publish_requires_approval() {
        let mut content = draft();
        assert_eq!(
            content.publish(Utc::now()),
            Err(ContentTransitionError::NotPublishable(ContentStatus::Draft))
        );
        content.approve(3, Utc::now()).unwrap();
        content.publish(Utc::now()).unwrap();
        assert_eq!(content.status, ContentStatus::Published);
        assert!(content.published_at.is_some());
        assert_eq!(content.reviewed_by, Some(3));
    }

    #[test]
    fn published_content_cannot_be_reapproved() {
        let mut content = draft();
        content.approve(3, Utc::now()).unwrap();
        assert_eq!(
            content.approve(4, Utc::now()),
            Err(ContentTransitionError::NotApprovable(ContentStatus::Approved))
        );
    }
}
