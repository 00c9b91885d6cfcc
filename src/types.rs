//! Shared vocabularies used across the codebase
//!
//! Every value here is stored and transmitted as a fixed lowercase string.
//! Unknown strings are rejected, never coerced.

use serde::{Deserialize, Serialize};

/// Returned when a string does not belong to one of the closed vocabularies
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unrecognized {kind}: '{value}'")]
pub struct UnknownValue {
    pub kind: &'static str,
    pub value: String,
}

macro_rules! vocabulary {
    (
        $(#[$meta:meta])*
        $name:ident, $kind:literal {
            $($variant:ident => $value:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $value)]
                $variant,
            )+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $value,)+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = UnknownValue;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($value => Ok($name::$variant),)+
                    other => Err(UnknownValue {
                        kind: $kind,
                        value: other.to_string(),
                    }),
                }
            }
        }
    };
}

vocabulary! {
    /// Role hierarchy. Ordering carries no meaning; every check names roles explicitly.
    Role, "role" {
        SuperAdmin => "super_admin",
        OrgAdmin => "org_admin",
        CampaignManager => "campaign_manager",
        ContentCreator => "content_creator",
        Analyst => "analyst",
        Reviewer => "reviewer",
        Viewer => "viewer",
    }
}

vocabulary! {
    OrganizationType, "organization type" {
        Ngo => "ngo",
        Political => "political",
        Government => "government",
        PublicFigure => "public_figure",
    }
}

vocabulary! {
    ComplianceStatus, "compliance status" {
        Pending => "pending",
        Approved => "approved",
        Suspended => "suspended",
    }
}

vocabulary! {
    CampaignType, "campaign type" {
        Political => "political",
        CivicEducation => "civic_education",
        Advocacy => "advocacy",
    }
}

vocabulary! {
    /// Flat status set; any value may follow any other.
    CampaignStatus, "campaign status" {
        Draft => "draft",
        Active => "active",
        Paused => "paused",
        Completed => "completed",
    }
}

vocabulary! {
    AgentType, "agent type" {
        NarrativeArchitect => "narrative_architect",
        ContentSynthesizer => "content_synthesizer",
        DistributionOptimizer => "distribution_optimizer",
        FeedbackIntelligence => "feedback_intelligence",
    }
}

vocabulary! {
    RecommendationStatus, "recommendation status" {
        Pending => "pending",
        Approved => "approved",
        Rejected => "rejected",
        Completed => "completed",
    }
}

vocabulary! {
    ContentType, "content type" {
        Post => "post",
        VideoScript => "video_script",
        Infographic => "infographic",
        Article => "article",
    }
}

vocabulary! {
    ContentStatus, "content status" {
        Draft => "draft",
        PendingReview => "pending_review",
        Approved => "approved",
        Published => "published",
    }
}

vocabulary! {
    MetricType, "metric type" {
        Engagement => "engagement",
        Reach => "reach",
        Sentiment => "sentiment",
        Conversions => "conversions",
    }
}
