use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::MetricType;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Metric {
    pub id: i64,
    pub campaign_id: i64,
    pub content_id: Option<i64>,
    pub metric_type: MetricType,
    pub metric_value: f64,
    pub platform: Option<String>,
    pub recorded_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewMetric {
    pub campaign_id: i64,
    pub content_id: Option<i64>,
    pub metric_type: MetricType,
    pub metric_value: f64,
    pub platform: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PlatformTotals {
    pub engagement: f64,
    pub reach: f64,
    pub conversions: f64,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct CampaignMetrics {
    pub total_engagement: f64,
    pub total_reach: f64,
    pub average_sentiment: f64,
    pub total_conversions: f64,
    pub by_platform: BTreeMap<String, PlatformTotals>,
    pub timeline: Vec<Metric>,
}

/// Folds raw metric rows into campaign totals.
///
/// Sentiment is averaged over sentiment rows only; it does not contribute
/// to per-platform totals.
pub fn aggregate(metrics: Vec<Metric>) -> CampaignMetrics {
    let mut out = CampaignMetrics::default();
    let mut sentiment_sum = 0.0;
    let mut sentiment_count = 0u32;

    for metric in &metrics {
        match metric.metric_type {
            MetricType::Engagement => out.total_engagement += metric.metric_value,
            MetricType::Reach => out.total_reach += metric.metric_value,
            MetricType::Conversions => out.total_conversions += metric.metric_value,
            MetricType::Sentiment => {
                sentiment_sum += metric.metric_value;
                sentiment_count += 1;
            }
        }

        if let Some(platform) = &metric.platform {
            let totals = out.by_platform.entry(platform.clone()).or_default();
            match metric.metric_type {
                MetricType::Engagement => totals.engagement += metric.metric_value,
                MetricType::Reach => totals.reach += metric.metric_value,
                MetricType::Conversions => totals.conversions += metric.metric_value,
                MetricType::Sentiment => {}
            }
        }
    }

    if sentiment_count > 0 {
        out.average_sentiment = sentiment_sum / f64::from(sentiment_count);
    }
    out.timeline = metrics;
    out
}
