// Copyright (c) MySocial Team
// SPDX-License-Identifier: Apache-2.0

pub mod aggregator;
pub mod anomaly;
pub mod predictive;
pub mod sentiment;

#[cfg(test)]
pub(crate) mod testing;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::json;
use tracing::{debug, info};

use crate::metrics::METRICS;
use crate::models::{AutomationSettings, Insight, InsightType, Priority};
use crate::random::RandomSource;
use crate::snapshot::Snapshot;

pub use aggregator::PlatformMetrics;
pub use anomaly::{Anomaly, AnomalyKind};
pub use predictive::Prediction;
pub use sentiment::{SentimentLabel, SentimentReport, SentimentTrend};

/// Everything one analytics run derives from a snapshot
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsReport {
    pub generated_at: DateTime<Utc>,
    pub metrics: PlatformMetrics,
    pub sentiment: SentimentReport,
    /// Absent when predictive analytics is switched off
    pub prediction: Option<Prediction>,
    /// Absent when content moderation is switched off
    pub anomalies: Option<Vec<Anomaly>>,
    /// Most urgent first
    pub insights: Vec<Insight>,
}

/// Turns snapshots into metrics, sentiment, forecasts, alerts and insights
pub struct AnalyticsEngine {
    random: Arc<dyn RandomSource>,
}

impl AnalyticsEngine {
    pub fn new(random: Arc<dyn RandomSource>) -> Self {
        Self { random }
    }

    pub fn metrics(&self, snapshot: &Snapshot, now: DateTime<Utc>) -> PlatformMetrics {
        aggregator::aggregate(snapshot, now)
    }

    pub fn sentiment(&self, snapshot: &Snapshot, now: DateTime<Utc>) -> SentimentReport {
        sentiment::analyze_comments(&snapshot.comments, now)
    }

    pub fn predict(&self, snapshot: &Snapshot, now: DateTime<Utc>) -> Prediction {
        predictive::predict(snapshot, now, self.random.as_ref())
    }

    pub fn anomalies(&self, snapshot: &Snapshot, now: DateTime<Utc>) -> Vec<Anomaly> {
        anomaly::detect(snapshot, now)
    }

    pub fn run(
        &self,
        snapshot: &Snapshot,
        settings: &AutomationSettings,
        now: DateTime<Utc>,
    ) -> AnalyticsReport {
        let metrics = self.metrics(snapshot, now);
        let sentiment = self.sentiment(snapshot, now);
        let prediction = settings
            .predictive_analytics
            .then(|| self.predict(snapshot, now));
        let anomalies = settings
            .content_moderation
            .then(|| self.anomalies(snapshot, now));

        let mut insights = Vec::new();
        insights.extend(performance_insight(&metrics, now));
        insights.push(engagement_insight(&metrics, now));
        insights.push(sentiment_insight(&sentiment, now));
        if let Some(prediction) = &prediction {
            insights.push(prediction_insight(prediction, now));
        }
        if let Some(anomalies) = &anomalies {
            insights.extend(anomalies.iter().map(|a| anomaly_insight(a, now)));
        }
        insights.sort_by(|a, b| b.priority.cmp(&a.priority));

        METRICS.analytics_runs.inc();
        info!(
            "Analytics run produced {} insights ({} anomalies)",
            insights.len(),
            anomalies.as_ref().map_or(0, Vec::len)
        );

        AnalyticsReport {
            generated_at: now,
            metrics,
            sentiment,
            prediction,
            anomalies,
            insights,
        }
    }
}

fn performance_insight(metrics: &PlatformMetrics, now: DateTime<Utc>) -> Option<Insight> {
    let top = metrics.ranked_content.first()?;
    debug!("Top content {} scored {:.2}", top.content_id, top.score);

    let priority = if metrics.average_engagement < 0.1 {
        Priority::Medium
    } else {
        Priority::Low
    };
    let leaders: Vec<_> = metrics
        .ranked_content
        .iter()
        .take(5)
        .map(|r| json!({ "contentId": r.content_id, "title": r.title, "score": r.score }))
        .collect();

    Some(Insight::new(
        InsightType::Performance,
        priority,
        "Top performing content",
        format!(
            "\"{}\" ({}) leads with an engagement score of {:.2}; the platform average is {:.2}",
            top.title, top.subject, top.score, metrics.average_engagement
        ),
        json!({ "leaders": leaders, "averageEngagement": metrics.average_engagement }),
        now,
    ))
}

fn engagement_insight(metrics: &PlatformMetrics, now: DateTime<Utc>) -> Insight {
    let priority = if metrics.engagement_rate < 30.0 {
        Priority::High
    } else if metrics.engagement_rate < 60.0 {
        Priority::Medium
    } else {
        Priority::Low
    };

    Insight::new(
        InsightType::Engagement,
        priority,
        "Weekly user engagement",
        format!(
            "{} of {} users were active in the last week ({:.1}%)",
            metrics.active_users, metrics.total_users, metrics.engagement_rate
        ),
        json!({
            "activeUsers": metrics.active_users,
            "totalUsers": metrics.total_users,
            "engagementRate": metrics.engagement_rate,
            "uploadsWeek": metrics.uploads_week,
            "uploadsMonth": metrics.uploads_month,
        }),
        now,
    )
}

fn sentiment_insight(report: &SentimentReport, now: DateTime<Utc>) -> Insight {
    let priority = match (report.trend, report.overall) {
        (SentimentTrend::Declining, _) => Priority::High,
        (_, SentimentLabel::Negative) => Priority::Medium,
        _ => Priority::Low,
    };

    Insight::new(
        InsightType::Sentiment,
        priority,
        "Learner sentiment",
        format!(
            "Overall sentiment is {:?} with {:.0}% positive feedback; recent trend is {:?}",
            report.overall, report.positivity_rate, report.trend
        )
        .to_lowercase(),
        json!({
            "positive": report.breakdown.positive,
            "negative": report.breakdown.negative,
            "neutral": report.breakdown.neutral,
            "recentPositivityRate": report.recent_positivity_rate,
            "analyzed": report.analyzed,
            "usedFallback": report.used_fallback,
        }),
        now,
    )
}

fn prediction_insight(prediction: &Prediction, now: DateTime<Utc>) -> Insight {
    let priority = prediction
        .risks
        .iter()
        .map(|r| match r.probability {
            predictive::RiskLevel::High => Priority::High,
            predictive::RiskLevel::Medium => Priority::Medium,
            predictive::RiskLevel::Low => Priority::Low,
        })
        .max()
        .unwrap_or(Priority::Low);

    let growth = &prediction.user_growth;
    Insight::new(
        InsightType::Prediction,
        priority,
        "Growth forecast",
        format!(
            "Projected {} users next month ({:.1}% monthly growth); highest demand: {}",
            growth.projected_users,
            growth.monthly_rate,
            prediction.top_subject.as_deref().unwrap_or("n/a")
        ),
        json!({
            "projectedUsers": growth.projected_users,
            "monthlyRate": growth.monthly_rate,
            "weeklyRate": growth.weekly_rate,
            "topSubject": prediction.top_subject,
            "peakHour": prediction.peak_hour,
            "recommendations": prediction.recommendations,
        }),
        now,
    )
}

fn anomaly_insight(anomaly: &Anomaly, now: DateTime<Utc>) -> Insight {
    Insight::new(
        InsightType::Anomaly,
        anomaly.severity,
        format!("{:?}", anomaly.kind),
        anomaly.description.clone(),
        json!({
            "kind": anomaly.kind,
            "items": anomaly.items,
            "recommendation": anomaly.recommendation,
        }),
        now,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::testing::{content, user};
    use crate::random::FixedRandom;
    use chrono::Duration;

    fn now() -> DateTime<Utc> {
        "2026-06-15T12:00:00Z".parse().unwrap()
    }

    fn snapshot() -> Snapshot {
        let mut snapshot = Snapshot::empty(now());
        snapshot.users = vec![
            user("t1", true, now() - Duration::days(200)),
            user("s1", false, now() - Duration::hours(1)),
        ];
        snapshot.content = (0..5)
            .map(|i| content(&format!("r{}", i), "Math", 10, 3, 1, now() - Duration::days(1)))
            .collect();
        // mean 6, threshold 18
        snapshot.content[0].reports = 30;
        snapshot
    }

    #[test]
    fn toggles_gate_prediction_and_anomalies() {
        let engine = AnalyticsEngine::new(Arc::new(FixedRandom(0.5)));
        let off = AutomationSettings {
            auto_reply: true,
            smart_matching: true,
            content_moderation: false,
            predictive_analytics: false,
        };

        let report = engine.run(&snapshot(), &off, now());
        assert!(report.prediction.is_none());
        assert!(report.anomalies.is_none());
        assert!(report
            .insights
            .iter()
            .all(|i| !matches!(i.kind, InsightType::Prediction | InsightType::Anomaly)));
    }

    #[test]
    fn insights_are_sorted_by_priority() {
        let engine = AnalyticsEngine::new(Arc::new(FixedRandom(0.5)));
        let report = engine.run(&snapshot(), &AutomationSettings::default(), now());

        let anomalies = report.anomalies.as_ref().unwrap();
        assert!(anomalies.iter().any(|a| a.kind == AnomalyKind::ReportSpike));
        assert!(report.prediction.is_some());
        assert!(report
            .insights
            .windows(2)
            .all(|w| w[0].priority >= w[1].priority));
        assert!(report.sentiment.used_fallback);
    }

    #[test]
    fn empty_snapshot_still_reports() {
        let engine = AnalyticsEngine::new(Arc::new(FixedRandom(0.5)));
        let report = engine.run(&Snapshot::empty(now()), &AutomationSettings::default(), now());
        assert_eq!(report.metrics.total_users, 0);
        assert!(report
            .insights
            .iter()
            .any(|i| i.kind == InsightType::Engagement));
        assert!(report.anomalies.unwrap().is_empty());
    }
}
