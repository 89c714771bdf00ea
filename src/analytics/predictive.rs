// Copyright (c) MySocial Team
// SPDX-License-Identifier: Apache-2.0

use chrono::{DateTime, Timelike, Utc};
use serde::Serialize;

use super::aggregator::{days, percentage, within_window, MONTH_DAYS, WEEK_DAYS};
use crate::random::RandomSource;
use crate::snapshot::Snapshot;

/// Subjects at or above this engagement are forecast to grow
pub const HIGH_DEMAND_ENGAGEMENT: u64 = 50;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GrowthForecast {
    pub total_users: usize,
    pub weekly_rate: f64,
    pub monthly_rate: f64,
    pub projected_users: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectDemand {
    pub subject: String,
    pub content_count: usize,
    /// `views + likes*2` summed over the subject
    pub engagement: u64,
    /// Percentage growth expected next period
    pub forecast_growth: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskAssessment {
    pub category: String,
    pub probability: RiskLevel,
    pub impact: RiskLevel,
    pub mitigation: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Prediction {
    pub user_growth: GrowthForecast,
    /// Subjects in first-seen snapshot order
    pub subject_demand: Vec<SubjectDemand>,
    pub top_subject: Option<String>,
    /// Hour of day (UTC) with the most uploads
    pub peak_hour: Option<u32>,
    pub risks: Vec<RiskAssessment>,
    pub recommendations: Vec<String>,
    pub generated_at: DateTime<Utc>,
}

pub fn forecast_growth(snapshot: &Snapshot, now: DateTime<Utc>) -> GrowthForecast {
    let total = snapshot.users.len();
    let joined_within = |window| {
        snapshot
            .users
            .iter()
            .filter(|u| within_window(u.joined_at, now, window))
            .count()
    };

    let weekly_rate = percentage(joined_within(days(WEEK_DAYS)), total);
    let monthly_rate = percentage(joined_within(days(MONTH_DAYS)), total);

    GrowthForecast {
        total_users: total,
        weekly_rate,
        monthly_rate,
        projected_users: (total as f64 * (1.0 + monthly_rate / 100.0)).round() as u64,
    }
}

/// Per-subject demand in first-seen order. Growth for busy subjects is drawn from `[20, 60)`,
/// for quiet ones from `[-10, 10)`.
pub fn subject_demand(snapshot: &Snapshot, random: &dyn RandomSource) -> Vec<SubjectDemand> {
    let mut subjects: Vec<SubjectDemand> = Vec::new();

    for item in &snapshot.content {
        match subjects.iter_mut().find(|s| s.subject == item.subject) {
            Some(entry) => {
                entry.content_count += 1;
                entry.engagement += item.demand_score();
            }
            None => subjects.push(SubjectDemand {
                subject: item.subject.clone(),
                content_count: 1,
                engagement: item.demand_score(),
                forecast_growth: 0.0,
            }),
        }
    }

    for entry in &mut subjects {
        entry.forecast_growth = if entry.engagement >= HIGH_DEMAND_ENGAGEMENT {
            random.in_range(20.0, 60.0)
        } else {
            random.in_range(-10.0, 10.0)
        };
    }
    subjects
}

/// Highest-engagement subject; the first one seen wins ties
pub fn top_subject(demand: &[SubjectDemand]) -> Option<&SubjectDemand> {
    demand.iter().fold(None, |best: Option<&SubjectDemand>, s| match best {
        Some(b) if b.engagement >= s.engagement => Some(b),
        _ => Some(s),
    })
}

/// Busiest upload hour and its upload count; the lowest hour wins ties
pub fn peak_upload_hour(snapshot: &Snapshot) -> Option<(u32, usize)> {
    let mut counts = [0usize; 24];
    for item in &snapshot.content {
        counts[item.uploaded_at.hour() as usize] += 1;
    }

    let (hour, count) = counts
        .iter()
        .enumerate()
        .fold((0usize, 0usize), |(best_h, best_c), (h, &c)| {
            if c > best_c {
                (h, c)
            } else {
                (best_h, best_c)
            }
        });

    (count > 0).then_some((hour as u32, count))
}

/// Ratio of the busiest subject's per-item demand to the quietest one's
fn supply_imbalance(demand: &[SubjectDemand]) -> f64 {
    let per_item: Vec<f64> = demand
        .iter()
        .map(|s| s.engagement as f64 / s.content_count.max(1) as f64)
        .collect();
    let max = per_item.iter().cloned().fold(0.0, f64::max);
    let min = per_item.iter().cloned().fold(f64::INFINITY, f64::min);
    if per_item.len() < 2 {
        return 1.0;
    }
    max / min.max(1.0)
}

fn tutor_ratio(snapshot: &Snapshot) -> f64 {
    let tutors = snapshot.tutors().count();
    let learners = snapshot.users.iter().filter(|u| u.is_student()).count();
    percentage(tutors, learners)
}

pub fn assess_risks(
    growth: &GrowthForecast,
    demand: &[SubjectDemand],
    tutor_ratio: f64,
) -> Vec<RiskAssessment> {
    let stagnation = if growth.monthly_rate < 5.0 {
        RiskLevel::High
    } else if growth.monthly_rate < 15.0 {
        RiskLevel::Medium
    } else {
        RiskLevel::Low
    };

    let imbalance = supply_imbalance(demand);
    let supply = if imbalance > 5.0 {
        RiskLevel::High
    } else if imbalance > 2.0 {
        RiskLevel::Medium
    } else {
        RiskLevel::Low
    };

    let capacity = if tutor_ratio < 5.0 {
        RiskLevel::High
    } else if tutor_ratio < 10.0 {
        RiskLevel::Medium
    } else {
        RiskLevel::Low
    };

    vec![
        RiskAssessment {
            category: "User growth stagnation".to_string(),
            probability: stagnation,
            impact: RiskLevel::High,
            mitigation: "Run referral and onboarding campaigns for new learners".to_string(),
        },
        RiskAssessment {
            category: "Content supply imbalance".to_string(),
            probability: supply,
            impact: RiskLevel::Medium,
            mitigation: "Commission material for subjects whose demand outpaces supply".to_string(),
        },
        RiskAssessment {
            category: "Tutor capacity shortage".to_string(),
            probability: capacity,
            impact: RiskLevel::High,
            mitigation: "Recruit and verify additional tutors".to_string(),
        },
    ]
}

pub fn recommend(
    growth: &GrowthForecast,
    top: Option<&SubjectDemand>,
    peak: Option<(u32, usize)>,
    tutor_ratio: f64,
) -> Vec<String> {
    let mut recommendations = Vec::new();

    if growth.total_users > 0 && growth.monthly_rate < 10.0 {
        recommendations.push("Launch a referral campaign to lift monthly sign-ups".to_string());
    }
    if let Some(top) = top.filter(|t| t.engagement >= HIGH_DEMAND_ENGAGEMENT) {
        recommendations.push(format!(
            "Prioritise new {} material: it has the highest demand",
            top.subject
        ));
    }
    if growth.total_users > 0 && tutor_ratio < 10.0 {
        recommendations.push("Onboard more tutors to keep up with learner numbers".to_string());
    }
    if let Some((hour, uploads)) = peak.filter(|(_, uploads)| *uploads >= 3) {
        recommendations.push(format!(
            "Schedule live sessions around {:02}:00 UTC, the busiest upload hour ({} uploads)",
            hour, uploads
        ));
    }

    if recommendations.is_empty() {
        recommendations.push("Keep monitoring weekly activity for emerging trends".to_string());
        recommendations.push("Encourage tutors to upload fresh material regularly".to_string());
    }
    recommendations
}

pub fn predict(snapshot: &Snapshot, now: DateTime<Utc>, random: &dyn RandomSource) -> Prediction {
    let user_growth = forecast_growth(snapshot, now);
    let subject_demand = subject_demand(snapshot, random);
    let top = top_subject(&subject_demand);
    let peak = peak_upload_hour(snapshot);
    let ratio = tutor_ratio(snapshot);

    Prediction {
        risks: assess_risks(&user_growth, &subject_demand, ratio),
        recommendations: recommend(&user_growth, top, peak, ratio),
        top_subject: top.map(|s| s.subject.clone()),
        peak_hour: peak.map(|(hour, _)| hour),
        user_growth,
        subject_demand,
        generated_at: now,
    }
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

    #[test]
    fn math_beats_science_on_engagement() {
        let mut snapshot = Snapshot::empty(now());
        snapshot.content = vec![
            content("s1", "Science", 50, 0, 0, now()),
            content("m1", "Math", 60, 20, 0, now()),
        ];

        let demand = subject_demand(&snapshot, &FixedRandom(0.5));
        assert_eq!(demand[0].subject, "Science");
        assert_eq!(demand[0].engagement, 50);
        assert_eq!(demand[1].engagement, 100);
        assert_eq!(top_subject(&demand).unwrap().subject, "Math");
    }

    #[test]
    fn first_seen_subject_wins_ties() {
        let mut snapshot = Snapshot::empty(now());
        snapshot.content = vec![
            content("a", "Physics", 40, 0, 0, now()),
            content("b", "Chemistry", 40, 0, 0, now()),
        ];
        let demand = subject_demand(&snapshot, &FixedRandom(0.0));
        assert_eq!(top_subject(&demand).unwrap().subject, "Physics");
    }

    #[test]
    fn forecast_growth_range_depends_on_engagement() {
        let mut snapshot = Snapshot::empty(now());
        snapshot.content = vec![
            content("a", "Math", 50, 0, 0, now()),
            content("b", "Art", 49, 0, 0, now()),
        ];

        let low = subject_demand(&snapshot, &FixedRandom(0.0));
        assert_eq!(low[0].forecast_growth, 20.0);
        assert_eq!(low[1].forecast_growth, -10.0);

        let high = subject_demand(&snapshot, &FixedRandom(0.999));
        assert!(high[0].forecast_growth < 60.0 && high[0].forecast_growth > 59.0);
        assert!(high[1].forecast_growth < 10.0 && high[1].forecast_growth > 9.0);
    }

    #[test]
    fn growth_rates_and_projection() {
        let mut snapshot = Snapshot::empty(now());
        snapshot.users = vec![
            user("a", false, now() - Duration::days(2)),
            user("b", false, now() - Duration::days(20)),
            user("c", false, now() - Duration::days(100)),
            user("d", true, now() - Duration::days(300)),
        ];

        let growth = forecast_growth(&snapshot, now());
        assert_eq!(growth.weekly_rate, 25.0);
        assert_eq!(growth.monthly_rate, 50.0);
        assert_eq!(growth.projected_users, 6);
    }

    #[test]
    fn peak_hour_prefers_lowest_hour_on_ties() {
        let at = |h: u32| {
            "2026-06-10T00:00:00Z".parse::<DateTime<Utc>>().unwrap() + Duration::hours(h as i64)
        };
        let mut snapshot = Snapshot::empty(now());
        snapshot.content = vec![
            content("a", "Math", 0, 0, 0, at(18)),
            content("b", "Math", 0, 0, 0, at(9)),
            content("c", "Math", 0, 0, 0, at(18)),
            content("d", "Math", 0, 0, 0, at(9)),
        ];
        assert_eq!(peak_upload_hour(&snapshot), Some((9, 2)));
        assert_eq!(peak_upload_hour(&Snapshot::empty(now())), None);
    }

    #[test]
    fn risk_levels_follow_thresholds() {
        let growth = GrowthForecast {
            total_users: 100,
            weekly_rate: 1.0,
            monthly_rate: 3.0,
            projected_users: 103,
        };
        let demand = vec![
            SubjectDemand {
                subject: "Math".into(),
                content_count: 1,
                engagement: 600,
                forecast_growth: 0.0,
            },
            SubjectDemand {
                subject: "Art".into(),
                content_count: 2,
                engagement: 100,
                forecast_growth: 0.0,
            },
        ];

        let risks = assess_risks(&growth, &demand, 7.5);
        assert_eq!(risks.len(), 3);
        assert_eq!(risks[0].probability, RiskLevel::High);
        assert_eq!(risks[1].probability, RiskLevel::High);
        assert_eq!(risks[2].probability, RiskLevel::Medium);
    }

    #[test]
    fn recommendations_are_never_empty() {
        let empty = predict(&Snapshot::empty(now()), now(), &FixedRandom(0.5));
        assert_eq!(empty.recommendations.len(), 2);
        assert_eq!(empty.top_subject, None);
        assert_eq!(empty.risks.len(), 3);
    }

    #[test]
    fn independent_recommendations_can_all_fire() {
        let growth = GrowthForecast {
            total_users: 50,
            weekly_rate: 0.0,
            monthly_rate: 2.0,
            projected_users: 51,
        };
        let top = SubjectDemand {
            subject: "Math".into(),
            content_count: 4,
            engagement: 300,
            forecast_growth: 25.0,
        };
        let recs = recommend(&growth, Some(&top), Some((14, 5)), 4.0);
        assert_eq!(recs.len(), 4);
        assert!(recs[1].contains("Math"));
        assert!(recs[3].contains("14:00"));
    }
}
