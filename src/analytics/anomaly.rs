// Copyright (c) MySocial Team
// SPDX-License-Identifier: Apache-2.0

//! Rule checks that flag unusual platform activity.
//!
//! Each rule reads the snapshot and returns at most one [`Anomaly`]. Rules share no state, so the
//! result set does not depend on evaluation order.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use super::aggregator::{days, within_window, MONTH_DAYS, WEEK_DAYS};
use crate::models::Priority;
use crate::snapshot::Snapshot;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AnomalyKind {
    ReportSpike,
    InactiveTutors,
    LowEngagement,
    RegistrationSpike,
    UploadSilence,
    SubjectImbalance,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Anomaly {
    #[serde(rename = "type")]
    pub kind: AnomalyKind,
    pub severity: Priority,
    pub description: String,
    /// Ids (or subject names) of the entities involved
    pub items: Vec<String>,
    pub recommendation: String,
}

pub type Rule = fn(&Snapshot, DateTime<Utc>) -> Option<Anomaly>;

pub const RULES: [Rule; 6] = [
    report_spike,
    inactive_tutors,
    low_engagement,
    registration_spike,
    upload_silence,
    subject_imbalance,
];

/// Run every rule; the most severe anomalies come first
pub fn detect(snapshot: &Snapshot, now: DateTime<Utc>) -> Vec<Anomaly> {
    let mut anomalies: Vec<Anomaly> = RULES.iter().filter_map(|rule| rule(snapshot, now)).collect();
    anomalies.sort_by(|a, b| b.severity.cmp(&a.severity));
    anomalies
}

/// Report threshold: three times the mean, but never below five
pub fn report_threshold(snapshot: &Snapshot) -> f64 {
    let total: u64 = snapshot.content.iter().map(|c| c.reports).sum();
    let mean = total as f64 / snapshot.content.len().max(1) as f64;
    (3.0 * mean).max(5.0)
}

pub fn report_spike(snapshot: &Snapshot, _now: DateTime<Utc>) -> Option<Anomaly> {
    let threshold = report_threshold(snapshot);
    let flagged: Vec<_> = snapshot
        .content
        .iter()
        .filter(|c| c.reports as f64 > threshold)
        .collect();
    if flagged.is_empty() {
        return None;
    }

    let severe = flagged.iter().any(|c| c.reports as f64 > threshold * 2.0);
    Some(Anomaly {
        kind: AnomalyKind::ReportSpike,
        severity: if severe { Priority::High } else { Priority::Medium },
        description: format!(
            "{} item(s) received more than {:.1} reports",
            flagged.len(),
            threshold
        ),
        items: flagged.iter().map(|c| c.id.clone()).collect(),
        recommendation: "Review the reported items and remove policy violations".to_string(),
    })
}

pub fn inactive_tutors(snapshot: &Snapshot, now: DateTime<Utc>) -> Option<Anomaly> {
    let month = days(MONTH_DAYS);
    let mut last_upload: HashMap<&str, DateTime<Utc>> = HashMap::new();
    for item in &snapshot.content {
        let entry = last_upload
            .entry(item.uploaded_by.as_str())
            .or_insert(item.uploaded_at);
        if item.uploaded_at > *entry {
            *entry = item.uploaded_at;
        }
    }

    let tutors: Vec<_> = snapshot.tutors().collect();
    let inactive: Vec<String> = tutors
        .iter()
        .filter(|t| {
            last_upload
                .get(t.id.as_str())
                .map_or(true, |ts| now - *ts >= month)
        })
        .map(|t| t.id.clone())
        .collect();

    let share = inactive.len() as f64 / tutors.len().max(1) as f64;
    if share <= 0.3 {
        return None;
    }

    Some(Anomaly {
        kind: AnomalyKind::InactiveTutors,
        severity: if share > 0.6 { Priority::High } else { Priority::Medium },
        description: format!(
            "{} of {} tutors have not uploaded in {} days",
            inactive.len(),
            tutors.len(),
            MONTH_DAYS
        ),
        items: inactive,
        recommendation: "Reach out to inactive tutors with upload reminders".to_string(),
    })
}

pub fn low_engagement(snapshot: &Snapshot, now: DateTime<Utc>) -> Option<Anomaly> {
    let week = days(WEEK_DAYS);
    let low: Vec<String> = snapshot
        .content
        .iter()
        .filter(|c| !within_window(c.uploaded_at, now, week) && c.interaction_score() < 5)
        .map(|c| c.id.clone())
        .collect();

    let share = low.len() as f64 / snapshot.content.len().max(1) as f64;
    if share <= 0.4 {
        return None;
    }

    Some(Anomaly {
        kind: AnomalyKind::LowEngagement,
        severity: Priority::Medium,
        description: format!(
            "{:.0}% of content older than a week has almost no engagement",
            share * 100.0
        ),
        items: low,
        recommendation: "Promote under-performing material or refresh its titles and thumbnails"
            .to_string(),
    })
}

pub fn registration_spike(snapshot: &Snapshot, now: DateTime<Utc>) -> Option<Anomaly> {
    let day = Duration::hours(24);
    let recent: Vec<String> = snapshot
        .users
        .iter()
        .filter(|u| within_window(u.joined_at, now, day))
        .map(|u| u.id.clone())
        .collect();

    let total = snapshot.users.len();
    if recent.len() as f64 <= total as f64 * 0.1 {
        return None;
    }

    Some(Anomaly {
        kind: AnomalyKind::RegistrationSpike,
        severity: Priority::High,
        description: format!(
            "{} of {} accounts were created in the last 24 hours",
            recent.len(),
            total
        ),
        items: recent,
        recommendation: "Check the new accounts for automated or duplicate sign-ups".to_string(),
    })
}

pub fn upload_silence(snapshot: &Snapshot, now: DateTime<Utc>) -> Option<Anomaly> {
    let week = days(WEEK_DAYS);
    let recent = snapshot
        .content
        .iter()
        .filter(|c| within_window(c.uploaded_at, now, week))
        .count();
    if recent > 0 || snapshot.content.len() <= 10 {
        return None;
    }

    Some(Anomaly {
        kind: AnomalyKind::UploadSilence,
        severity: Priority::Medium,
        description: format!("No uploads in the last {} days", WEEK_DAYS),
        items: Vec::new(),
        recommendation: "Check that uploads work and nudge tutors to share new material"
            .to_string(),
    })
}

pub fn subject_imbalance(snapshot: &Snapshot, _now: DateTime<Utc>) -> Option<Anomaly> {
    // Keep first-seen order so equal counts pick a deterministic subject
    let mut counts: Vec<(&str, usize)> = Vec::new();
    for item in &snapshot.content {
        match counts.iter_mut().find(|(s, _)| *s == item.subject) {
            Some((_, n)) => *n += 1,
            None => counts.push((item.subject.as_str(), 1)),
        }
    }
    if counts.len() < 2 {
        return None;
    }

    let (max_subject, max) = counts
        .iter()
        .fold(counts[0], |best, &c| if c.1 > best.1 { c } else { best });
    let (min_subject, min) = counts
        .iter()
        .fold(counts[0], |best, &c| if c.1 < best.1 { c } else { best });
    if max <= min * 5 {
        return None;
    }

    Some(Anomaly {
        kind: AnomalyKind::SubjectImbalance,
        severity: Priority::Low,
        description: format!(
            "{} has {} items while {} has only {}",
            max_subject, max, min_subject, min
        ),
        items: vec![max_subject.to_string(), min_subject.to_string()],
        recommendation: format!("Recruit tutors to create more {} material", min_subject),
    })
}
