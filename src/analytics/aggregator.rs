// Copyright (c) MySocial Team
// SPDX-License-Identifier: Apache-2.0

use std::collections::HashSet;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::models::{ContentItem, ContentKind};
use crate::snapshot::Snapshot;

pub const WEEK_DAYS: i64 = 7;
pub const MONTH_DAYS: i64 = 30;

/// `true` when `ts` is no older than `window` relative to `now`. The boundary moment counts as
/// inside the window.
pub fn within_window(ts: DateTime<Utc>, now: DateTime<Utc>, window: Duration) -> bool {
    now - ts <= window
}

pub fn days(n: i64) -> Duration {
    Duration::days(n)
}

/// Engagement of one content item
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemEngagement {
    pub content_id: String,
    pub kind: ContentKind,
    pub title: String,
    pub subject: String,
    pub score: f64,
}

/// Platform-wide numbers derived from one snapshot
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformMetrics {
    pub total_users: usize,
    pub total_tutors: usize,
    pub active_users: usize,
    /// Percentage of users active in the last week
    pub engagement_rate: f64,
    pub new_users_week: usize,
    pub new_users_month: usize,
    pub total_content: usize,
    pub uploads_week: usize,
    pub uploads_month: usize,
    pub total_views: u64,
    pub total_likes: u64,
    pub total_comments: u64,
    pub total_reports: u64,
    pub unseen_reports: u64,
    pub average_engagement: f64,
    /// Highest score first; equal scores keep snapshot order
    pub ranked_content: Vec<ItemEngagement>,
}

/// Rank items by engagement score, highest first, keeping snapshot order for ties
pub fn rank_content(items: &[ContentItem]) -> Vec<ItemEngagement> {
    let mut ranked: Vec<ItemEngagement> = items
        .iter()
        .map(|item| ItemEngagement {
            content_id: item.id.clone(),
            kind: item.kind,
            title: item.title.clone(),
            subject: item.subject.clone(),
            score: item.engagement_score(),
        })
        .collect();

    // sort_by is stable
    ranked.sort_by(|a, b| b.score.total_cmp(&a.score));
    ranked
}

/// Users active in the last week: recently seen, or uploaders of recent content
pub fn active_user_ids<'a>(snapshot: &'a Snapshot, now: DateTime<Utc>) -> HashSet<&'a str> {
    let week = days(WEEK_DAYS);

    let recent_uploaders: HashSet<&str> = snapshot
        .content
        .iter()
        .filter(|item| within_window(item.uploaded_at, now, week))
        .map(|item| item.uploaded_by.as_str())
        .collect();

    snapshot
        .users
        .iter()
        .filter(|user| {
            user.last_active
                .map_or(false, |ts| within_window(ts, now, week))
                || recent_uploaders.contains(user.id.as_str())
        })
        .map(|user| user.id.as_str())
        .collect()
}

/// Percentage of `part` in `whole`, zero when `whole` is zero
pub fn percentage(part: usize, whole: usize) -> f64 {
    part as f64 / whole.max(1) as f64 * 100.0
}

pub fn aggregate(snapshot: &Snapshot, now: DateTime<Utc>) -> PlatformMetrics {
    let week = days(WEEK_DAYS);
    let month = days(MONTH_DAYS);

    let total_users = snapshot.users.len();
    let active_users = active_user_ids(snapshot, now).len();

    let ranked_content = rank_content(&snapshot.content);
    let average_engagement = ranked_content.iter().map(|r| r.score).sum::<f64>()
        / ranked_content.len().max(1) as f64;

    PlatformMetrics {
        total_users,
        total_tutors: snapshot.tutors().count(),
        active_users,
        engagement_rate: percentage(active_users, total_users),
        new_users_week: snapshot
            .users
            .iter()
            .filter(|u| within_window(u.joined_at, now, week))
            .count(),
        new_users_month: snapshot
            .users
            .iter()
            .filter(|u| within_window(u.joined_at, now, month))
            .count(),
        total_content: snapshot.content.len(),
        uploads_week: snapshot
            .content
            .iter()
            .filter(|c| within_window(c.uploaded_at, now, week))
            .count(),
        uploads_month: snapshot
            .content
            .iter()
            .filter(|c| within_window(c.uploaded_at, now, month))
            .count(),
        total_views: snapshot.content.iter().map(|c| c.views).sum(),
        total_likes: snapshot.content.iter().map(|c| c.likes).sum(),
        total_comments: snapshot.content.iter().map(|c| c.comments).sum(),
        total_reports: snapshot.content.iter().map(|c| c.reports).sum(),
        unseen_reports: snapshot.content.iter().map(|c| c.unseen_reports()).sum(),
        average_engagement,
        ranked_content,
    }
}
