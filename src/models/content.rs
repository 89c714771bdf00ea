// Copyright (c) MySocial Team
// SPDX-License-Identifier: Apache-2.0

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::counter;
use crate::store::DocPath;

pub const COMMENTS: &str = "comments";
pub const REPORTS: &str = "reports";

/// Field names of the denormalized counters on a content document
pub mod fields {
    pub const COMMENT_COUNT: &str = "commentCount";
    pub const REPORT_COUNT: &str = "reportCount";
    pub const REPORTS_SEEN: &str = "adminReportsSeenCount";
    pub const COMMENTS_SEEN: &str = "adminCommentsSeenCount";
}

/// Resources and videos share one document shape and live in separate collections
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    #[default]
    Resource,
    Video,
}

impl ContentKind {
    pub const ALL: [ContentKind; 2] = [ContentKind::Resource, ContentKind::Video];

    pub fn collection(&self) -> &'static str {
        match self {
            ContentKind::Resource => "resources",
            ContentKind::Video => "videos",
        }
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContentKind::Resource => write!(f, "resource"),
            ContentKind::Video => write!(f, "video"),
        }
    }
}

impl FromStr for ContentKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "resource" | "resources" => Ok(ContentKind::Resource),
            "video" | "videos" => Ok(ContentKind::Video),
            other => Err(format!("unknown content kind: {}", other)),
        }
    }
}

/// An uploaded resource or video with its engagement counters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentItem {
    pub id: String,
    /// Not stored on the document; derived from the collection it was read from
    #[serde(default, skip_serializing)]
    pub kind: ContentKind,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub subject: String,
    #[serde(default, deserialize_with = "counter")]
    pub views: u64,
    #[serde(default, deserialize_with = "counter")]
    pub likes: u64,
    #[serde(rename = "commentCount", default, deserialize_with = "counter")]
    pub comments: u64,
    #[serde(rename = "reportCount", default, deserialize_with = "counter")]
    pub reports: u64,
    #[serde(default, deserialize_with = "counter")]
    pub admin_reports_seen_count: u64,
    #[serde(default, deserialize_with = "counter")]
    pub admin_comments_seen_count: u64,
    #[serde(default)]
    pub uploaded_by: String,
    pub uploaded_at: DateTime<Utc>,
    #[serde(default)]
    pub storage_path: Option<String>,
}

impl ContentItem {
    pub fn path(&self) -> DocPath {
        DocPath::new(self.kind.collection(), &self.id)
    }

    /// `(likes*2 + comments*3) / max(views, 1)`, finite and non-negative for every item
    pub fn engagement_score(&self) -> f64 {
        let weighted = self
            .likes
            .saturating_mul(2)
            .saturating_add(self.comments.saturating_mul(3));
        weighted as f64 / self.views.max(1) as f64
    }

    /// Raw interaction volume used by the low-engagement rule
    pub fn interaction_score(&self) -> u64 {
        self.views
            .saturating_add(self.likes.saturating_mul(2))
            .saturating_add(self.comments.saturating_mul(3))
    }

    /// Demand signal used for subject forecasting
    pub fn demand_score(&self) -> u64 {
        self.views.saturating_add(self.likes.saturating_mul(2))
    }

    pub fn reports_seen(&self) -> u64 {
        self.admin_reports_seen_count.min(self.reports)
    }

    pub fn comments_seen(&self) -> u64 {
        self.admin_comments_seen_count.min(self.comments)
    }

    pub fn unseen_reports(&self) -> u64 {
        self.reports - self.reports_seen()
    }

    pub fn unseen_comments(&self) -> u64 {
        self.comments - self.comments_seen()
    }

    /// Clamp the seen counters so they never exceed the true counts
    pub fn normalize_seen_counters(&mut self) {
        self.admin_reports_seen_count = self.reports_seen();
        self.admin_comments_seen_count = self.comments_seen();
    }
}

/// A comment attached to a content item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: String,
    /// Parent content id, filled in by the snapshot provider
    #[serde(default, skip_serializing)]
    pub content_id: String,
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub text: String,
    pub created_at: DateTime<Utc>,
}

/// A moderation report filed against a content item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub id: String,
    #[serde(default)]
    pub reporter_id: String,
    #[serde(default)]
    pub reason: String,
    pub created_at: DateTime<Utc>,
}
