// Copyright (c) MySocial Team
// SPDX-License-Identifier: Apache-2.0

use chrono::{DateTime, Utc};

use crate::models::{ContentItem, ContentKind, UserProfile};

pub fn content(
    id: &str,
    subject: &str,
    views: u64,
    likes: u64,
    comments: u64,
    uploaded_at: DateTime<Utc>,
) -> ContentItem {
    ContentItem {
        id: id.to_string(),
        kind: ContentKind::Resource,
        title: format!("{} notes", subject),
        subject: subject.to_string(),
        views,
        likes,
        comments,
        reports: 0,
        admin_reports_seen_count: 0,
        admin_comments_seen_count: 0,
        uploaded_by: "uploader".to_string(),
        uploaded_at,
        storage_path: None,
    }
}

pub fn user(id: &str, is_tutor: bool, joined_at: DateTime<Utc>) -> UserProfile {
    UserProfile {
        id: id.to_string(),
        display_name: None,
        email: None,
        is_tutor,
        is_admin: false,
        joined_at,
        last_active: None,
    }
}
