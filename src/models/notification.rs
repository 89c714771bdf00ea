// Copyright (c) MySocial Team
// SPDX-License-Identifier: Apache-2.0

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::question::Question;
use crate::store::DocPath;

pub const NOTIFICATIONS: &str = "notifications";

pub const QUESTION_ANSWERED: &str = "question_answered";

/// In-app notification delivered to a user's inbox
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: String,
    pub user_id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub title: String,
    pub message: String,
    pub read: bool,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub data: serde_json::Value,
}

impl Notification {
    /// Notification for an automatic reply. The id is derived from the question so a repeated
    /// write replaces the earlier record instead of adding a second one.
    pub fn ai_reply(question: &Question, now: DateTime<Utc>) -> Self {
        Self {
            id: format!("ai-reply-{}", question.id),
            user_id: question.user_id.clone(),
            kind: QUESTION_ANSWERED.to_string(),
            title: "Your question has a reply".to_string(),
            message: "Our assistant replied to your question. Open the help centre to read it."
                .to_string(),
            read: false,
            created_at: now,
            data: json!({ "questionId": question.id, "source": "ai" }),
        }
    }

    pub fn admin_answer(question: &Question, now: DateTime<Utc>) -> Self {
        Self {
            id: format!("admin-answer-{}", question.id),
            user_id: question.user_id.clone(),
            kind: QUESTION_ANSWERED.to_string(),
            title: "An administrator answered your question".to_string(),
            message: "A member of the support team answered your question.".to_string(),
            read: false,
            created_at: now,
            data: json!({ "questionId": question.id, "source": "admin" }),
        }
    }

    pub fn path(&self) -> DocPath {
        DocPath::new(NOTIFICATIONS, &self.id)
    }
}
