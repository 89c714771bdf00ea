// Copyright (c) MySocial Team
// SPDX-License-Identifier: Apache-2.0

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::RoutingError;
use crate::store::DocPath;

pub const QUESTIONS: &str = "questions";

/// Lifecycle state of a support question
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionStatus {
    #[default]
    Pending,
    AiReplied,
    Answered,
    Resolved,
}

/// Something that can happen to a question
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionAction {
    AutoReply,
    Answer,
    Resolve,
    Escalate,
}

impl QuestionStatus {
    /// Next status after `action`, or an error when the lifecycle forbids it.
    ///
    /// `Escalate` keeps the question `Pending`; the caller raises its urgency instead.
    pub fn apply(self, action: QuestionAction) -> Result<QuestionStatus, RoutingError> {
        use QuestionAction::*;
        use QuestionStatus::*;

        match (self, action) {
            (Pending, AutoReply) => Ok(AiReplied),
            (Pending | AiReplied, Answer) => Ok(Answered),
            (AiReplied, Resolve) => Ok(Resolved),
            (Pending | AiReplied, Escalate) => Ok(Pending),
            (from, action) => Err(RoutingError::InvalidTransition { from, action }),
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, QuestionStatus::Answered | QuestionStatus::Resolved)
    }
}

impl fmt::Display for QuestionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            QuestionStatus::Pending => "pending",
            QuestionStatus::AiReplied => "ai_replied",
            QuestionStatus::Answered => "answered",
            QuestionStatus::Resolved => "resolved",
        };
        f.write_str(s)
    }
}

impl fmt::Display for QuestionAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            QuestionAction::AutoReply => "auto-reply to",
            QuestionAction::Answer => "answer",
            QuestionAction::Resolve => "resolve",
            QuestionAction::Escalate => "escalate",
        };
        f.write_str(s)
    }
}

/// A support question submitted by a user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: String,
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub user_name: Option<String>,
    #[serde(rename = "question", default)]
    pub text: String,
    #[serde(default = "default_category")]
    pub category: String,
    #[serde(default)]
    pub status: QuestionStatus,
    #[serde(default)]
    pub urgent: bool,
    #[serde(default)]
    pub ai_response: Option<String>,
    #[serde(default)]
    pub ai_confidence: Option<f64>,
    #[serde(default)]
    pub ai_category: Option<String>,
    #[serde(default)]
    pub requires_human_review: bool,
    #[serde(default)]
    pub admin_response: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

fn default_category() -> String {
    "general".to_string()
}

impl Question {
    pub fn path(&self) -> DocPath {
        DocPath::new(QUESTIONS, &self.id)
    }

    /// Escalated questions wait for an administrator and are never auto-replied again.
    /// Only `escalate` leaves a pending question flagged for human review.
    pub fn is_escalated(&self) -> bool {
        self.status == QuestionStatus::Pending && self.requires_human_review
    }

    pub fn awaits_auto_reply(&self) -> bool {
        self.status == QuestionStatus::Pending && !self.is_escalated()
    }
}
