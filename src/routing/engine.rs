// Copyright (c) MySocial Team
// SPDX-License-Identifier: Apache-2.0

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use serde_json::json;
use tracing::{debug, error, info, warn};

use super::classifier::{draft_reply, DraftReply};
use crate::error::{RoutingError, StoreError};
use crate::metrics::METRICS;
use crate::models::question::QUESTIONS;
use crate::models::{AutomationSettings, Notification, Question, QuestionAction, QuestionStatus};
use crate::random::RandomSource;
use crate::store::{self, DocPath, Direction, DocumentStore, Query};

/// What one auto-reply pass did
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AutoReplySummary {
    /// False when the pass was skipped because auto-reply is switched off
    pub enabled: bool,
    pub replied: Vec<String>,
    /// Questions that were no longer waiting for a reply when re-read
    pub skipped: Vec<String>,
    pub failed: Vec<String>,
}

/// Classifies questions, writes automatic replies and applies administrator actions
pub struct QuestionRouter {
    store: Arc<dyn DocumentStore>,
    random: Arc<dyn RandomSource>,
    /// Toggles in effect until an administrator saves their own
    default_settings: AutomationSettings,
}

impl QuestionRouter {
    pub fn new(store: Arc<dyn DocumentStore>, random: Arc<dyn RandomSource>) -> Self {
        Self {
            store,
            random,
            default_settings: AutomationSettings::default(),
        }
    }

    pub fn with_default_settings(mut self, settings: AutomationSettings) -> Self {
        self.default_settings = settings;
        self
    }

    pub fn draft_reply(&self, question: &Question) -> DraftReply {
        draft_reply(question, self.random.as_ref())
    }

    /// Newest questions first, optionally restricted to one status
    pub async fn list(
        &self,
        status: Option<QuestionStatus>,
        limit: usize,
    ) -> Result<Vec<Question>, StoreError> {
        let mut query = Query::new()
            .order_by("createdAt", Direction::Descending)
            .limit(limit);
        if let Some(status) = status {
            query = query.filter_eq("status", status.to_string());
        }
        store::query(self.store.as_ref(), QUESTIONS, &query).await
    }

    /// Questions still waiting for an automatic reply, oldest first
    pub async fn pending(&self) -> Result<Vec<Question>, StoreError> {
        let query = Query::new()
            .filter_eq("status", QuestionStatus::Pending.to_string())
            .order_by("createdAt", Direction::Ascending);
        let questions: Vec<Question> = store::query(self.store.as_ref(), QUESTIONS, &query).await?;
        Ok(questions
            .into_iter()
            .filter(Question::awaits_auto_reply)
            .collect())
    }

    async fn load(&self, id: &str) -> Result<Question, RoutingError> {
        store::read(self.store.as_ref(), &DocPath::new(QUESTIONS, id))
            .await?
            .ok_or_else(|| RoutingError::NotFound(id.to_string()))
    }

    /// Reply to every question in `questions` that is still waiting.
    ///
    /// Each question is re-read first, so running the pass again over the same list writes
    /// nothing new. A failure on one question is logged and does not stop the others.
    pub async fn auto_reply_pending(
        &self,
        questions: &[Question],
        settings: &AutomationSettings,
    ) -> AutoReplySummary {
        let mut summary = AutoReplySummary {
            enabled: settings.auto_reply,
            ..Default::default()
        };
        if !settings.auto_reply {
            debug!("Auto-reply disabled, skipping {} questions", questions.len());
            return summary;
        }

        for question in questions {
            if !question.awaits_auto_reply() {
                summary.skipped.push(question.id.clone());
                continue;
            }
            match self.auto_reply(&question.id).await {
                Ok(Some(_)) => summary.replied.push(question.id.clone()),
                Ok(None) => summary.skipped.push(question.id.clone()),
                Err(e) => {
                    error!("Auto-reply to question {} failed: {}", question.id, e);
                    summary.failed.push(question.id.clone());
                }
            }
        }

        if !summary.replied.is_empty() {
            info!(
                "Auto-replied to {} questions ({} skipped, {} failed)",
                summary.replied.len(),
                summary.skipped.len(),
                summary.failed.len()
            );
        }
        summary
    }

    /// Reply to one question if it is still waiting; `None` when there was nothing to do
    pub async fn auto_reply(&self, id: &str) -> Result<Option<DraftReply>, RoutingError> {
        let question = match self.load(id).await {
            Ok(question) => question,
            Err(RoutingError::NotFound(_)) => {
                warn!("Question {} disappeared before auto-reply", id);
                return Ok(None);
            }
            Err(e) => return Err(e),
        };
        if !question.awaits_auto_reply() {
            debug!("Question {} is {}, not auto-replying", id, question.status);
            return Ok(None);
        }

        let next = question.status.apply(QuestionAction::AutoReply)?;
        let draft = self.draft_reply(&question);
        let now = Utc::now();

        self.store
            .update(
                &question.path(),
                json!({
                    "status": next.to_string(),
                    "aiResponse": draft.reply,
                    "aiConfidence": draft.confidence,
                    "aiCategory": draft.category,
                    "requiresHumanReview": draft.requires_human_review,
                    "updatedAt": now,
                }),
            )
            .await?;

        let notification = Notification::ai_reply(&question, now);
        store::write(self.store.as_ref(), &notification.path(), &notification).await?;

        METRICS.auto_replies.inc();
        debug!(
            "Question {} auto-replied as {} ({:.2})",
            id, draft.category, draft.confidence
        );
        Ok(Some(draft))
    }

    /// Administrator reply; notifies the author
    pub async fn answer(&self, id: &str, response: &str) -> Result<Question, RoutingError> {
        let response = response.trim();
        if response.is_empty() {
            return Err(RoutingError::EmptyResponse);
        }

        let mut question = self.load(id).await?;
        let next = question.status.apply(QuestionAction::Answer)?;
        let now = Utc::now();

        self.store
            .update(
                &question.path(),
                json!({
                    "status": next.to_string(),
                    "adminResponse": response,
                    "requiresHumanReview": false,
                    "updatedAt": now,
                }),
            )
            .await?;

        question.status = next;
        question.admin_response = Some(response.to_string());
        question.requires_human_review = false;
        question.updated_at = Some(now);

        let notification = Notification::admin_answer(&question, now);
        store::write(self.store.as_ref(), &notification.path(), &notification).await?;

        info!("Question {} answered by an administrator", id);
        Ok(question)
    }

    /// Accept the automatic reply as final
    pub async fn resolve(&self, id: &str) -> Result<Question, RoutingError> {
        let mut question = self.load(id).await?;
        let next = question.status.apply(QuestionAction::Resolve)?;
        let now = Utc::now();

        self.store
            .update(
                &question.path(),
                json!({ "status": next.to_string(), "updatedAt": now }),
            )
            .await?;

        question.status = next;
        question.updated_at = Some(now);
        info!("Question {} resolved", id);
        Ok(question)
    }

    /// Mark urgent and hand back to a human; the question stays pending
    pub async fn escalate(&self, id: &str) -> Result<Question, RoutingError> {
        let mut question = self.load(id).await?;
        let next = question.status.apply(QuestionAction::Escalate)?;
        let now = Utc::now();

        self.store
            .update(
                &question.path(),
                json!({
                    "status": next.to_string(),
                    "urgent": true,
                    "requiresHumanReview": true,
                    "updatedAt": now,
                }),
            )
            .await?;

        question.status = next;
        question.urgent = true;
        question.requires_human_review = true;
        question.updated_at = Some(now);
        warn!("Question {} escalated for human handling", id);
        Ok(question)
    }

    /// Stored automation toggles, or the configured defaults when none were saved yet
    pub async fn load_settings(&self) -> Result<AutomationSettings, StoreError> {
        Ok(
            store::read(self.store.as_ref(), &AutomationSettings::path())
                .await?
                .unwrap_or(self.default_settings),
        )
    }

    pub async fn save_settings(&self, settings: &AutomationSettings) -> Result<(), StoreError> {
        store::write(self.store.as_ref(), &AutomationSettings::path(), settings).await?;
        info!("Automation settings updated: {:?}", settings);
        Ok(())
    }
}
