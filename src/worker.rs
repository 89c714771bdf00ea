// Copyright (c) MySocial Team
// SPDX-License-Identifier: Apache-2.0

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use chrono::Utc;
use tokio::sync::oneshot;
use tracing::{debug, info, warn};

use crate::analytics::{AnalyticsEngine, AnalyticsReport};
use crate::models::question::QUESTIONS;
use crate::models::{Priority, Question, QuestionStatus};
use crate::routing::{AutoReplySummary, QuestionRouter};
use crate::snapshot::{Snapshot, SnapshotFeed, SnapshotProvider};
use crate::store::{self, subscribe_collection, Direction, Document, DocumentStore, Query};

/// Background loop that answers new questions and runs analytics on fresh snapshots
pub struct AdminWorker {
    store: Arc<dyn DocumentStore>,
    router: Arc<QuestionRouter>,
    engine: Arc<AnalyticsEngine>,
    provider: Arc<dyn SnapshotProvider>,
    poll_interval: Duration,
}

impl AdminWorker {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        router: Arc<QuestionRouter>,
        engine: Arc<AnalyticsEngine>,
        provider: Arc<dyn SnapshotProvider>,
        poll_interval: Duration,
    ) -> Self {
        Self {
            store,
            router,
            engine,
            provider,
            poll_interval,
        }
    }

    /// Run until `shutdown` fires
    pub async fn run(self, mut shutdown: oneshot::Receiver<()>) -> Result<()> {
        let pending = Query::new()
            .filter_eq("status", QuestionStatus::Pending.to_string())
            .order_by("createdAt", Direction::Ascending);
        let subscription =
            subscribe_collection(self.store.clone(), QUESTIONS, pending, self.poll_interval);
        let feed = SnapshotFeed::spawn(self.provider.clone(), self.poll_interval);

        let mut questions = subscription.receiver();
        let mut snapshots = feed.receiver();
        info!("Admin worker started, polling every {:?}", self.poll_interval);

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("Admin worker received shutdown signal");
                    break;
                }
                changed = questions.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let docs = questions.borrow_and_update().clone();
                    self.handle_pending(&docs).await;
                }
                changed = snapshots.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let snapshot = snapshots.borrow_and_update().clone();
                    if let Some(snapshot) = snapshot {
                        self.handle_snapshot(&snapshot).await;
                    }
                }
            }
        }

        subscription.stop();
        feed.stop();
        Ok(())
    }

    /// Auto-reply to the pending questions in `docs` when the toggle allows it
    pub async fn handle_pending(&self, docs: &[Document]) -> AutoReplySummary {
        let questions: Vec<Question> = store::decode_valid(QUESTIONS, docs);
        if questions.is_empty() {
            return AutoReplySummary::default();
        }

        let settings = match self.router.load_settings().await {
            Ok(settings) => settings,
            Err(e) => {
                warn!("Could not read automation settings, skipping auto-reply: {}", e);
                return AutoReplySummary::default();
            }
        };
        self.router.auto_reply_pending(&questions, &settings).await
    }

    /// Run analytics over one snapshot and log the alerts an administrator should see
    pub async fn handle_snapshot(&self, snapshot: &Snapshot) -> Option<AnalyticsReport> {
        let settings = match self.router.load_settings().await {
            Ok(settings) => settings,
            Err(e) => {
                warn!("Could not read automation settings, skipping analytics: {}", e);
                return None;
            }
        };

        let report = self.engine.run(snapshot, &settings, Utc::now());
        for anomaly in report.anomalies.iter().flatten() {
            if anomaly.severity == Priority::High {
                warn!("{:?}: {}", anomaly.kind, anomaly.description);
            } else {
                debug!("{:?}: {}", anomaly.kind, anomaly.description);
            }
        }
        Some(report)
    }
}
