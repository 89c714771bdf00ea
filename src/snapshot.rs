// Copyright (c) MySocial Team
// SPDX-License-Identifier: Apache-2.0

//! Immutable point-in-time views of the platform collections.
//!
//! Analytics never hold a live reference to store-owned data: every run receives one
//! [`Snapshot`] value and works on it alone, even while the [`SnapshotFeed`] publishes newer ones.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::future::try_join_all;
use serde::Serialize;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, error, info};

use crate::config::SnapshotConfig;
use crate::error::StoreError;
use crate::models::content::COMMENTS;
use crate::models::question::QUESTIONS;
use crate::models::user::USERS;
use crate::models::{Comment, ContentItem, ContentKind, Question, UserProfile};
use crate::store::{self, Direction, DocumentStore, Query};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub taken_at: DateTime<Utc>,
    pub users: Vec<UserProfile>,
    /// Newest uploads first
    pub content: Vec<ContentItem>,
    /// Sampled comments of the newest content items
    pub comments: Vec<Comment>,
    pub questions: Vec<Question>,
}

impl Snapshot {
    pub fn empty(taken_at: DateTime<Utc>) -> Self {
        Self {
            taken_at,
            users: Vec::new(),
            content: Vec::new(),
            comments: Vec::new(),
            questions: Vec::new(),
        }
    }

    pub fn tutors(&self) -> impl Iterator<Item = &UserProfile> {
        self.users.iter().filter(|u| u.is_tutor)
    }
}

/// Supplier of snapshots
#[async_trait]
pub trait SnapshotProvider: Send + Sync {
    async fn snapshot(&self) -> Result<Snapshot, StoreError>;
}

/// Builds snapshots by reading the document store
pub struct StoreSnapshotProvider {
    store: Arc<dyn DocumentStore>,
    config: SnapshotConfig,
}

impl StoreSnapshotProvider {
    pub fn new(store: Arc<dyn DocumentStore>, config: SnapshotConfig) -> Self {
        Self { store, config }
    }

    async fn load_content(&self) -> Result<Vec<ContentItem>, StoreError> {
        let newest_first = Query::new()
            .order_by("uploadedAt", Direction::Descending)
            .limit(self.config.content_limit);

        let mut content = Vec::new();
        for kind in ContentKind::ALL {
            let items: Vec<ContentItem> =
                store::query_valid(self.store.as_ref(), kind.collection(), &newest_first).await?;
            content.extend(items.into_iter().map(|mut item| {
                item.kind = kind;
                item.normalize_seen_counters();
                item
            }));
        }

        content.sort_by(|a, b| b.uploaded_at.cmp(&a.uploaded_at));
        content.truncate(self.config.content_limit);
        Ok(content)
    }

    /// Comments of the first `sentiment_content_sample` items, at most
    /// `sentiment_comments_per_item` each. The caps bound the cost of a run.
    async fn sample_comments(&self, content: &[ContentItem]) -> Result<Vec<Comment>, StoreError> {
        let per_item = Query::new()
            .order_by("createdAt", Direction::Descending)
            .limit(self.config.sentiment_comments_per_item);

        let reads = content
            .iter()
            .take(self.config.sentiment_content_sample)
            .map(|item| {
                let collection = item.path().child_collection(COMMENTS);
                let per_item = &per_item;
                async move {
                    let comments: Vec<Comment> =
                        store::query_valid(self.store.as_ref(), &collection, per_item).await?;
                    Ok::<_, StoreError>(
                        comments
                            .into_iter()
                            .map(|mut c| {
                                c.content_id = item.id.clone();
                                c
                            })
                            .collect::<Vec<_>>(),
                    )
                }
            });

        Ok(try_join_all(reads).await?.into_iter().flatten().collect())
    }
}

#[async_trait]
impl SnapshotProvider for StoreSnapshotProvider {
    async fn snapshot(&self) -> Result<Snapshot, StoreError> {
        let taken_at = Utc::now();

        let users: Vec<UserProfile> = store::query_valid(
            self.store.as_ref(),
            USERS,
            &Query::new().order_by("createdAt", Direction::Descending),
        )
        .await?;

        let content = self.load_content().await?;
        let comments = self.sample_comments(&content).await?;

        let questions: Vec<Question> = store::query_valid(
            self.store.as_ref(),
            QUESTIONS,
            &Query::new()
                .order_by("createdAt", Direction::Descending)
                .limit(self.config.question_limit),
        )
        .await?;

        debug!(
            "Snapshot taken: {} users, {} content items, {} comments, {} questions",
            users.len(),
            content.len(),
            comments.len(),
            questions.len()
        );

        Ok(Snapshot {
            taken_at,
            users,
            content,
            comments,
            questions,
        })
    }
}

/// Periodically refreshed snapshot published over a watch channel
pub struct SnapshotFeed {
    receiver: watch::Receiver<Option<Arc<Snapshot>>>,
    handle: JoinHandle<()>,
}

impl SnapshotFeed {
    /// Start polling `provider`. A failed read keeps the previous snapshot and is logged.
    pub fn spawn(provider: Arc<dyn SnapshotProvider>, poll_interval: Duration) -> Self {
        let (tx, rx) = watch::channel(None);

        let handle = tokio::spawn(async move {
            let mut ticker = interval(poll_interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;
                if tx.is_closed() {
                    info!("Snapshot feed has no subscribers left, stopping");
                    break;
                }
                match provider.snapshot().await {
                    Ok(snapshot) => {
                        tx.send_replace(Some(Arc::new(snapshot)));
                    }
                    Err(e) => error!("Failed to refresh snapshot: {}", e),
                }
            }
        });

        Self {
            receiver: rx,
            handle,
        }
    }

    pub fn receiver(&self) -> watch::Receiver<Option<Arc<Snapshot>>> {
        self.receiver.clone()
    }

    pub fn stop(self) {
        self.handle.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{DocPath, MemoryDocumentStore};
    use serde_json::json;
    use tracing_test::traced_test;

    async fn seeded_store(items: usize, comments_per_item: usize) -> Arc<MemoryDocumentStore> {
        let store = Arc::new(MemoryDocumentStore::new());
        for i in 0..items {
            let path = DocPath::new("videos", format!("v{}", i));
            store
                .set(
                    &path,
                    json!({
                        "title": format!("Video {}", i),
                        "subject": "Math",
                        "reportCount": 1,
                        "adminReportsSeenCount": 4,
                        "uploadedAt": format!("2026-01-{:02}T00:00:00Z", i + 1),
                    }),
                )
                .await
                .unwrap();
            for c in 0..comments_per_item {
                store
                    .set(
                        &path.child(COMMENTS, format!("c{}", c)),
                        json!({"text": "great", "createdAt": "2026-02-01T00:00:00Z"}),
                    )
                    .await
                    .unwrap();
            }
        }
        store
    }

    #[tokio::test]
    async fn comment_sampling_respects_caps() {
        let store = seeded_store(25, 12).await;
        let provider = StoreSnapshotProvider::new(store, SnapshotConfig::default());

        let snapshot = provider.snapshot().await.unwrap();

        assert_eq!(snapshot.content.len(), 25);
        assert_eq!(snapshot.comments.len(), 20 * 10);
        // Newest uploads come first and are the ones sampled
        assert_eq!(snapshot.content[0].id, "v24");
        assert!(snapshot.comments.iter().all(|c| c.content_id != "v0"));
    }

    #[tokio::test]
    async fn loaded_items_are_tagged_and_normalized() {
        let store = seeded_store(1, 0).await;
        let provider = StoreSnapshotProvider::new(store, SnapshotConfig::default());

        let snapshot = provider.snapshot().await.unwrap();
        let item = &snapshot.content[0];
        assert_eq!(item.kind, ContentKind::Video);
        assert_eq!(item.admin_reports_seen_count, 1);
    }

    #[tokio::test]
    #[traced_test]
    async fn malformed_documents_are_skipped() {
        let store = seeded_store(1, 0).await;
        store
            .set(
                &DocPath::new(USERS, "u1"),
                json!({"displayName": "Ada", "createdAt": "2026-01-05T00:00:00Z"}),
            )
            .await
            .unwrap();
        store
            .set(
                &DocPath::new(USERS, "u2"),
                json!({"displayName": "Bob", "createdAt": 1717000000}),
            )
            .await
            .unwrap();
        let provider = StoreSnapshotProvider::new(store, SnapshotConfig::default());

        let snapshot = provider.snapshot().await.unwrap();
        assert_eq!(snapshot.users.len(), 1);
        assert_eq!(snapshot.users[0].id, "u1");
        assert_eq!(snapshot.content.len(), 1);
        assert!(logs_contain("Skipping malformed document users/u2"));
    }

    #[tokio::test]
    async fn read_failures_are_surfaced() {
        let store = seeded_store(1, 0).await;
        store.fail_lists_of("questions").await;
        let provider = StoreSnapshotProvider::new(store, SnapshotConfig::default());

        assert!(provider.snapshot().await.is_err());
    }

    #[tokio::test]
    async fn feed_publishes_snapshots() {
        let store = seeded_store(2, 1).await;
        let provider = Arc::new(StoreSnapshotProvider::new(store, SnapshotConfig::default()));
        let feed = SnapshotFeed::spawn(provider, Duration::from_millis(10));
        let mut rx = feed.receiver();

        rx.changed().await.unwrap();
        let snapshot = rx.borrow().clone().expect("snapshot published");
        assert_eq!(snapshot.content.len(), 2);

        feed.stop();
    }
}
