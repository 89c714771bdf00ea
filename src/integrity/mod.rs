// Copyright (c) MySocial Team
// SPDX-License-Identifier: Apache-2.0

//! Cascading deletes and denormalized counter upkeep.
//!
//! A cascade removes dependents first, then the primary document, then its blob. Dependent
//! failures are collected into the outcome instead of aborting; only a missing or undeletable
//! primary document is an error.

mod outcome;

pub use outcome::{ContentDeletion, DependentFailure, UserDeletion};

use std::sync::Arc;

use futures::stream::{self, StreamExt};
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::error::{IntegrityError, StoreError};
use crate::metrics::METRICS;
use crate::models::content::{fields, COMMENTS, REPORTS};
use crate::models::user::{CHAT_ROOMS, HELPDESK_APPLICATIONS, HELPDESK_HELPERS, USERS};
use crate::models::{ContentItem, ContentKind};
use crate::store::{self, BlobStore, DocPath, DocumentStore, Query};

pub struct IntegrityManager {
    store: Arc<dyn DocumentStore>,
    blobs: Arc<dyn BlobStore>,
    /// Dependent deletes in flight at once
    concurrency: usize,
}

fn single_field(name: &str, value: u64) -> Value {
    let mut map = Map::new();
    map.insert(name.to_string(), value.into());
    Value::Object(map)
}

impl IntegrityManager {
    pub fn new(store: Arc<dyn DocumentStore>, blobs: Arc<dyn BlobStore>, concurrency: usize) -> Self {
        Self {
            store,
            blobs,
            concurrency: concurrency.max(1),
        }
    }

    async fn load_content(&self, kind: ContentKind, id: &str) -> Result<ContentItem, IntegrityError> {
        let path = DocPath::new(kind.collection(), id);
        let mut item: ContentItem = store::read(self.store.as_ref(), &path)
            .await?
            .ok_or_else(|| IntegrityError::NotFound(format!("{} {}", kind, id)))?;
        item.kind = kind;
        Ok(item)
    }

    /// Paths of every document in `collection` matching `query`. A failed read is recorded in
    /// `failures` and yields no paths.
    async fn collect_paths(
        &self,
        collection: &str,
        query: &Query,
        failures: &mut Vec<DependentFailure>,
    ) -> Vec<DocPath> {
        match self.store.list(collection, query).await {
            Ok(docs) => docs
                .into_iter()
                .map(|d| DocPath::new(collection, d.id))
                .collect(),
            Err(e) => {
                warn!("Could not list dependents in {}: {}", collection, e);
                failures.push(DependentFailure {
                    path: collection.to_string(),
                    error: e.to_string(),
                });
                Vec::new()
            }
        }
    }

    /// Delete `paths` with bounded concurrency; every delete settles regardless of the others.
    /// Returns how many succeeded.
    async fn delete_all(&self, paths: Vec<DocPath>, failures: &mut Vec<DependentFailure>) -> usize {
        let store = &self.store;
        let results: Vec<(DocPath, Result<bool, StoreError>)> = stream::iter(paths)
            .map(|path| async move {
                let result = store.delete(&path).await;
                (path, result)
            })
            .buffer_unordered(self.concurrency)
            .collect()
            .await;

        let mut deleted = 0;
        for (path, result) in results {
            match result {
                Ok(_) => deleted += 1,
                Err(e) => {
                    warn!("Could not delete dependent {}: {}", path, e);
                    METRICS.dependent_delete_failures.inc();
                    failures.push(DependentFailure {
                        path: path.to_string(),
                        error: e.to_string(),
                    });
                }
            }
        }
        deleted
    }

    /// Delete a content item with its comments, reports and stored file.
    ///
    /// A blob failure does not roll anything back: the outcome reports the document as deleted
    /// and the blob as not deleted.
    pub async fn delete_content(
        &self,
        kind: ContentKind,
        id: &str,
    ) -> Result<ContentDeletion, IntegrityError> {
        let item = self.load_content(kind, id).await?;
        let path = item.path();
        let mut failures = Vec::new();

        let mut dependents = Vec::new();
        for child in [COMMENTS, REPORTS] {
            let collection = path.child_collection(child);
            dependents.extend(
                self.collect_paths(&collection, &Query::new(), &mut failures)
                    .await,
            );
        }
        debug!("Deleting {} dependents of {}", dependents.len(), path);
        let dependents_deleted = self.delete_all(dependents, &mut failures).await;

        self.store.delete(&path).await?;

        let (blob_deleted, blob_error) = match &item.storage_path {
            Some(blob) => match self.blobs.delete(blob).await {
                Ok(()) => (true, None),
                Err(e) => {
                    warn!("Content {} deleted but its blob {} remains: {}", path, blob, e);
                    (false, Some(e.to_string()))
                }
            },
            None => (false, None),
        };

        let deletion = ContentDeletion {
            kind,
            content_id: id.to_string(),
            dependents_deleted,
            dependent_failures: failures,
            document_deleted: true,
            blob_path: item.storage_path.clone(),
            blob_deleted,
            blob_error,
        };
        METRICS.record_deletion("content", deletion.outcome());
        info!(
            "Deleted {} ({} dependents, {} failures, outcome {})",
            path,
            deletion.dependents_deleted,
            deletion.dependent_failures.len(),
            deletion.outcome()
        );
        Ok(deletion)
    }

    /// Delete a user profile with its helpdesk records and chat room index.
    ///
    /// The sign-in credential is outside this service's reach and is returned as a residual step.
    pub async fn delete_user(&self, id: &str) -> Result<UserDeletion, IntegrityError> {
        let path = DocPath::new(USERS, id);
        if self.store.get(&path).await?.is_none() {
            return Err(IntegrityError::NotFound(format!("user {}", id)));
        }

        let mut failures = Vec::new();
        let by_user = Query::new().filter_eq("userId", id);

        let applications = self
            .collect_paths(HELPDESK_APPLICATIONS, &by_user, &mut failures)
            .await;
        let applications_deleted = self.delete_all(applications, &mut failures).await;

        let helpers = self
            .collect_paths(HELPDESK_HELPERS, &by_user, &mut failures)
            .await;
        let helpers_deleted = self.delete_all(helpers, &mut failures).await;

        let rooms = self
            .collect_paths(&path.child_collection(CHAT_ROOMS), &Query::new(), &mut failures)
            .await;
        let chat_rooms_deleted = self.delete_all(rooms, &mut failures).await;

        self.store.delete(&path).await?;

        let deletion = UserDeletion {
            user_id: id.to_string(),
            applications_deleted,
            helpers_deleted,
            chat_rooms_deleted,
            dependent_failures: failures,
            profile_deleted: true,
            residual_steps: vec![format!(
                "Remove the sign-in credential of user {} from the identity provider",
                id
            )],
        };
        METRICS.record_deletion("user", deletion.outcome());
        info!(
            "Deleted user {} ({} applications, {} helper records, {} chat rooms)",
            id, applications_deleted, helpers_deleted, chat_rooms_deleted
        );
        Ok(deletion)
    }

    /// Set the reports-seen counter to the current report count; returns the new value
    pub async fn mark_reports_seen(&self, kind: ContentKind, id: &str) -> Result<u64, IntegrityError> {
        let item = self.load_content(kind, id).await?;
        self.store
            .update(&item.path(), single_field(fields::REPORTS_SEEN, item.reports))
            .await?;
        Ok(item.reports)
    }

    /// Set the comments-seen counter to the current comment count; returns the new value
    pub async fn mark_comments_seen(
        &self,
        kind: ContentKind,
        id: &str,
    ) -> Result<u64, IntegrityError> {
        let item = self.load_content(kind, id).await?;
        self.store
            .update(&item.path(), single_field(fields::COMMENTS_SEEN, item.comments))
            .await?;
        Ok(item.comments)
    }

    async fn delete_counted_child(
        &self,
        kind: ContentKind,
        content_id: &str,
        collection: &str,
        counter: &str,
        child_id: &str,
    ) -> Result<(), IntegrityError> {
        let parent = self.load_content(kind, content_id).await?.path();
        let child = parent.child(collection, child_id);

        // Only the call that actually removed the child may touch the counter
        if !self.store.delete(&child).await? {
            return Err(IntegrityError::NotFound(child.to_string()));
        }
        self.store.increment(&parent, counter, -1).await?;
        info!("Deleted {} and decremented {} on {}", child, counter, parent);
        Ok(())
    }

    pub async fn delete_comment(
        &self,
        kind: ContentKind,
        content_id: &str,
        comment_id: &str,
    ) -> Result<(), IntegrityError> {
        self.delete_counted_child(kind, content_id, COMMENTS, fields::COMMENT_COUNT, comment_id)
            .await?;
        METRICS.record_deletion("comment", "ok");
        Ok(())
    }

    pub async fn delete_report(
        &self,
        kind: ContentKind,
        content_id: &str,
        report_id: &str,
    ) -> Result<(), IntegrityError> {
        self.delete_counted_child(kind, content_id, REPORTS, fields::REPORT_COUNT, report_id)
            .await?;
        METRICS.record_deletion("report", "ok");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemoryBlobStore, MemoryDocumentStore};
    use serde_json::json;
    use tracing_test::traced_test;

    async fn seeded() -> (Arc<MemoryDocumentStore>, Arc<MemoryBlobStore>) {
        let store = Arc::new(MemoryDocumentStore::new());
        let blobs = Arc::new(MemoryBlobStore::new());
        let video = DocPath::new("videos", "v1");
        store
            .set(
                &video,
                json!({
                    "title": "Derivatives",
                    "commentCount": 2,
                    "reportCount": 1,
                    "uploadedAt": "2026-05-01T09:00:00Z",
                    "storagePath": "videos/v1.mp4",
                }),
            )
            .await
            .unwrap();
        for c in ["c1", "c2"] {
            store
                .set(&video.child(COMMENTS, c), json!({"text": "nice"}))
                .await
                .unwrap();
        }
        store
            .set(&video.child(REPORTS, "r1"), json!({"reason": "spam"}))
            .await
            .unwrap();
        blobs.put("videos/v1.mp4").await;
        (store, blobs)
    }

    #[tokio::test]
    #[traced_test]
    async fn dependent_failures_are_logged_and_collected() {
        let (store, blobs) = seeded().await;
        let video = DocPath::new("videos", "v1");
        store.fail_deletes_of(video.child(COMMENTS, "c2")).await;
        let manager = IntegrityManager::new(store.clone(), blobs.clone(), 4);

        let deletion = manager.delete_content(ContentKind::Video, "v1").await.unwrap();

        assert!(deletion.document_deleted);
        assert!(deletion.blob_deleted);
        assert_eq!(deletion.dependents_deleted, 2);
        assert_eq!(deletion.dependent_failures.len(), 1);
        assert_eq!(deletion.outcome(), "partial");
        assert!(!store.contains(&video).await);
        assert!(logs_contain("Could not delete dependent videos/v1/comments/c2"));
    }

    #[tokio::test]
    #[traced_test]
    async fn unreadable_dependents_do_not_abort_the_cascade() {
        let (store, blobs) = seeded().await;
        store.fail_lists_of("videos/v1/reports").await;
        let manager = IntegrityManager::new(store.clone(), blobs, 4);

        let deletion = manager.delete_content(ContentKind::Video, "v1").await.unwrap();
        assert_eq!(deletion.dependents_deleted, 2);
        assert_eq!(deletion.dependent_failures[0].path, "videos/v1/reports");
        assert!(logs_contain("Could not list dependents"));
    }

    #[tokio::test]
    async fn missing_content_aborts_before_touching_the_blob() {
        let (store, blobs) = seeded().await;
        let manager = IntegrityManager::new(store, blobs.clone(), 4);

        let err = manager
            .delete_content(ContentKind::Resource, "v1")
            .await
            .unwrap_err();
        assert!(matches!(err, IntegrityError::NotFound(_)));
        assert!(blobs.contains("videos/v1.mp4").await);
    }

    #[tokio::test]
    async fn seen_counters_follow_current_totals() {
        let (store, blobs) = seeded().await;
        let manager = IntegrityManager::new(store.clone(), blobs, 4);

        assert_eq!(manager.mark_reports_seen(ContentKind::Video, "v1").await.unwrap(), 1);
        assert_eq!(manager.mark_comments_seen(ContentKind::Video, "v1").await.unwrap(), 2);

        let doc = store.get(&DocPath::new("videos", "v1")).await.unwrap().unwrap();
        assert_eq!(doc.data["adminReportsSeenCount"], 1);
        assert_eq!(doc.data["adminCommentsSeenCount"], 2);
    }
}
