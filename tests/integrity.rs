// Copyright (c) MySocial Team
// SPDX-License-Identifier: Apache-2.0

use std::sync::Arc;

use serde_json::json;
use tokio_test::{assert_err, assert_ok};

use tutorhub_admin::error::IntegrityError;
use tutorhub_admin::integrity::IntegrityManager;
use tutorhub_admin::models::ContentKind;
use tutorhub_admin::store::{DocPath, DocumentStore, MemoryBlobStore, MemoryDocumentStore};

struct Fixture {
    store: Arc<MemoryDocumentStore>,
    blobs: Arc<MemoryBlobStore>,
    manager: IntegrityManager,
}

fn fixture() -> Fixture {
    let store = Arc::new(MemoryDocumentStore::new());
    let blobs = Arc::new(MemoryBlobStore::new());
    let manager = IntegrityManager::new(store.clone(), blobs.clone(), 4);
    Fixture {
        store,
        blobs,
        manager,
    }
}

async fn seed_resource(store: &MemoryDocumentStore, id: &str, comments: &[&str], reports: &[&str]) {
    let path = DocPath::new("resources", id);
    store
        .set(
            &path,
            json!({
                "title": "Organic chemistry summary",
                "subject": "Chemistry",
                "commentCount": comments.len(),
                "reportCount": reports.len(),
                "uploadedAt": "2026-04-02T12:00:00Z",
                "storagePath": format!("resources/{}.pdf", id),
            }),
        )
        .await
        .unwrap();
    for c in comments {
        store
            .set(
                &path.child("comments", *c),
                json!({"text": "thanks", "createdAt": "2026-04-03T12:00:00Z"}),
            )
            .await
            .unwrap();
    }
    for r in reports {
        store
            .set(&path.child("reports", *r), json!({"reason": "spam"}))
            .await
            .unwrap();
    }
}

#[test_log::test(tokio::test)]
async fn cascade_removes_dependents_document_and_blob() {
    let f = fixture();
    seed_resource(&f.store, "r1", &["c1", "c2"], &["rep1"]).await;
    f.blobs.put("resources/r1.pdf").await;

    let deletion = assert_ok!(f.manager.delete_content(ContentKind::Resource, "r1").await);

    assert!(deletion.is_complete());
    assert_eq!(deletion.dependents_deleted, 3);
    assert_eq!(f.store.count("resources/r1/comments").await, 0);
    assert_eq!(f.store.count("resources/r1/reports").await, 0);
    assert!(!f.store.contains(&DocPath::new("resources", "r1")).await);
    assert!(!f.blobs.contains("resources/r1.pdf").await);
}

#[test_log::test(tokio::test)]
async fn blob_failure_is_reported_not_thrown() {
    let f = fixture();
    seed_resource(&f.store, "r1", &["c1", "c2"], &["rep1"]).await;
    f.blobs.put("resources/r1.pdf").await;
    f.blobs.fail_deletes_of("resources/r1.pdf").await;

    let deletion = assert_ok!(f.manager.delete_content(ContentKind::Resource, "r1").await);

    let body = serde_json::to_value(&deletion).unwrap();
    assert_eq!(body["documentDeleted"], true);
    assert_eq!(body["blobDeleted"], false);
    assert_eq!(deletion.outcome(), "failed");
    assert_eq!(f.store.count("resources/r1/comments").await, 0);
    assert_eq!(f.store.count("resources/r1/reports").await, 0);
    assert!(f.blobs.contains("resources/r1.pdf").await);
}

#[test_log::test(tokio::test)]
async fn deleting_missing_content_is_not_found() {
    let f = fixture();
    let err = assert_err!(f.manager.delete_content(ContentKind::Video, "ghost").await);
    assert!(matches!(err, IntegrityError::NotFound(_)));
}

#[test_log::test(tokio::test)]
async fn user_cascade_reports_the_credential_as_residual() {
    let f = fixture();
    f.store
        .set(
            &DocPath::new("users", "u1"),
            json!({"displayName": "Grace", "createdAt": "2026-01-01T00:00:00Z"}),
        )
        .await
        .unwrap();
    f.store
        .set(&DocPath::new("helpdeskApplications", "a1"), json!({"userId": "u1"}))
        .await
        .unwrap();
    f.store
        .set(&DocPath::new("helpdeskApplications", "a2"), json!({"userId": "u2"}))
        .await
        .unwrap();
    f.store
        .set(&DocPath::new("helpdeskHelpers", "h1"), json!({"userId": "u1"}))
        .await
        .unwrap();
    for room in ["room-1", "room-2"] {
        f.store
            .set(&DocPath::new("users/u1/chatRooms", room), json!({"unread": 0}))
            .await
            .unwrap();
    }

    let deletion = assert_ok!(f.manager.delete_user("u1").await);

    assert!(deletion.profile_deleted);
    assert_eq!(deletion.applications_deleted, 1);
    assert_eq!(deletion.helpers_deleted, 1);
    assert_eq!(deletion.chat_rooms_deleted, 2);
    assert_eq!(deletion.residual_steps.len(), 1);
    assert!(deletion.residual_steps[0].contains("u1"));

    assert!(!f.store.contains(&DocPath::new("users", "u1")).await);
    assert!(f.store.contains(&DocPath::new("helpdeskApplications", "a2")).await);
    assert_eq!(f.store.count("users/u1/chatRooms").await, 0);
}

#[test_log::test(tokio::test)]
async fn concurrent_comment_deletes_decrement_exactly_once_each() {
    let f = fixture();
    let ids = ["c1", "c2", "c3", "c4", "c5"];
    seed_resource(&f.store, "r1", &ids, &[]).await;
    let manager = Arc::new(f.manager);

    let handles: Vec<_> = ids
        .iter()
        .map(|id| {
            let manager = manager.clone();
            let id = id.to_string();
            tokio::spawn(async move {
                manager
                    .delete_comment(ContentKind::Resource, "r1", &id)
                    .await
            })
        })
        .collect();
    for handle in handles {
        assert_ok!(handle.await.unwrap());
    }

    let doc = f
        .store
        .get(&DocPath::new("resources", "r1"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(doc.data["commentCount"].as_i64(), Some(0));
    assert_eq!(f.store.count("resources/r1/comments").await, 0);
}

#[test_log::test(tokio::test)]
async fn racing_deletes_of_one_comment_decrement_once() {
    let f = fixture();
    seed_resource(&f.store, "r1", &["c1", "c2"], &[]).await;

    let (first, second) = tokio::join!(
        f.manager.delete_comment(ContentKind::Resource, "r1", "c1"),
        f.manager.delete_comment(ContentKind::Resource, "r1", "c1"),
    );
    assert!(first.is_ok() != second.is_ok());
    let err = first.err().or(second.err()).unwrap();
    assert!(matches!(err, IntegrityError::NotFound(_)));

    let doc = f
        .store
        .get(&DocPath::new("resources", "r1"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(doc.data["commentCount"].as_i64(), Some(1));
    assert_eq!(f.store.count("resources/r1/comments").await, 1);
}

#[test_log::test(tokio::test)]
async fn deleting_an_unknown_report_leaves_the_counter_alone() {
    let f = fixture();
    seed_resource(&f.store, "r1", &[], &["rep1"]).await;

    let err = assert_err!(
        f.manager
            .delete_report(ContentKind::Resource, "r1", "rep-missing")
            .await
    );
    assert!(matches!(err, IntegrityError::NotFound(_)));

    assert_ok!(f.manager.delete_report(ContentKind::Resource, "r1", "rep1").await);
    let doc = f
        .store
        .get(&DocPath::new("resources", "r1"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(doc.data["reportCount"].as_i64(), Some(0));
}

#[test_log::test(tokio::test)]
async fn seen_counters_never_exceed_totals_after_deletes() {
    let f = fixture();
    seed_resource(&f.store, "r1", &["c1", "c2"], &[]).await;

    assert_eq!(
        assert_ok!(f.manager.mark_comments_seen(ContentKind::Resource, "r1").await),
        2
    );
    assert_ok!(f.manager.delete_comment(ContentKind::Resource, "r1", "c1").await);

    let item: tutorhub_admin::models::ContentItem = tutorhub_admin::store::read(
        f.store.as_ref(),
        &DocPath::new("resources", "r1"),
    )
    .await
    .unwrap()
    .unwrap();
    assert_eq!(item.comments, 1);
    assert_eq!(item.comments_seen(), 1);
    assert_eq!(item.unseen_comments(), 0);
}
