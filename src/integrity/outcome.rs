// Copyright (c) MySocial Team
// SPDX-License-Identifier: Apache-2.0

use serde::Serialize;

use crate::models::ContentKind;

/// A dependent record that could not be removed
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DependentFailure {
    pub path: String,
    pub error: String,
}

/// Per-step result of deleting a content item
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentDeletion {
    pub kind: ContentKind,
    pub content_id: String,
    pub dependents_deleted: usize,
    pub dependent_failures: Vec<DependentFailure>,
    pub document_deleted: bool,
    pub blob_path: Option<String>,
    pub blob_deleted: bool,
    pub blob_error: Option<String>,
}

impl ContentDeletion {
    /// The document is gone but its stored file may not be
    pub fn blob_failed(&self) -> bool {
        self.blob_error.is_some()
    }

    /// Every step succeeded
    pub fn is_complete(&self) -> bool {
        self.document_deleted && !self.blob_failed() && self.dependent_failures.is_empty()
    }

    pub fn outcome(&self) -> &'static str {
        if self.blob_failed() {
            "failed"
        } else if self.dependent_failures.is_empty() {
            "ok"
        } else {
            "partial"
        }
    }
}

/// Per-step result of deleting a user account
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDeletion {
    pub user_id: String,
    pub applications_deleted: usize,
    pub helpers_deleted: usize,
    pub chat_rooms_deleted: usize,
    pub dependent_failures: Vec<DependentFailure>,
    pub profile_deleted: bool,
    /// Work an administrator still has to do by hand
    pub residual_steps: Vec<String>,
}

impl UserDeletion {
    pub fn outcome(&self) -> &'static str {
        if self.dependent_failures.is_empty() {
            "ok"
        } else {
            "partial"
        }
    }
}
