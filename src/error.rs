// Copyright (c) MySocial Team
// SPDX-License-Identifier: Apache-2.0

use thiserror::Error;

use crate::models::question::{QuestionAction, QuestionStatus};

/// Errors raised by document and blob store adapters
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("document not found: {0}")]
    NotFound(String),
    #[error("store backend error: {0}")]
    Backend(String),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid path: {0}")]
    InvalidPath(String),
}

impl From<diesel::result::Error> for StoreError {
    fn from(err: diesel::result::Error) -> Self {
        StoreError::Backend(err.to_string())
    }
}

/// Errors raised while advancing a question through its lifecycle
#[derive(Error, Debug)]
pub enum RoutingError {
    #[error("question not found: {0}")]
    NotFound(String),
    #[error("cannot {action} a question that is {from}")]
    InvalidTransition {
        from: QuestionStatus,
        action: QuestionAction,
    },
    #[error("response text must not be empty")]
    EmptyResponse,
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Fatal failures of an integrity operation.
///
/// Partial failures (a dependent record or blob that could not be removed) are not errors; they
/// are reported through the outcome types in [`crate::integrity`].
#[derive(Error, Debug)]
pub enum IntegrityError {
    #[error("{0} not found")]
    NotFound(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}
