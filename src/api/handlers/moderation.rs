// Copyright (c) MySocial Team
// SPDX-License-Identifier: Apache-2.0

use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::{json, Value};

use crate::api::response::{ok, ApiError, ApiResponse, ApiResult};
use crate::api::AppState;
use crate::integrity::{ContentDeletion, UserDeletion};
use crate::models::ContentKind;

fn parse_kind(kind: &str) -> Result<ContentKind, ApiError> {
    kind.parse::<ContentKind>().map_err(ApiError::BadRequest)
}

/// Cascade-delete a resource or video.
///
/// A leftover blob makes the response unsuccessful even though the record is gone; dependents
/// that could not be removed are reported as a warning.
pub async fn delete_content(
    State(state): State<AppState>,
    Path((kind, id)): Path<(String, String)>,
) -> ApiResult<ContentDeletion> {
    let deletion = state.integrity.delete_content(parse_kind(&kind)?, &id).await?;

    if let Some(blob_error) = deletion.blob_error.clone() {
        return Ok(Json(ApiResponse::partial(
            deletion,
            format!("record deleted but its file could not be removed: {}", blob_error),
        )));
    }
    if !deletion.dependent_failures.is_empty() {
        let warning = format!(
            "{} dependent records could not be deleted",
            deletion.dependent_failures.len()
        );
        return Ok(Json(ApiResponse {
            success: true,
            data: Some(deletion),
            error: Some(warning),
        }));
    }
    ok(deletion)
}

/// Cascade-delete a user. The sign-in credential is listed under `residualSteps`.
pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<UserDeletion> {
    ok(state.integrity.delete_user(&id).await?)
}

pub async fn mark_reports_seen(
    State(state): State<AppState>,
    Path((kind, id)): Path<(String, String)>,
) -> ApiResult<Value> {
    let seen = state
        .integrity
        .mark_reports_seen(parse_kind(&kind)?, &id)
        .await?;
    ok(json!({ "adminReportsSeenCount": seen }))
}

pub async fn mark_comments_seen(
    State(state): State<AppState>,
    Path((kind, id)): Path<(String, String)>,
) -> ApiResult<Value> {
    let seen = state
        .integrity
        .mark_comments_seen(parse_kind(&kind)?, &id)
        .await?;
    ok(json!({ "adminCommentsSeenCount": seen }))
}

pub async fn delete_comment(
    State(state): State<AppState>,
    Path((kind, id, comment_id)): Path<(String, String, String)>,
) -> ApiResult<Value> {
    state
        .integrity
        .delete_comment(parse_kind(&kind)?, &id, &comment_id)
        .await?;
    ok(json!({ "deleted": comment_id }))
}

pub async fn delete_report(
    State(state): State<AppState>,
    Path((kind, id, report_id)): Path<(String, String, String)>,
) -> ApiResult<Value> {
    state
        .integrity
        .delete_report(parse_kind(&kind)?, &id, &report_id)
        .await?;
    ok(json!({ "deleted": report_id }))
}
