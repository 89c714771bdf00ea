// Copyright (c) MySocial Team
// SPDX-License-Identifier: Apache-2.0

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;

use crate::api::response::{ok, ApiResult};
use crate::api::AppState;
use crate::models::{Question, QuestionStatus};
use crate::routing::AutoReplySummary;

#[derive(Debug, Deserialize)]
pub struct QuestionQuery {
    pub status: Option<QuestionStatus>,
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct AnswerRequest {
    pub response: String,
}

/// Newest questions first, with their automatic and administrator replies
pub async fn get_questions(
    State(state): State<AppState>,
    Query(query): Query<QuestionQuery>,
) -> ApiResult<Vec<Question>> {
    let limit = query
        .limit
        .unwrap_or(state.question_limit)
        .min(state.question_limit);
    ok(state.router.list(query.status, limit).await?)
}

/// Run one auto-reply pass over the pending questions
pub async fn auto_reply(State(state): State<AppState>) -> ApiResult<AutoReplySummary> {
    let settings = state.router.load_settings().await?;
    let pending = state.router.pending().await?;
    ok(state.router.auto_reply_pending(&pending, &settings).await)
}

pub async fn answer_question(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<AnswerRequest>,
) -> ApiResult<Question> {
    ok(state.router.answer(&id, &body.response).await?)
}

pub async fn resolve_question(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Question> {
    ok(state.router.resolve(&id).await?)
}

pub async fn escalate_question(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Question> {
    ok(state.router.escalate(&id).await?)
}
