// Copyright (c) MySocial Team
// SPDX-License-Identifier: Apache-2.0

use axum::extract::State;
use chrono::Utc;

use crate::analytics::{AnalyticsReport, Anomaly, Prediction, SentimentReport};
use crate::api::response::{ok, ApiResult};
use crate::api::AppState;
use crate::models::AutomationSettings;
use crate::snapshot::Snapshot;

async fn load(state: &AppState) -> Result<(Snapshot, AutomationSettings), crate::api::ApiError> {
    let snapshot = state.provider.snapshot().await?;
    let settings = state.router.load_settings().await?;
    Ok((snapshot, settings))
}

/// Full analytics run: metrics, sentiment, forecasts, anomalies and ranked insights
pub async fn get_insights(State(state): State<AppState>) -> ApiResult<AnalyticsReport> {
    let (snapshot, settings) = load(&state).await?;
    ok(state.engine.run(&snapshot, &settings, Utc::now()))
}

pub async fn get_sentiment(State(state): State<AppState>) -> ApiResult<SentimentReport> {
    let snapshot = state.provider.snapshot().await?;
    ok(state.engine.sentiment(&snapshot, Utc::now()))
}

/// `data` is null while predictive analytics is switched off
pub async fn get_predictions(State(state): State<AppState>) -> ApiResult<Option<Prediction>> {
    let (snapshot, settings) = load(&state).await?;
    ok(settings
        .predictive_analytics
        .then(|| state.engine.predict(&snapshot, Utc::now())))
}

/// `data` is null while content moderation is switched off
pub async fn get_anomalies(State(state): State<AppState>) -> ApiResult<Option<Vec<Anomaly>>> {
    let (snapshot, settings) = load(&state).await?;
    ok(settings
        .content_moderation
        .then(|| state.engine.anomalies(&snapshot, Utc::now())))
}
