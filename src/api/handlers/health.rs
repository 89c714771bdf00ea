// Copyright (c) MySocial Team
// SPDX-License-Identifier: Apache-2.0

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

use crate::api::AppState;
use crate::metrics::METRICS;
use crate::models::AutomationSettings;

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    // A point read proves the document store is reachable
    match state.store.get(&AutomationSettings::path()).await {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({
                "status": "healthy",
                "message": "API server is running"
            })),
        ),
        Err(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
                "status": "unhealthy",
                "message": format!("Document store unavailable: {}", e)
            })),
        ),
    }
}

/// Prometheus text exposition
pub async fn get_metrics() -> impl IntoResponse {
    match METRICS.render() {
        Ok(body) => (StatusCode::OK, body),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Failed to encode metrics: {}", e),
        ),
    }
}
