// Copyright (c) MySocial Team
// SPDX-License-Identifier: Apache-2.0

mod handlers;
pub mod response;

pub use response::{ApiError, ApiResponse};

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::{
    routing::{delete, get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::analytics::AnalyticsEngine;
use crate::config::ServerConfig;
use crate::integrity::IntegrityManager;
use crate::routing::QuestionRouter;
use crate::snapshot::SnapshotProvider;
use crate::store::DocumentStore;

/// Shared handles for request handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn DocumentStore>,
    pub provider: Arc<dyn SnapshotProvider>,
    pub engine: Arc<AnalyticsEngine>,
    pub router: Arc<QuestionRouter>,
    pub integrity: Arc<IntegrityManager>,
    /// Upper bound on questions returned per listing
    pub question_limit: usize,
}

/// Build the admin API router
pub fn router(state: AppState, enable_cors: bool) -> Router {
    let app = Router::new()
        // General routes
        .route("/health", get(handlers::health::health_check))
        .route("/metrics", get(handlers::health::get_metrics))
        // Analytics routes
        .route("/api/insights", get(handlers::analytics::get_insights))
        .route("/api/sentiment", get(handlers::analytics::get_sentiment))
        .route("/api/predictions", get(handlers::analytics::get_predictions))
        .route("/api/anomalies", get(handlers::analytics::get_anomalies))
        // Question routes
        .route("/api/questions", get(handlers::questions::get_questions))
        .route("/api/questions/auto-reply", post(handlers::questions::auto_reply))
        .route("/api/questions/:id/answer", post(handlers::questions::answer_question))
        .route("/api/questions/:id/resolve", post(handlers::questions::resolve_question))
        .route("/api/questions/:id/escalate", post(handlers::questions::escalate_question))
        // Settings routes
        .route(
            "/api/settings/automation",
            get(handlers::settings::get_automation).put(handlers::settings::put_automation),
        )
        // Moderation routes
        .route("/api/content/:kind/:id", delete(handlers::moderation::delete_content))
        .route(
            "/api/content/:kind/:id/reports/seen",
            post(handlers::moderation::mark_reports_seen),
        )
        .route(
            "/api/content/:kind/:id/comments/seen",
            post(handlers::moderation::mark_comments_seen),
        )
        .route(
            "/api/content/:kind/:id/comments/:comment_id",
            delete(handlers::moderation::delete_comment),
        )
        .route(
            "/api/content/:kind/:id/reports/:report_id",
            delete(handlers::moderation::delete_report),
        )
        .route("/api/users/:id", delete(handlers::moderation::delete_user))
        // Add state and middleware
        .with_state(state)
        .layer(TraceLayer::new_for_http());

    if enable_cors {
        app.layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
    } else {
        app
    }
}

/// Start the API server
pub async fn start_api_server(state: AppState, config: &ServerConfig) -> Result<()> {
    let app = router(state, config.enable_cors);

    // Get bind address
    let addr = format!("{}:{}", config.host, config.port).parse::<SocketAddr>()?;

    // Start server
    info!("Starting API server on {}", addr);
    axum::Server::bind(&addr)
        .serve(app.into_make_service())
        .await?;

    Ok(())
}
