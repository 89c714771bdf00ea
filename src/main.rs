// Copyright (c) MySocial Team
// SPDX-License-Identifier: Apache-2.0

use anyhow::Result;
use dotenv::dotenv;
use std::sync::Arc;
use tokio::signal;
use tokio::sync::oneshot;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tutorhub_admin::analytics::AnalyticsEngine;
use tutorhub_admin::api::{self, AppState};
use tutorhub_admin::config::Config;
use tutorhub_admin::db::init_database;
use tutorhub_admin::integrity::IntegrityManager;
use tutorhub_admin::random::{RandomSource, ThreadRandom};
use tutorhub_admin::routing::QuestionRouter;
use tutorhub_admin::snapshot::{SnapshotProvider, StoreSnapshotProvider};
use tutorhub_admin::store::{BlobStore, DocumentStore, FsBlobStore, PgDocumentStore};
use tutorhub_admin::worker::AdminWorker;

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file if present
    dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tutorhub_admin=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::init()?;
    info!("Initialized configuration");

    // Initialize database
    let db = Arc::new(init_database(&config.database).await?);
    info!("Connected to database");

    let store: Arc<dyn DocumentStore> = Arc::new(PgDocumentStore::new(db));
    let blobs: Arc<dyn BlobStore> = Arc::new(FsBlobStore::new(&config.storage.blob_root));
    let random: Arc<dyn RandomSource> = Arc::new(ThreadRandom);

    let provider: Arc<dyn SnapshotProvider> = Arc::new(StoreSnapshotProvider::new(
        store.clone(),
        config.snapshot.clone(),
    ));
    let engine = Arc::new(AnalyticsEngine::new(random.clone()));
    let router = Arc::new(
        QuestionRouter::new(store.clone(), random).with_default_settings(config.automation),
    );
    let integrity = Arc::new(IntegrityManager::new(
        store.clone(),
        blobs,
        config.moderation.delete_concurrency,
    ));

    // Prepare termination signals
    let (term_sender, term_receiver) = oneshot::channel();

    // Start the background worker
    let worker = AdminWorker::new(
        store.clone(),
        router.clone(),
        engine.clone(),
        provider.clone(),
        config.snapshot.poll_interval(),
    );
    let worker_handle = tokio::spawn(async move {
        match worker.run(term_receiver).await {
            Ok(()) => info!("Admin worker finished"),
            Err(e) => error!("Admin worker failed: {}", e),
        }
    });

    // Start API server
    let state = AppState {
        store,
        provider,
        engine,
        router,
        integrity,
        question_limit: config.snapshot.question_limit,
    };
    let server_config = config.server.clone();
    let api_handle = tokio::spawn(async move {
        if let Err(e) = api::start_api_server(state, &server_config).await {
            error!("API server error: {}", e);
        }
    });

    // Wait for a shutdown signal
    match signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received, initiating graceful shutdown"),
        Err(e) => error!("Failed to listen for shutdown signal: {}", e),
    }
    let _ = term_sender.send(());
    api_handle.abort();

    let _ = tokio::join!(worker_handle, api_handle);

    info!("TutorHub admin service shutdown complete");
    Ok(())
}
