// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::Context;
use axum::{
    routing::{get, post},
    Router,
};
use std::{future::Future, net::SocketAddr, sync::Arc};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use super::continuations::{
    get_continuation_handler, missing_hash_handler, store_continuation_handler,
};
use super::handlers::{health_handler, stats_handler};
use super::images::{image_file_handler, upload_image_handler};
use crate::config::AppConfig;
use crate::ingest::{ImageFetcher, ImageIngestionPipeline};
use crate::storage::{
    BlobStore, ContinuationStore, FsBlobStore, SqliteContinuationStore, StoreError,
};

/// Store handles shared by every request
///
/// Built once at startup and closed at shutdown; handlers hold no other state.
#[derive(Clone)]
pub struct AppState {
    pub continuations: Arc<dyn ContinuationStore>,
    pub blobs: Arc<dyn BlobStore>,
    pub ingestion: Arc<ImageIngestionPipeline>,
}

impl AppState {
    pub fn new(
        continuations: Arc<dyn ContinuationStore>,
        blobs: Arc<dyn BlobStore>,
        ingestion: Arc<ImageIngestionPipeline>,
    ) -> Self {
        Self {
            continuations,
            blobs,
            ingestion,
        }
    }

    /// Open the SQLite database and blob directory named by `config`
    pub async fn open(config: &AppConfig) -> anyhow::Result<Self> {
        let db_path = config.database_path.clone();
        let continuations =
            tokio::task::spawn_blocking(move || SqliteContinuationStore::open(db_path))
                .await
                .context("continuation store open task failed")?
                .with_context(|| {
                    format!(
                        "failed to open continuation database {}",
                        config.database_path.display()
                    )
                })?;
        info!("Database initialized at {}", config.database_path.display());

        let blobs: Arc<dyn BlobStore> = Arc::new(
            FsBlobStore::open(&config.blob_dir)
                .await
                .with_context(|| format!("failed to open blob directory {}", config.blob_dir.display()))?,
        );

        let fetcher = ImageFetcher::new(config.fetch_timeout(), config.max_image_bytes)?;
        let ingestion = Arc::new(ImageIngestionPipeline::new(
            fetcher,
            Arc::clone(&blobs),
            config.transcode(),
        ));

        Ok(Self::new(Arc::new(continuations), blobs, ingestion))
    }

    pub async fn close(&self) -> Result<(), StoreError> {
        self.continuations.close().await
    }
}

pub fn create_app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/stats", get(stats_handler))
        .route(
            "/continuations/:hash",
            get(get_continuation_handler).post(store_continuation_handler),
        )
        .route(
            "/continuations",
            get(missing_hash_handler).post(missing_hash_handler),
        )
        .route(
            "/continuations/",
            get(missing_hash_handler).post(missing_hash_handler),
        )
        .route("/images/upload", post(upload_image_handler))
        .route("/images/file/:id", get(image_file_handler))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

pub async fn start_server(
    state: AppState,
    addr: SocketAddr,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> anyhow::Result<()> {
    let app = create_app(state);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;

    info!("API server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    Ok(())
}
