// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Router wired to an in-memory database and a temporary blob directory

#![allow(dead_code)]

use axum::{
    body::{to_bytes, Body},
    http::{Method, Request, Response},
    Router,
};
use fabstir_adventure_cache::api::http_server::{create_app, AppState};
use fabstir_adventure_cache::ingest::{ImageFetcher, ImageIngestionPipeline, TranscodeConfig};
use fabstir_adventure_cache::storage::{BlobStore, FsBlobStore, SqliteContinuationStore};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tower::util::ServiceExt;

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub blob_dir: TempDir,
}

pub async fn test_app() -> TestApp {
    let blob_dir = TempDir::new().unwrap();
    let continuations = Arc::new(SqliteContinuationStore::in_memory().unwrap());
    let blobs: Arc<dyn BlobStore> = Arc::new(FsBlobStore::open(blob_dir.path()).await.unwrap());
    let fetcher = ImageFetcher::new(Duration::from_secs(10), 20 * 1024 * 1024).unwrap();
    let ingestion = Arc::new(ImageIngestionPipeline::new(
        fetcher,
        Arc::clone(&blobs),
        TranscodeConfig::default(),
    ));
    let state = AppState::new(continuations, blobs, ingestion);

    TestApp {
        router: create_app(state.clone()),
        state,
        blob_dir,
    }
}

impl TestApp {
    pub async fn send(&self, method: Method, uri: &str, body: Option<serde_json::Value>) -> Response<Body> {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        self.router.clone().oneshot(request).await.unwrap()
    }

    pub async fn send_raw(&self, method: Method, uri: &str, body: &'static str) -> Response<Body> {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body))
            .unwrap();
        self.router.clone().oneshot(request).await.unwrap()
    }
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    to_bytes(response.into_body(), usize::MAX).await.unwrap().to_vec()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}
