// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Fetch → transcode → persist
//!
//! Stages run strictly in order inside the caller's request. The first failing
//! stage ends the run; nothing from earlier stages is kept.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{error, info};

use super::errors::{IngestError, IngestErrorKind};
use super::fetcher::ImageFetcher;
use super::transcode::{transcode, TranscodeConfig, TRANSCODED_CONTENT_TYPE};
use crate::storage::{chunked, BlobId, BlobStore};

/// Route under which stored images are served
pub const IMAGE_FILE_ROUTE: &str = "/images/file";

/// Metadata key holding the URL an image was ingested from
pub const META_ORIGINAL_URL: &str = "original_url";

/// Metadata key holding the ingestion timestamp (RFC 3339)
pub const META_CREATED_AT: &str = "created_at";

/// Stable handle to an ingested image
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlobLocator {
    pub id: String,
    pub url: String,
}

impl BlobLocator {
    pub fn for_id(id: &BlobId) -> Self {
        Self {
            id: id.to_string(),
            url: format!("{}/{}", IMAGE_FILE_ROUTE, id),
        }
    }
}

pub struct ImageIngestionPipeline {
    fetcher: ImageFetcher,
    blobs: Arc<dyn BlobStore>,
    transcode: TranscodeConfig,
}

impl ImageIngestionPipeline {
    pub fn new(fetcher: ImageFetcher, blobs: Arc<dyn BlobStore>, transcode: TranscodeConfig) -> Self {
        Self {
            fetcher,
            blobs,
            transcode,
        }
    }

    pub fn transcode_config(&self) -> &TranscodeConfig {
        &self.transcode
    }

    pub async fn ingest(&self, source_url: &str) -> Result<BlobLocator, IngestError> {
        let result = self.run(source_url).await;
        if let Err(e) = &result {
            error!("Error storing image from {}: {}", source_url, e);
        }
        result
    }

    async fn run(&self, source_url: &str) -> Result<BlobLocator, IngestError> {
        // 1. Fetch
        let original = self.fetcher.fetch(source_url).await?;

        // 2. Transcode off the async workers
        let config = self.transcode;
        let image = tokio::task::spawn_blocking(move || transcode(&original, &config))
            .await
            .map_err(|e| {
                IngestError::new(IngestErrorKind::Encode, format!("transcode task failed: {}", e))
            })??;

        // 3. Persist
        let mut metadata = HashMap::new();
        metadata.insert(META_ORIGINAL_URL.to_string(), source_url.to_string());
        metadata.insert(META_CREATED_AT.to_string(), Utc::now().to_rfc3339());

        let id = self
            .blobs
            .create_from_stream(chunked(image.bytes), TRANSCODED_CONTENT_TYPE, metadata)
            .await?;

        // 4. Return
        let locator = BlobLocator::for_id(&id);
        info!("Image stored with ID: {} ({}x{})", id, image.width, image.height);
        Ok(locator)
    }
}
