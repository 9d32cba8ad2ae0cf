// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Bounded HTTP download of generated images
//!
//! One request per call, no retries. The client timeout covers connect,
//! headers and body, so a stalled transfer is aborted at the deadline.

use bytes::{Bytes, BytesMut};
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

use super::errors::{IngestError, IngestErrorKind};

#[derive(Debug, Clone)]
pub struct ImageFetcher {
    client: Client,
    max_bytes: usize,
}

impl ImageFetcher {
    pub fn new(timeout: Duration, max_bytes: usize) -> Result<Self, IngestError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("fabstir-adventure-cache/", env!("CARGO_PKG_VERSION")))
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()
            .map_err(|e| {
                IngestError::new(
                    IngestErrorKind::Transport,
                    format!("failed to create HTTP client: {}", e),
                )
            })?;

        Ok(Self { client, max_bytes })
    }

    pub fn max_bytes(&self) -> usize {
        self.max_bytes
    }

    /// Only absolute http/https URLs are fetched
    pub fn parse_source_url(url: &str) -> Result<Url, IngestError> {
        let parsed = Url::parse(url).map_err(|e| {
            IngestError::new(IngestErrorKind::InvalidUrl, format!("{}: {}", url, e))
        })?;
        if !["http", "https"].contains(&parsed.scheme()) {
            return Err(IngestError::new(
                IngestErrorKind::InvalidUrl,
                format!("unsupported scheme '{}'", parsed.scheme()),
            ));
        }
        Ok(parsed)
    }

    /// Download `url` into memory, failing on non-success status or once the
    /// body grows past the size cap
    pub async fn fetch(&self, url: &str) -> Result<Bytes, IngestError> {
        let parsed = Self::parse_source_url(url)?;
        info!("Starting download from: {}", parsed);

        let mut response = self
            .client
            .get(parsed)
            .send()
            .await
            .map_err(|e| classify(e, url))?;

        let status = response.status();
        debug!("Download response status: {}", status);
        if !status.is_success() {
            warn!("Failed to download image: HTTP {} for {}", status.as_u16(), url);
            return Err(IngestError::new(
                IngestErrorKind::HttpStatus(status.as_u16()),
                format!("HTTP {} for {}", status.as_u16(), url),
            ));
        }

        if let Some(len) = response.content_length() {
            if len > self.max_bytes as u64 {
                return Err(self.too_large(len));
            }
        }

        let mut body = BytesMut::new();
        while let Some(chunk) = response.chunk().await.map_err(|e| classify(e, url))? {
            if body.len() + chunk.len() > self.max_bytes {
                return Err(self.too_large((body.len() + chunk.len()) as u64));
            }
            body.extend_from_slice(&chunk);
            debug!("Downloaded {} bytes so far", body.len());
        }

        info!("Download complete: {} bytes total", body.len());
        Ok(body.freeze())
    }

    fn too_large(&self, len: u64) -> IngestError {
        warn!("Image body exceeds {} byte cap", self.max_bytes);
        IngestError::new(
            IngestErrorKind::TooLarge,
            format!("body of {} bytes exceeds limit of {} bytes", len, self.max_bytes),
        )
    }
}

fn classify(e: reqwest::Error, url: &str) -> IngestError {
    if e.is_timeout() {
        warn!("Download timed out: {}", url);
        IngestError::new(IngestErrorKind::Timeout, format!("timed out fetching {}", url))
    } else {
        warn!("Download error for {}: {}", url, e);
        IngestError::new(IngestErrorKind::Transport, e.to_string())
    }
}
