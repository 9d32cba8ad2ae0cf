// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Server configuration
//!
//! Defaults, environment overrides and validation for the cache server.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use crate::ingest::TranscodeConfig;

/// Default cap on a downloaded source image (20 MiB)
pub const DEFAULT_MAX_IMAGE_BYTES: usize = 20 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Interface to bind (default: 0.0.0.0)
    pub host: String,
    /// Listen port (default: 5000)
    pub port: u16,
    /// SQLite file holding continuations (default: continuations.db)
    pub database_path: PathBuf,
    /// Directory holding image blobs (default: blobs)
    pub blob_dir: PathBuf,
    /// Hard deadline for an image download in seconds (default: 30)
    pub fetch_timeout_secs: u64,
    /// Largest accepted source image body (default: 20 MiB)
    pub max_image_bytes: usize,
    /// Longest edge of a stored image (default: 512)
    pub max_image_dimension: u32,
    /// JPEG quality of stored images (default: 80)
    pub jpeg_quality: u8,
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            host: env::var("HOST").unwrap_or(defaults.host),
            port: env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.port),
            database_path: env::var("DATABASE_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.database_path),
            blob_dir: env::var("BLOB_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.blob_dir),
            fetch_timeout_secs: env::var("FETCH_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.fetch_timeout_secs),
            max_image_bytes: env::var("MAX_IMAGE_BYTES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.max_image_bytes),
            max_image_dimension: env::var("MAX_IMAGE_DIMENSION")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.max_image_dimension),
            jpeg_quality: env::var("JPEG_QUALITY")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.jpeg_quality),
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), String> {
        if self.fetch_timeout_secs == 0 {
            return Err("fetch_timeout_secs must be at least 1".to_string());
        }
        if self.max_image_bytes == 0 {
            return Err("max_image_bytes must be at least 1".to_string());
        }
        let ceiling = TranscodeConfig::default().max_dimension;
        if self.max_image_dimension == 0 || self.max_image_dimension > ceiling {
            return Err(format!(
                "max_image_dimension must be between 1 and {}, got {}",
                ceiling, self.max_image_dimension
            ));
        }
        if self.jpeg_quality == 0 || self.jpeg_quality > 100 {
            return Err(format!(
                "jpeg_quality must be between 1 and 100, got {}",
                self.jpeg_quality
            ));
        }
        self.bind_addr()?;
        Ok(())
    }

    pub fn bind_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| format!("invalid bind address {}:{}: {}", self.host, self.port, e))
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    pub fn transcode(&self) -> TranscodeConfig {
        TranscodeConfig {
            max_dimension: self.max_image_dimension,
            jpeg_quality: self.jpeg_quality,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            database_path: PathBuf::from("continuations.db"),
            blob_dir: PathBuf::from("blobs"),
            fetch_timeout_secs: 30,
            max_image_bytes: DEFAULT_MAX_IMAGE_BYTES,
            max_image_dimension: 512,
            jpeg_quality: 80,
        }
    }
}
