// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use clap::Parser;
use std::path::PathBuf;

use crate::config::AppConfig;

/// Fabstir adventure continuation cache and image store
#[derive(Parser, Debug, Default)]
#[command(name = "adventure-cache")]
#[command(version = crate::version::VERSION_NUMBER)]
#[command(about = "Continuation cache and image store for the adventure client", long_about = None)]
pub struct Cli {
    /// Interface to bind
    #[arg(long, env = "HOST")]
    pub host: Option<String>,

    /// Port to listen on
    #[arg(long, env = "PORT")]
    pub port: Option<u16>,

    /// SQLite database holding continuations
    #[arg(long, env = "DATABASE_PATH")]
    pub database_path: Option<PathBuf>,

    /// Directory holding stored images
    #[arg(long, env = "BLOB_DIR")]
    pub blob_dir: Option<PathBuf>,

    /// Image download deadline in seconds
    #[arg(long, env = "FETCH_TIMEOUT_SECS")]
    pub fetch_timeout_secs: Option<u64>,

    /// Largest accepted source image in bytes
    #[arg(long, env = "MAX_IMAGE_BYTES")]
    pub max_image_bytes: Option<usize>,

    /// Longest edge of a stored image in pixels
    #[arg(long, env = "MAX_IMAGE_DIMENSION")]
    pub max_image_dimension: Option<u32>,

    /// JPEG quality of stored images (1-100)
    #[arg(long, env = "JPEG_QUALITY")]
    pub jpeg_quality: Option<u8>,
}

impl Cli {
    /// Overlay command-line flags on top of `base`
    pub fn apply(self, base: AppConfig) -> AppConfig {
        AppConfig {
            host: self.host.unwrap_or(base.host),
            port: self.port.unwrap_or(base.port),
            database_path: self.database_path.unwrap_or(base.database_path),
            blob_dir: self.blob_dir.unwrap_or(base.blob_dir),
            fetch_timeout_secs: self.fetch_timeout_secs.unwrap_or(base.fetch_timeout_secs),
            max_image_bytes: self.max_image_bytes.unwrap_or(base.max_image_bytes),
            max_image_dimension: self.max_image_dimension.unwrap_or(base.max_image_dimension),
            jpeg_quality: self.jpeg_quality.unwrap_or(base.jpeg_quality),
        }
    }
}
