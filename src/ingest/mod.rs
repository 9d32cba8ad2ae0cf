// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Image ingestion
//!
//! Turns a transient upstream image URL into a stored, bounded JPEG blob.

pub mod errors;
pub mod fetcher;
pub mod pipeline;
pub mod transcode;

pub use errors::{IngestError, IngestErrorKind, IngestStage};
pub use fetcher::ImageFetcher;
pub use pipeline::{
    BlobLocator, ImageIngestionPipeline, IMAGE_FILE_ROUTE, META_CREATED_AT, META_ORIGINAL_URL,
};
pub use transcode::{
    bounded_dimensions, transcode, TranscodeConfig, TranscodedImage, TRANSCODED_CONTENT_TYPE,
};
