// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod api;
pub mod cli;
pub mod config;
pub mod fingerprint;
pub mod ingest;
pub mod storage;
pub mod version;

// Re-export main types
pub use api::{create_app, AppState};
pub use config::AppConfig;
pub use fingerprint::{ConversationState, Fingerprint};
pub use ingest::{BlobLocator, ImageIngestionPipeline, IngestError, IngestErrorKind};
pub use storage::{
    BlobStore, ContinuationPayload, ContinuationRecord, ContinuationStore, FsBlobStore,
    PutOutcome, SqliteContinuationStore,
};
