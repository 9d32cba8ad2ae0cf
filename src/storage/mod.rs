// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod blob_store;
pub mod continuation_store;
pub mod payload;

// Re-export main types for convenience
pub use blob_store::{
    chunked, BlobId, BlobInfo, BlobReader, BlobStore, BlobStoreError, ByteStream, FsBlobStore,
    WRITE_CHUNK_SIZE,
};

pub use continuation_store::{
    ContinuationRecord, ContinuationStats, ContinuationStore, PutOutcome,
    SqliteContinuationStore, StoreError,
};

#[cfg(test)]
pub use continuation_store::MockContinuationStore;

pub use payload::{ContinuationPayload, NarrativePayload};
