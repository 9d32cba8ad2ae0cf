// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Typed failures for the image ingestion pipeline

use std::fmt;
use thiserror::Error;

use crate::storage::BlobStoreError;

/// Pipeline stage at which a failure happened
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestStage {
    Fetch,
    Transcode,
    Persist,
}

impl fmt::Display for IngestStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fetch => write!(f, "fetch"),
            Self::Transcode => write!(f, "transcode"),
            Self::Persist => write!(f, "persist"),
        }
    }
}

/// What went wrong, decided where it went wrong
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestErrorKind {
    /// Source URL unparseable or not http(s)
    InvalidUrl,
    /// Fetch exceeded its deadline
    Timeout,
    /// Connection or protocol failure talking to the source
    Transport,
    /// Source answered with a non-success status
    HttpStatus(u16),
    /// Source body exceeded the configured cap
    TooLarge,
    /// Bytes are not a decodable image
    Decode,
    /// Re-encoding failed
    Encode,
    /// Blob store rejected the write
    Storage,
}

impl IngestErrorKind {
    pub fn stage(&self) -> IngestStage {
        match self {
            Self::InvalidUrl
            | Self::Timeout
            | Self::Transport
            | Self::HttpStatus(_)
            | Self::TooLarge => IngestStage::Fetch,
            Self::Decode | Self::Encode => IngestStage::Transcode,
            Self::Storage => IngestStage::Persist,
        }
    }

    /// Failures caused by the image source rather than our own storage
    pub fn is_upstream(&self) -> bool {
        !matches!(self, Self::Storage)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidUrl => "invalid_url",
            Self::Timeout => "timeout",
            Self::Transport => "transport",
            Self::HttpStatus(_) => "http_status",
            Self::TooLarge => "too_large",
            Self::Decode => "decode",
            Self::Encode => "encode",
            Self::Storage => "storage",
        }
    }
}

#[derive(Debug, Clone, Error)]
#[error("image {} failed ({}): {message}", .kind.stage(), .kind.as_str())]
pub struct IngestError {
    pub kind: IngestErrorKind,
    pub message: String,
}

impl IngestError {
    pub fn new(kind: IngestErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn stage(&self) -> IngestStage {
        self.kind.stage()
    }
}

impl From<BlobStoreError> for IngestError {
    fn from(e: BlobStoreError) -> Self {
        Self::new(IngestErrorKind::Storage, e.to_string())
    }
}
