// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Immutable blob storage with streamed reads and writes
//!
//! Objects are written once under a fresh id and never modified. Reads hand
//! back a byte stream so large objects are never buffered whole.

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use futures::stream::{self, BoxStream, StreamExt};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio_util::io::ReaderStream;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Chunk size used when streaming an in-memory buffer into the store
pub const WRITE_CHUNK_SIZE: usize = 64 * 1024;

pub type ByteStream = BoxStream<'static, io::Result<Bytes>>;

#[derive(Debug, Error)]
pub enum BlobStoreError {
    #[error("blob not found: {0}")]
    NotFound(String),

    #[error("blob storage I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("invalid blob metadata for {id}: {reason}")]
    Metadata { id: String, reason: String },
}

impl BlobStoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

/// Store-generated object identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlobId(Uuid);

impl BlobId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for BlobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.as_hyphenated())
    }
}

impl FromStr for BlobId {
    type Err = BlobStoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s)
            .map(Self)
            .map_err(|_| BlobStoreError::NotFound(s.to_string()))
    }
}

/// Everything known about a stored object except its bytes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlobInfo {
    pub id: BlobId,
    pub content_type: String,
    pub size: u64,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

pub struct BlobReader {
    pub info: BlobInfo,
    pub stream: ByteStream,
}

impl fmt::Debug for BlobReader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BlobReader")
            .field("info", &self.info)
            .finish_non_exhaustive()
    }
}

#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Persist a stream of bytes as a new immutable object
    async fn create_from_stream(
        &self,
        stream: ByteStream,
        content_type: &str,
        metadata: HashMap<String, String>,
    ) -> Result<BlobId, BlobStoreError>;

    /// Open an object for streamed reading. Unknown or malformed ids are
    /// [`BlobStoreError::NotFound`].
    async fn open_read_stream(&self, id: &str) -> Result<BlobReader, BlobStoreError>;

    async fn create(
        &self,
        bytes: Bytes,
        content_type: &str,
        metadata: HashMap<String, String>,
    ) -> Result<BlobId, BlobStoreError> {
        self.create_from_stream(chunked(bytes), content_type, metadata)
            .await
    }
}

/// Split a buffer into [`WRITE_CHUNK_SIZE`] pieces without copying
pub fn chunked(bytes: Bytes) -> ByteStream {
    let len = bytes.len();
    let chunks: Vec<io::Result<Bytes>> = (0..len)
        .step_by(WRITE_CHUNK_SIZE)
        .map(|start| Ok(bytes.slice(start..(start + WRITE_CHUNK_SIZE).min(len))))
        .collect();
    stream::iter(chunks).boxed()
}

/// Filesystem blob store
///
/// Layout: `<root>/<id>.bin` holds the bytes, `<root>/<id>.json` the
/// [`BlobInfo`]. Both are written to hidden temp files first. The sidecar is
/// renamed into place before the data file, so an object is only visible once
/// it is complete. A failed write removes whatever it had already placed.
#[derive(Debug, Clone)]
pub struct FsBlobStore {
    root: PathBuf,
}

impl FsBlobStore {
    pub async fn open(root: impl Into<PathBuf>) -> Result<Self, BlobStoreError> {
        let root = root.into();
        fs::create_dir_all(&root).await?;
        info!("Blob store opened at {}", root.display());
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn data_path(&self, id: &BlobId) -> PathBuf {
        self.root.join(format!("{}.bin", id))
    }

    fn info_path(&self, id: &BlobId) -> PathBuf {
        self.root.join(format!("{}.json", id))
    }

    fn temp_path(&self, id: &BlobId, ext: &str) -> PathBuf {
        self.root.join(format!(".{}.{}.tmp", id, ext))
    }

    async fn write_object(
        &self,
        id: BlobId,
        mut stream: ByteStream,
        content_type: &str,
        metadata: HashMap<String, String>,
    ) -> Result<(), BlobStoreError> {
        let data_tmp = self.temp_path(&id, "bin");
        let info_tmp = self.temp_path(&id, "json");

        let mut file = fs::File::create(&data_tmp).await?;
        let mut size: u64 = 0;
        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            file.write_all(&chunk).await?;
            size += chunk.len() as u64;
        }
        file.sync_all().await?;
        drop(file);

        let info = BlobInfo {
            id,
            content_type: content_type.to_string(),
            size,
            created_at: Utc::now(),
            metadata,
        };
        let json = serde_json::to_vec(&info).map_err(|e| BlobStoreError::Metadata {
            id: id.to_string(),
            reason: e.to_string(),
        })?;
        let mut info_file = fs::File::create(&info_tmp).await?;
        info_file.write_all(&json).await?;
        info_file.sync_all().await?;
        drop(info_file);

        fs::rename(&info_tmp, self.info_path(&id)).await?;
        fs::rename(&data_tmp, self.data_path(&id)).await?;

        debug!("Blob {} written: {} bytes", id, size);
        Ok(())
    }

    async fn discard(&self, id: &BlobId) {
        for path in [
            self.temp_path(id, "bin"),
            self.temp_path(id, "json"),
            self.info_path(id),
            self.data_path(id),
        ] {
            match fs::remove_file(&path).await {
                Ok(()) => debug!("Removed partial blob file {}", path.display()),
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => warn!("Failed to remove {}: {}", path.display(), e),
            }
        }
    }
}

#[async_trait]
impl BlobStore for FsBlobStore {
    async fn create_from_stream(
        &self,
        stream: ByteStream,
        content_type: &str,
        metadata: HashMap<String, String>,
    ) -> Result<BlobId, BlobStoreError> {
        let id = BlobId::generate();
        if let Err(e) = self.write_object(id, stream, content_type, metadata).await {
            warn!("Blob write {} failed, rolling back: {}", id, e);
            self.discard(&id).await;
            return Err(e);
        }
        info!("Blob stored with ID: {}", id);
        Ok(id)
    }

    async fn open_read_stream(&self, id: &str) -> Result<BlobReader, BlobStoreError> {
        let blob_id: BlobId = id.parse()?;
        let not_found = |e: io::Error| {
            if e.kind() == io::ErrorKind::NotFound {
                BlobStoreError::NotFound(id.to_string())
            } else {
                BlobStoreError::Io(e)
            }
        };

        // Data file is renamed last, so its presence means the object is complete
        let file = fs::File::open(self.data_path(&blob_id))
            .await
            .map_err(not_found)?;
        let json = fs::read(self.info_path(&blob_id)).await.map_err(not_found)?;
        let info: BlobInfo =
            serde_json::from_slice(&json).map_err(|e| BlobStoreError::Metadata {
                id: id.to_string(),
                reason: e.to_string(),
            })?;

        debug!("Opened blob {} ({} bytes)", blob_id, info.size);
        Ok(BlobReader {
            info,
            stream: ReaderStream::new(file).boxed(),
        })
    }
}
