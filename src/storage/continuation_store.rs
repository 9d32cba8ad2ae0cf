// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Fingerprint-keyed continuation cache
//!
//! Exactly one record may exist per fingerprint. The guarantee comes from the
//! PRIMARY KEY on `hash_id`; a losing writer hits the constraint and is told
//! the record already exists. Nothing is cached in process.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use rusqlite::{params, Connection, ErrorCode, OptionalExtension};
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

use super::payload::ContinuationPayload;
use crate::fingerprint::Fingerprint;

/// How long a writer waits on another process holding the database lock
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Layout SQLite uses for `CURRENT_TIMESTAMP`
const SQLITE_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("continuation store unavailable: {0}")]
    Unavailable(String),

    #[error("continuation store is closed")]
    Closed,
}

impl StoreError {
    /// Whether the caller may retry the same operation later
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Unavailable(_) | Self::Closed)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(e: rusqlite::Error) -> Self {
        Self::Unavailable(e.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContinuationRecord {
    pub fingerprint: Fingerprint,
    pub response: ContinuationPayload,
    /// Locator of the scene image, if one was generated
    pub image_reference: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl ContinuationRecord {
    /// Empty image references are treated as absent
    pub fn new(
        fingerprint: Fingerprint,
        response: impl Into<String>,
        image_reference: Option<String>,
    ) -> Self {
        Self {
            fingerprint,
            response: ContinuationPayload::parse(response),
            image_reference: image_reference.filter(|r| !r.is_empty()),
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PutOutcome {
    Created,
    AlreadyExists,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ContinuationStats {
    pub total_continuations: u64,
    pub continuations_with_images: u64,
    pub database_size_bytes: u64,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ContinuationStore: Send + Sync {
    /// Point lookup. A miss is `Ok(None)`.
    async fn get(&self, fingerprint: Fingerprint) -> Result<Option<ContinuationRecord>, StoreError>;

    /// Store `record` unless one already exists for its fingerprint.
    async fn put_if_absent(&self, record: ContinuationRecord) -> Result<PutOutcome, StoreError>;

    async fn stats(&self) -> Result<ContinuationStats, StoreError>;

    /// Release the backing connection. Later calls fail with [`StoreError::Closed`].
    async fn close(&self) -> Result<(), StoreError>;
}

/// SQLite-backed continuation store
///
/// Holds one connection for the life of the process. Separate processes may
/// open the same file; the busy timeout makes them queue on SQLite's lock.
#[derive(Clone)]
pub struct SqliteContinuationStore {
    conn: Arc<Mutex<Option<Connection>>>,
}

impl SqliteContinuationStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let conn = Connection::open(path.as_ref())?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        Self::init(conn)
    }

    /// In-memory database, private to this handle
    pub fn in_memory() -> Result<Self, StoreError> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS continuations (
                hash_id TEXT PRIMARY KEY,
                response TEXT NOT NULL,
                image_url TEXT,
                created_at TEXT NOT NULL
            );
            "#,
        )?;
        info!("Continuation store initialized");
        Ok(Self {
            conn: Arc::new(Mutex::new(Some(conn))),
        })
    }

    async fn with_conn<T, F>(&self, f: F) -> Result<T, StoreError>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> Result<T, StoreError> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let guard = conn
                .lock()
                .map_err(|_| StoreError::Unavailable("connection lock poisoned".to_string()))?;
            let conn = guard.as_ref().ok_or(StoreError::Closed)?;
            f(conn)
        })
        .await
        .map_err(|e| StoreError::Unavailable(format!("storage task failed: {}", e)))?
    }
}

/// Timestamps are RFC 3339, or SQLite's `CURRENT_TIMESTAMP` form in UTC
fn parse_created_at(text: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(text) {
        return Some(ts.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(text, SQLITE_TIMESTAMP_FORMAT)
        .ok()
        .map(|ts| ts.and_utc())
}

fn is_unique_violation(e: &rusqlite::Error) -> bool {
    matches!(
        e,
        rusqlite::Error::SqliteFailure(err, _) if err.code == ErrorCode::ConstraintViolation
    )
}

#[async_trait]
impl ContinuationStore for SqliteContinuationStore {
    async fn get(&self, fingerprint: Fingerprint) -> Result<Option<ContinuationRecord>, StoreError> {
        let key = fingerprint.to_hex();
        let row = self
            .with_conn(move |conn| {
                conn.query_row(
                    "SELECT response, image_url, created_at FROM continuations WHERE hash_id = ?1",
                    params![key],
                    |row| {
                        Ok((
                            row.get::<_, String>(0)?,
                            row.get::<_, Option<String>>(1)?,
                            row.get::<_, Option<String>>(2)?,
                        ))
                    },
                )
                .optional()
                .map_err(StoreError::from)
            })
            .await?;

        let Some((response, image_url, created_at)) = row else {
            debug!("Continuation not found: {}", fingerprint);
            return Ok(None);
        };

        let created_at = created_at
            .as_deref()
            .and_then(parse_created_at)
            .unwrap_or_else(|| {
                warn!(
                    "Continuation {} has unreadable created_at {:?}, using current time",
                    fingerprint, created_at
                );
                Utc::now()
            });

        debug!("Retrieved continuation: {}", fingerprint);
        Ok(Some(ContinuationRecord {
            fingerprint,
            response: ContinuationPayload::parse(response),
            image_reference: image_url.filter(|u| !u.is_empty()),
            created_at,
        }))
    }

    async fn put_if_absent(&self, record: ContinuationRecord) -> Result<PutOutcome, StoreError> {
        let fingerprint = record.fingerprint;
        let key = fingerprint.to_hex();
        let created_at = record.created_at.to_rfc3339();
        let image_url = record.image_reference;
        let response = record.response.into_raw();

        let outcome = self
            .with_conn(move |conn| {
                match conn.execute(
                    "INSERT INTO continuations (hash_id, response, image_url, created_at) VALUES (?1, ?2, ?3, ?4)",
                    params![key, response, image_url, created_at],
                ) {
                    Ok(_) => Ok(PutOutcome::Created),
                    Err(e) if is_unique_violation(&e) => Ok(PutOutcome::AlreadyExists),
                    Err(e) => Err(StoreError::from(e)),
                }
            })
            .await?;

        match outcome {
            PutOutcome::Created => info!("Stored new continuation: {}", fingerprint),
            PutOutcome::AlreadyExists => info!("Continuation already exists: {}", fingerprint),
        }
        Ok(outcome)
    }

    async fn stats(&self) -> Result<ContinuationStats, StoreError> {
        self.with_conn(|conn| {
            let total: i64 =
                conn.query_row("SELECT COUNT(*) FROM continuations", [], |row| row.get(0))?;
            let with_images: i64 = conn.query_row(
                "SELECT COUNT(*) FROM continuations WHERE image_url IS NOT NULL AND image_url != ''",
                [],
                |row| row.get(0),
            )?;
            let size: i64 = conn.query_row(
                "SELECT page_count * page_size FROM pragma_page_count(), pragma_page_size()",
                [],
                |row| row.get(0),
            )?;
            Ok(ContinuationStats {
                total_continuations: total.max(0) as u64,
                continuations_with_images: with_images.max(0) as u64,
                database_size_bytes: size.max(0) as u64,
            })
        })
        .await
    }

    async fn close(&self) -> Result<(), StoreError> {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let mut guard = conn
                .lock()
                .map_err(|_| StoreError::Unavailable("connection lock poisoned".to_string()))?;
            if let Some(conn) = guard.take() {
                conn.close().map_err(|(_, e)| StoreError::from(e))?;
                info!("Continuation store closed");
            }
            Ok(())
        })
        .await
        .map_err(|e| StoreError::Unavailable(format!("storage task failed: {}", e)))?
    }
}
