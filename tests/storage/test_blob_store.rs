// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Filesystem blob store through the public trait

use bytes::Bytes;
use fabstir_adventure_cache::storage::{BlobStore, BlobStoreError, FsBlobStore};
use futures_util::{stream, StreamExt};
use std::collections::HashMap;
use std::io;
use tempfile::TempDir;

async fn read_all(store: &FsBlobStore, id: &str) -> Vec<u8> {
    let reader = store.open_read_stream(id).await.unwrap();
    let mut out = Vec::new();
    let mut stream = reader.stream;
    while let Some(chunk) = stream.next().await {
        out.extend_from_slice(&chunk.unwrap());
    }
    out
}

#[tokio::test]
async fn test_objects_survive_reopen() {
    let dir = TempDir::new().unwrap();
    let mut metadata = HashMap::new();
    metadata.insert("original_url".to_string(), "https://example.com/a.png".to_string());

    let id = {
        let store = FsBlobStore::open(dir.path()).await.unwrap();
        store
            .create(Bytes::from_static(b"jpeg bytes"), "image/jpeg", metadata.clone())
            .await
            .unwrap()
    };

    let store = FsBlobStore::open(dir.path()).await.unwrap();
    let reader = store.open_read_stream(&id.to_string()).await.unwrap();
    assert_eq!(reader.info.content_type, "image/jpeg");
    assert_eq!(reader.info.size, 10);
    assert_eq!(reader.info.metadata, metadata);
    assert_eq!(read_all(&store, &id.to_string()).await, b"jpeg bytes");
}

#[tokio::test]
async fn test_multi_chunk_stream_written_in_order() {
    let dir = TempDir::new().unwrap();
    let store = FsBlobStore::open(dir.path()).await.unwrap();

    let parts: Vec<io::Result<Bytes>> = (0u8..10)
        .map(|i| Ok(Bytes::from(vec![i; 1000])))
        .collect();
    let id = store
        .create_from_stream(stream::iter(parts).boxed(), "application/octet-stream", HashMap::new())
        .await
        .unwrap();

    let data = read_all(&store, &id.to_string()).await;
    assert_eq!(data.len(), 10_000);
    assert_eq!(data[0], 0);
    assert_eq!(data[9_999], 9);
}

#[tokio::test]
async fn test_concurrent_creates_are_independent() {
    let dir = TempDir::new().unwrap();
    let store = FsBlobStore::open(dir.path()).await.unwrap();

    let (a, b) = tokio::join!(
        store.create(Bytes::from_static(b"a"), "image/jpeg", HashMap::new()),
        store.create(Bytes::from_static(b"b"), "image/jpeg", HashMap::new()),
    );
    let (a, b) = (a.unwrap(), b.unwrap());
    assert_ne!(a, b);
    assert_eq!(read_all(&store, &a.to_string()).await, b"a");
    assert_eq!(read_all(&store, &b.to_string()).await, b"b");
}

#[tokio::test]
async fn test_path_like_ids_are_not_found() {
    let dir = TempDir::new().unwrap();
    let store = FsBlobStore::open(dir.path().join("blobs")).await.unwrap();
    tokio::fs::write(dir.path().join("secret.bin"), b"nope").await.unwrap();

    for id in ["../secret", "", "/etc/passwd"] {
        let err = store.open_read_stream(id).await.unwrap_err();
        assert!(matches!(err, BlobStoreError::NotFound(_)), "id {:?}", id);
    }
}
