// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! File-backed continuation store behavior
//!
//! Exercises persistence across reopen and two handles racing on one file,
//! which is what two server processes sharing a database look like.

use fabstir_adventure_cache::fingerprint::{ConversationState, Fingerprint};
use fabstir_adventure_cache::storage::{
    ContinuationRecord, ContinuationStore, PutOutcome, SqliteContinuationStore,
};
use tempfile::TempDir;

fn fp(hex: &str) -> Fingerprint {
    hex.parse().unwrap()
}

#[tokio::test]
async fn test_records_survive_reopen() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("continuations.db");

    let store = SqliteContinuationStore::open(&path).unwrap();
    let record = ContinuationRecord::new(
        fp("4f62b08e429527f8"),
        r#"{"story_text":"A door creaks."}"#,
        Some("/images/file/abc".to_string()),
    );
    let created_at = record.created_at;
    assert_eq!(store.put_if_absent(record).await.unwrap(), PutOutcome::Created);
    store.close().await.unwrap();

    let reopened = SqliteContinuationStore::open(&path).unwrap();
    let got = reopened
        .get(fp("4f62b08e429527f8"))
        .await
        .unwrap()
        .expect("record persisted");
    assert_eq!(got.response.raw(), r#"{"story_text":"A door creaks."}"#);
    assert_eq!(got.image_reference.as_deref(), Some("/images/file/abc"));
    assert_eq!(got.created_at, created_at);
}

#[tokio::test]
async fn test_concurrent_writers_first_wins() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("continuations.db");
    let a = SqliteContinuationStore::open(&path).unwrap();
    let b = SqliteContinuationStore::open(&path).unwrap();

    let hash = ConversationState::new(vec![], vec!["look around".to_string()]).fingerprint();
    let (ra, rb) = tokio::join!(
        a.put_if_absent(ContinuationRecord::new(hash, "from a", None)),
        b.put_if_absent(ContinuationRecord::new(hash, "from b", None)),
    );
    let (ra, rb) = (ra.unwrap(), rb.unwrap());

    let winner = match (ra, rb) {
        (PutOutcome::Created, PutOutcome::AlreadyExists) => "from a",
        (PutOutcome::AlreadyExists, PutOutcome::Created) => "from b",
        other => panic!("expected exactly one winner, got {:?}", other),
    };

    for store in [&a, &b] {
        let got = store.get(hash).await.unwrap().unwrap();
        assert_eq!(got.response.raw(), winner);
    }
}

#[tokio::test]
async fn test_many_writers_one_record() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("continuations.db");
    let store = SqliteContinuationStore::open(&path).unwrap();
    let hash = fp("fdcd24b5fe7c12d8");

    let mut handles = Vec::new();
    for i in 0..8 {
        let store = store.clone();
        handles.push(tokio::spawn(async move {
            store
                .put_if_absent(ContinuationRecord::new(hash, format!("writer {}", i), None))
                .await
        }));
    }

    let mut created = 0;
    for handle in handles {
        if handle.await.unwrap().unwrap() == PutOutcome::Created {
            created += 1;
        }
    }
    assert_eq!(created, 1);
    assert_eq!(store.stats().await.unwrap().total_continuations, 1);
}

#[tokio::test]
async fn test_stats_report_file_size() {
    let dir = TempDir::new().unwrap();
    let store = SqliteContinuationStore::open(dir.path().join("continuations.db")).unwrap();
    store
        .put_if_absent(ContinuationRecord::new(fp("0000000000000001"), "x", None))
        .await
        .unwrap();

    let stats = store.stats().await.unwrap();
    assert_eq!(stats.total_continuations, 1);
    assert_eq!(stats.continuations_with_images, 0);
    assert!(stats.database_size_bytes >= 4096);
}

#[tokio::test]
async fn test_reads_rows_with_sqlite_default_timestamp() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("continuations.db");
    {
        let conn = rusqlite::Connection::open(&path).unwrap();
        conn.execute_batch(
            r#"
            CREATE TABLE continuations (
                hash_id TEXT PRIMARY KEY,
                response TEXT NOT NULL,
                image_url TEXT,
                created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
            );
            INSERT INTO continuations (hash_id, response, image_url)
                VALUES ('4f62b08e429527f8', '{"story_text":"Old save."}', '/images/file/old');
            "#,
        )
        .unwrap();
    }

    let store = SqliteContinuationStore::open(&path).unwrap();
    let got = store
        .get(fp("4f62b08e429527f8"))
        .await
        .unwrap()
        .expect("existing row readable");
    assert_eq!(got.response.raw(), r#"{"story_text":"Old save."}"#);
    assert_eq!(got.image_reference.as_deref(), Some("/images/file/old"));
    assert!(got.created_at <= chrono::Utc::now());

    assert_eq!(
        store
            .put_if_absent(ContinuationRecord::new(fp("4f62b08e429527f8"), "new", None))
            .await
            .unwrap(),
        PutOutcome::AlreadyExists
    );
}
