//! Integration tests for the directory-backed callback store.
//!
//! Every test works in its own temporary directory with a frozen clock.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use assert_matches::assert_matches;
use hookecho_core::clock::FixedClock;
use hookecho_core::record::{CallbackRecord, RecordKey};
use hookecho_store::{CallbackStore, FileCallbackStore, StoreError};
use serde_json::json;
use tempfile::TempDir;

const FROZEN_MS: i64 = 1_704_072_225_000;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn new_store() -> (TempDir, Arc<FixedClock>, FileCallbackStore) {
    let dir = tempfile::tempdir().unwrap();
    let clock = Arc::new(FixedClock::new(FROZEN_MS));
    let store = FileCallbackStore::new(dir.path(), clock.clone());
    (dir, clock, store)
}

fn record(body: serde_json::Value) -> CallbackRecord {
    CallbackRecord {
        url: "/api/callback".to_string(),
        headers: BTreeMap::from([(
            "content-type".to_string(),
            "application/json".to_string(),
        )]),
        body,
    }
}

// ---------------------------------------------------------------------------
// Write path
// ---------------------------------------------------------------------------

#[tokio::test]
async fn put_writes_named_file_with_record_content() {
    let (dir, _clock, store) = new_store();

    let key = store.put("abc123", &record(json!({"k1": "v1"}))).await.unwrap();

    assert_eq!(key.file_name(), format!("{FROZEN_MS}_abc123.json"));
    let written = std::fs::read_to_string(dir.path().join(key.file_name())).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&written).unwrap();
    assert_eq!(parsed["url"], "/api/callback");
    assert_eq!(parsed["headers"]["content-type"], "application/json");
    assert_eq!(parsed["body"], json!({"k1": "v1"}));
}

#[tokio::test]
async fn same_millisecond_same_id_never_overwrites() {
    let (dir, _clock, store) = new_store();

    let first = store.put("dup", &record(json!({"n": 1}))).await.unwrap();
    let second = store.put("dup", &record(json!({"n": 2}))).await.unwrap();

    assert_eq!(first, RecordKey::new(FROZEN_MS, "dup"));
    assert_eq!(second, RecordKey::new(FROZEN_MS + 1, "dup"));
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 2);
}

#[tokio::test]
async fn concurrent_writes_with_same_id_are_all_kept() {
    let (_dir, _clock, store) = new_store();
    let store = Arc::new(store);

    let handles: Vec<_> = (0..20)
        .map(|n| {
            let store = Arc::clone(&store);
            tokio::spawn(async move { store.put("burst", &record(json!({"n": n}))).await })
        })
        .collect();

    let mut names = HashSet::new();
    for handle in handles {
        let key = handle.await.unwrap().unwrap();
        names.insert(key.file_name());
    }
    assert_eq!(names.len(), 20);

    let stored = store.query_by_correlation("burst").await.unwrap();
    assert_eq!(stored.len(), 20);
    let bodies: HashSet<i64> = stored
        .iter()
        .map(|r| r.data["body"]["n"].as_i64().unwrap())
        .collect();
    assert_eq!(bodies, (0..20).collect());
}

#[tokio::test]
async fn different_ids_in_same_millisecond_keep_timestamp() {
    let (_dir, _clock, store) = new_store();

    let a = store.put("a", &record(json!({}))).await.unwrap();
    let b = store.put("b", &record(json!({}))).await.unwrap();

    assert_eq!(a.timestamp_millis, FROZEN_MS);
    assert_eq!(b.timestamp_millis, FROZEN_MS);
}

#[tokio::test]
async fn put_into_missing_directory_fails_with_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileCallbackStore::new(
        dir.path().join("does-not-exist"),
        Arc::new(FixedClock::new(FROZEN_MS)),
    );

    let result = store.put("x", &record(json!({}))).await;

    assert_matches!(result, Err(StoreError::Io(_)));
}

#[tokio::test]
async fn put_leaves_only_the_published_record() {
    let (dir, _clock, store) = new_store();

    store.put("abc", &record(json!({"k": "v"}))).await.unwrap();
    store.put("abc", &record(json!({"k": "w"}))).await.unwrap();

    let mut names: Vec<String> = std::fs::read_dir(dir.path())
        .unwrap()
        .map(|entry| entry.unwrap().file_name().into_string().unwrap())
        .collect();
    names.sort();
    assert_eq!(
        names,
        vec![
            format!("{FROZEN_MS}_abc.json"),
            format!("{}_abc.json", FROZEN_MS + 1),
        ]
    );
}

#[tokio::test]
async fn failed_publish_leaves_nothing_behind() {
    let (dir, _clock, store) = new_store();
    let unnameable = "a".repeat(300);

    let result = store.put(&unnameable, &record(json!({"n": 1}))).await;

    assert_matches!(result, Err(StoreError::Io(_)));
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    assert!(store.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn listed_records_are_always_complete() {
    let (_dir, _clock, store) = new_store();
    let store = Arc::new(store);
    let big = json!({"blob": "x".repeat(256 * 1024)});

    let writers: Vec<_> = (0..8)
        .map(|n| {
            let store = Arc::clone(&store);
            let body = big.clone();
            tokio::spawn(async move { store.put(&format!("w{n}"), &record(body)).await })
        })
        .collect();

    for _ in 0..8 {
        for key in store.list().await.unwrap() {
            let stored = store
                .query_by_correlation(&key.correlation_id)
                .await
                .unwrap();
            assert_eq!(stored.len(), 1, "{} listed but unreadable", key.file_name());
        }
        tokio::task::yield_now().await;
    }

    for writer in writers {
        writer.await.unwrap().unwrap();
    }
    assert_eq!(store.list().await.unwrap().len(), 8);
}

#[tokio::test]
async fn ensure_dir_creates_nested_directory() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileCallbackStore::new(
        dir.path().join("a/b/callbacks"),
        Arc::new(FixedClock::new(FROZEN_MS)),
    );

    store.ensure_dir().await.unwrap();

    store.health_check().await.unwrap();
    store.put("x", &record(json!({}))).await.unwrap();
}

// ---------------------------------------------------------------------------
// Query path
// ---------------------------------------------------------------------------

#[tokio::test]
async fn list_ignores_housekeeping_files_and_sorts_by_timestamp() {
    let (dir, clock, store) = new_store();
    std::fs::write(dir.path().join(".gitkeep"), "").unwrap();
    std::fs::write(dir.path().join("README.txt"), "notes").unwrap();
    std::fs::create_dir(dir.path().join("123_subdir.json")).unwrap();

    clock.set(FROZEN_MS + 2_000);
    store.put("late", &record(json!({}))).await.unwrap();
    clock.set(FROZEN_MS);
    store.put("early", &record(json!({}))).await.unwrap();
    clock.set(FROZEN_MS + 1_000);
    store.put("middle", &record(json!({}))).await.unwrap();

    let ids: Vec<String> = store
        .list()
        .await
        .unwrap()
        .into_iter()
        .map(|k| k.correlation_id)
        .collect();

    assert_eq!(ids, vec!["early", "middle", "late"]);
}

#[tokio::test]
async fn query_returns_only_exact_matches() {
    let (_dir, clock, store) = new_store();
    store.put("abc123", &record(json!({"k1": "v1"}))).await.unwrap();
    clock.advance(10);
    store.put("abc1234", &record(json!({}))).await.unwrap();
    store.put("empty", &record(json!({}))).await.unwrap();

    let records = store.query_by_correlation("abc123").await.unwrap();

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].key, RecordKey::new(FROZEN_MS, "abc123"));
    assert_eq!(records[0].data["body"], json!({"k1": "v1"}));
}

#[tokio::test]
async fn query_without_matches_is_empty() {
    let (_dir, _clock, store) = new_store();
    store.put("something", &record(json!({}))).await.unwrap();

    let records = store.query_by_correlation("doesnotexist").await.unwrap();

    assert!(records.is_empty());
}

#[tokio::test]
async fn query_skips_corrupt_records() {
    let (dir, clock, store) = new_store();
    std::fs::write(dir.path().join(format!("{}_abc.json", FROZEN_MS - 1)), "{not json").unwrap();
    store.put("abc", &record(json!({"ok": true}))).await.unwrap();
    clock.advance(1);

    let records = store.query_by_correlation("abc").await.unwrap();

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].data["body"]["ok"], true);
}

#[tokio::test]
async fn health_check_fails_for_missing_directory() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileCallbackStore::new(dir.path().join("nope"), Arc::new(FixedClock::new(0)));

    assert!(store.health_check().await.is_err());
}
