//! Download tests: failure isolation, bounded concurrency, persistence,
//! and prefix composition.

use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::time::Duration;

use bk_error::BkError;
use bk_reader::{BucketReader, OutputFormat, ReaderConfig};
use bytes::Bytes;

use crate::common::MemoryStore;

fn reader_with(store: MemoryStore, max_workers: usize) -> BucketReader<MemoryStore> {
    BucketReader::new(
        store,
        "bucket",
        ReaderConfig::new().with_max_workers(max_workers),
    )
}

#[tokio::test]
async fn test_failed_key_excluded_from_mapping() {
    let store = MemoryStore::new()
        .with_object("k1", "one")
        .with_object("k2", "two")
        .with_object("k3", "three")
        .with_object("k4", "four")
        .with_object("k5", "five")
        .with_failing_key("k3");
    let reader = reader_with(store, 16);

    let keys = (1..=5).map(|n| format!("k{n}")).collect();
    let batch = reader
        .download_by_keys(keys, OutputFormat::Bytes, None)
        .await;

    // Four successes; the failed key is reported, not raised.
    assert_eq!(batch.len(), 4);
    assert!(!batch.objects.contains_key("k3"));
    assert_eq!(batch.failures.len(), 1);
    assert_eq!(batch.failures[0].key, "k3");
    assert!(matches!(batch.failures[0].error, BkError::Fetch(_)));
}

#[tokio::test]
async fn test_missing_key_reported_not_found() {
    let store = MemoryStore::new().with_object("k1", "one");
    let reader = reader_with(store, 16);

    let batch = reader
        .download_by_keys(
            vec!["k1".to_string(), "absent".to_string()],
            OutputFormat::Bytes,
            None,
        )
        .await;

    assert_eq!(batch.len(), 1);
    assert_eq!(batch.failures.len(), 1);
    assert!(batch.failures[0].error.is_not_found());
}

#[tokio::test]
async fn test_concurrency_never_exceeds_cap() {
    let mut store = MemoryStore::new().with_fetch_delay(Duration::from_millis(5));
    for n in 0..50 {
        store = store.with_object(format!("k{n:02}"), "payload");
    }
    let metrics = Arc::clone(&store.metrics);
    let reader = reader_with(store, 16);

    let keys = (0..50).map(|n| format!("k{n:02}")).collect();
    let batch = reader
        .download_by_keys(keys, OutputFormat::Bytes, None)
        .await;

    assert_eq!(batch.len(), 50);
    assert!(batch.is_complete());
    assert!(metrics.peak_fetches() <= 16);
}

#[tokio::test]
async fn test_small_batch_spawns_no_spare_workers() {
    let store = MemoryStore::new()
        .with_fetch_delay(Duration::from_millis(5))
        .with_object("k1", "a")
        .with_object("k2", "b")
        .with_object("k3", "c");
    let metrics = Arc::clone(&store.metrics);
    let reader = reader_with(store, 16);

    let keys = (1..=3).map(|n| format!("k{n}")).collect();
    let batch = reader
        .download_by_keys(keys, OutputFormat::Bytes, None)
        .await;

    assert_eq!(batch.len(), 3);
    // Cap is min(16, 3): concurrency can never exceed the work count.
    assert!(metrics.peak_fetches() <= 3);
}

#[tokio::test]
async fn test_bytes_round_trip_through_disk() {
    let payload = Bytes::from_static(b"\x00\x01binary payload\xff");
    let store = MemoryStore::new().with_object("data/2024/blob.bin", payload.clone());
    let reader = reader_with(store, 16);
    let out = tempfile::tempdir().unwrap();

    let batch = reader
        .download_by_keys(
            vec!["data/2024/blob.bin".to_string()],
            OutputFormat::Bytes,
            Some(out.path()),
        )
        .await;

    assert!(batch.is_complete());
    assert_eq!(batch.bytes_fetched, payload.len() as u64);

    // The file lands under the output dir mirroring the key path.
    let written = std::fs::read(out.path().join("data/2024/blob.bin")).unwrap();
    assert_eq!(written, payload);
}

#[tokio::test]
async fn test_structured_payloads_parse() {
    let store = MemoryStore::new()
        .with_object("a.json", r#"{"name": "one", "n": 1}"#)
        .with_object("b.json", r#"not json"#);
    let reader = reader_with(store, 16);

    let batch = reader
        .download_by_keys(
            vec!["a.json".to_string(), "b.json".to_string()],
            OutputFormat::Structured,
            None,
        )
        .await;

    let value = batch.objects["a.json"].as_structured().unwrap();
    assert_eq!(value["n"], 1);

    assert_eq!(batch.failures.len(), 1);
    assert_eq!(batch.failures[0].key, "b.json");
    assert!(matches!(batch.failures[0].error, BkError::Parse(_)));
}

#[tokio::test]
async fn test_persist_failure_degrades_key() {
    let store = MemoryStore::new().with_object("data/blob", "payload");
    let reader = reader_with(store, 16);

    // A file where the output directory should be: create_dir_all fails.
    let out = tempfile::tempdir().unwrap();
    let blocker = out.path().join("data");
    std::fs::write(&blocker, b"in the way").unwrap();

    let batch = reader
        .download_by_keys(
            vec!["data/blob".to_string()],
            OutputFormat::Bytes,
            Some(out.path()),
        )
        .await;

    assert!(batch.is_empty());
    assert_eq!(batch.failures.len(), 1);
    assert!(matches!(batch.failures[0].error, BkError::Persist(_)));
}

#[tokio::test]
async fn test_download_by_prefixes_composes() {
    let store = MemoryStore::new()
        .with_object("a/1", "a1")
        .with_object("a/2", "a2")
        .with_object("b/1", "b1");
    let reader = reader_with(store, 16);

    let batch = reader
        .download_by_prefixes(
            vec!["a/".to_string(), "b/".to_string()],
            OutputFormat::Bytes,
            None,
        )
        .await;

    assert!(batch.is_complete());
    assert_eq!(batch.len(), 3);
    assert_eq!(batch.objects["a/2"].as_bytes().unwrap().as_ref(), b"a2");
}

#[tokio::test]
async fn test_overlapping_prefixes_collapse_in_mapping() {
    let store = MemoryStore::new()
        .with_object("a/1", "a1")
        .with_object("a/2", "a2");
    let metrics = Arc::clone(&store.metrics);
    let reader = reader_with(store, 16);

    let batch = reader
        .download_by_prefixes(
            vec!["a/".to_string(), "a/".to_string()],
            OutputFormat::Bytes,
            None,
        )
        .await;

    // No dedup before fetching: both prefixes resolve both keys and
    // every resolved key is fetched, but the mapping collapses.
    assert_eq!(batch.len(), 2);
    assert_eq!(metrics.fetch_calls.load(Ordering::SeqCst), 4);
}

#[tokio::test]
async fn test_failed_prefix_carried_into_download_batch() {
    let store = MemoryStore::new()
        .with_object("a/1", "a1")
        .with_failing_prefix("bad/");
    let reader = reader_with(store, 16);

    let batch = reader
        .download_by_prefixes(
            vec!["a/".to_string(), "bad/".to_string()],
            OutputFormat::Bytes,
            None,
        )
        .await;

    assert_eq!(batch.len(), 1);
    assert!(!batch.is_complete());
    assert_eq!(batch.failed_prefixes.len(), 1);
    assert_eq!(batch.failed_prefixes[0].prefix, "bad/");
}
