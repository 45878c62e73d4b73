//! Batch operations: fan-out across prefixes or keys, fan-in of results.
//!
//! Every batch call shares one [`ObjectStore`] instance across all of
//! its workers and isolates per-item failures: a failed prefix or key
//! is logged and reported in the batch result, never aborting its
//! siblings. Only client construction and configuration errors fail a
//! whole call.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use bk_error::{BkError, Result};
use tracing::{debug, warn};

use crate::config::ReaderConfig;
use crate::download::{self, OutputFormat, Payload};
use crate::fanout::run_bounded;
use crate::paginate;
use crate::s3::{S3Config, S3Store};
use crate::store::ObjectStore;

/// A prefix whose listing failed, with the error that stopped it.
#[derive(Debug)]
pub struct PrefixFailure {
    /// The prefix that failed to list.
    pub prefix: String,
    /// The cause.
    pub error: BkError,
}

/// A key whose download failed, with the cause.
#[derive(Debug)]
pub struct KeyFailure {
    /// The key that failed to download.
    pub key: String,
    /// The cause.
    pub error: BkError,
}

/// Aggregated result of a batch listing.
#[derive(Debug, Default)]
pub struct ListBatch {
    /// Collected keys (or sub-prefixes for the delimiter-scoped
    /// operations), concatenated in completion order across prefixes.
    /// Completion order is not deterministic between runs.
    pub entries: Vec<String>,
    /// Prefixes whose listing failed. Entries from these prefixes are
    /// absent from `entries`.
    pub failures: Vec<PrefixFailure>,
}

impl ListBatch {
    /// Whether every prefix listed successfully.
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Aggregated result of a batch download.
#[derive(Debug, Default)]
pub struct DownloadBatch {
    /// Successfully fetched objects, keyed by object key. Failed keys
    /// are absent here and reported in `failures`, so callers can tell
    /// "failed" apart from "not requested".
    pub objects: HashMap<String, Payload>,
    /// Keys whose fetch, parse, or persist failed.
    pub failures: Vec<KeyFailure>,
    /// Prefixes that failed to resolve, when the batch was driven by
    /// prefixes rather than keys.
    pub failed_prefixes: Vec<PrefixFailure>,
    /// Total bytes fetched across successful objects.
    pub bytes_fetched: u64,
}

impl DownloadBatch {
    /// Whether every requested item succeeded.
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty() && self.failed_prefixes.is_empty()
    }

    /// Number of successfully fetched objects.
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Whether no object was fetched.
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

/// Concurrent reader for one bucket over a shared [`ObjectStore`].
///
/// The store is created once per reader, handed to every worker of
/// every batch call, and released when the reader drops — on all exit
/// paths, however many items failed.
pub struct BucketReader<S> {
    store: Arc<S>,
    bucket: String,
    config: ReaderConfig,
}

impl BucketReader<S3Store> {
    /// Connect to S3, creating the shared client from configuration.
    pub async fn connect(s3: &S3Config, config: ReaderConfig) -> Result<Self> {
        if s3.bucket.is_empty() {
            return Err(BkError::Config("bucket name must not be empty".to_string()));
        }

        let store = S3Store::connect(s3).await?;
        Ok(Self::new(store, s3.bucket.clone(), config))
    }
}

impl<S: ObjectStore> BucketReader<S> {
    /// Create a reader over an existing store.
    pub fn new(store: S, bucket: impl Into<String>, config: ReaderConfig) -> Self {
        Self {
            store: Arc::new(store),
            bucket: bucket.into(),
            config,
        }
    }

    /// Get the bucket name.
    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Get the configuration.
    pub fn config(&self) -> &ReaderConfig {
        &self.config
    }

    /// List object keys under multiple prefixes in parallel.
    pub async fn list_keys_by_prefixes(&self, prefixes: Vec<String>) -> ListBatch {
        self.list_batch(prefixes, None).await
    }

    /// List immediate child namespace segments under multiple prefixes
    /// in parallel.
    pub async fn list_prefixes_by_prefixes(&self, prefixes: Vec<String>) -> ListBatch {
        self.list_batch(prefixes, Some("/")).await
    }

    async fn list_batch(&self, prefixes: Vec<String>, delimiter: Option<&str>) -> ListBatch {
        debug!(
            bucket = %self.bucket,
            prefix_count = prefixes.len(),
            delimited = delimiter.is_some(),
            "Starting batch listing"
        );

        let results = run_bounded(prefixes, self.config.max_workers, |prefix| {
            let store = Arc::clone(&self.store);
            let bucket = self.bucket.clone();
            async move {
                let result =
                    paginate::drain_listing(store.as_ref(), &bucket, &prefix, delimiter).await;
                (prefix, result)
            }
        })
        .await;

        let mut batch = ListBatch::default();

        for (prefix, result) in results {
            match result {
                Ok((keys, sub_prefixes)) => {
                    if delimiter.is_some() {
                        batch.entries.extend(sub_prefixes);
                    } else {
                        batch.entries.extend(keys);
                    }
                }
                Err(error) => {
                    warn!(prefix = %prefix, error = %error, "Listing failed for prefix");
                    batch.failures.push(PrefixFailure { prefix, error });
                }
            }
        }

        debug!(
            bucket = %self.bucket,
            entries = batch.entries.len(),
            failures = batch.failures.len(),
            "Batch listing completed"
        );

        batch
    }

    /// Download multiple objects by key in parallel.
    ///
    /// Duplicate keys are fetched redundantly and collapse
    /// last-writer-wins in the mapping.
    pub async fn download_by_keys(
        &self,
        keys: Vec<String>,
        format: OutputFormat,
        output_dir: Option<&Path>,
    ) -> DownloadBatch {
        debug!(
            bucket = %self.bucket,
            key_count = keys.len(),
            ?format,
            "Starting batch download"
        );

        let results = run_bounded(keys, self.config.max_workers, |key| {
            let store = Arc::clone(&self.store);
            let bucket = self.bucket.clone();
            let output_dir = output_dir.map(Path::to_path_buf);
            async move {
                let result = download::download_by_key(
                    store.as_ref(),
                    &bucket,
                    &key,
                    format,
                    output_dir.as_deref(),
                )
                .await;
                (key, result)
            }
        })
        .await;

        let mut batch = DownloadBatch::default();

        for (key, result) in results {
            match result {
                Ok(object) => {
                    batch.bytes_fetched += object.size;
                    batch.objects.insert(object.key, object.payload);
                }
                Err(error) => {
                    warn!(key = %key, error = %error, "Download failed for key");
                    batch.failures.push(KeyFailure { key, error });
                }
            }
        }

        debug!(
            bucket = %self.bucket,
            objects = batch.objects.len(),
            failures = batch.failures.len(),
            bytes = batch.bytes_fetched,
            "Batch download completed"
        );

        batch
    }

    /// Download every object under multiple prefixes.
    ///
    /// Resolves the prefixes to a flat key list first, then downloads
    /// by key. Prefix-resolution failures are carried into the result's
    /// `failed_prefixes`.
    pub async fn download_by_prefixes(
        &self,
        prefixes: Vec<String>,
        format: OutputFormat,
        output_dir: Option<&Path>,
    ) -> DownloadBatch {
        let listing = self.list_keys_by_prefixes(prefixes).await;

        let mut batch = self
            .download_by_keys(listing.entries, format, output_dir)
            .await;
        batch.failed_prefixes = listing.failures;
        batch
    }
}
