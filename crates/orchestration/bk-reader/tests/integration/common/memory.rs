//! An instrumented in-memory object store.
//!
//! Keys are served in lexicographic order with a configurable page
//! size, mirroring the remote listing contract. Call counts and the
//! in-flight fetch gauge let tests assert pagination and concurrency
//! invariants; failures can be injected per key or per prefix.

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use bk_error::{BkError, FetchError, ListingError, Result};
use bk_reader::{ListingPage, ObjectStore};
use bytes::Bytes;

/// Counters shared with the test after the store moves into a reader.
#[derive(Debug, Default)]
pub struct StoreMetrics {
    pub list_calls: AtomicUsize,
    pub fetch_calls: AtomicUsize,
    live_fetches: AtomicUsize,
    peak_fetches: AtomicUsize,
}

impl StoreMetrics {
    /// Highest number of fetches that were in flight at once.
    pub fn peak_fetches(&self) -> usize {
        self.peak_fetches.load(Ordering::SeqCst)
    }
}

pub struct MemoryStore {
    objects: BTreeMap<String, Bytes>,
    page_size: usize,
    fetch_delay: Option<Duration>,
    fail_keys: HashSet<String>,
    fail_prefixes: HashSet<String>,
    pub metrics: Arc<StoreMetrics>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            objects: BTreeMap::new(),
            page_size: 1000,
            fetch_delay: None,
            fail_keys: HashSet::new(),
            fail_prefixes: HashSet::new(),
            metrics: Arc::new(StoreMetrics::default()),
        }
    }

    /// Store an object.
    pub fn with_object(mut self, key: impl Into<String>, data: impl Into<Bytes>) -> Self {
        self.objects.insert(key.into(), data.into());
        self
    }

    /// Set the maximum entries per listing page.
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    /// Delay every fetch, widening the window concurrency assertions
    /// observe.
    pub fn with_fetch_delay(mut self, delay: Duration) -> Self {
        self.fetch_delay = Some(delay);
        self
    }

    /// Make every fetch of `key` fail with a transport error.
    pub fn with_failing_key(mut self, key: impl Into<String>) -> Self {
        self.fail_keys.insert(key.into());
        self
    }

    /// Make every listing of `prefix` fail.
    pub fn with_failing_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.fail_prefixes.insert(prefix.into());
        self
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn list_page(
        &self,
        _bucket: &str,
        prefix: &str,
        delimiter: Option<&str>,
        continuation_token: Option<&str>,
    ) -> Result<ListingPage> {
        self.metrics.list_calls.fetch_add(1, Ordering::SeqCst);

        if self.fail_prefixes.contains(prefix) {
            return Err(
                ListingError::Request(format!("injected listing failure for {prefix}")).into(),
            );
        }

        let entries: Vec<String> = match delimiter {
            Some(delimiter) => {
                let mut children = BTreeSet::new();
                for key in self.objects.keys() {
                    if let Some(rest) = key.strip_prefix(prefix) {
                        if let Some(pos) = rest.find(delimiter) {
                            children.insert(format!("{prefix}{}{delimiter}", &rest[..pos]));
                        }
                    }
                }
                children.into_iter().collect()
            }
            None => self
                .objects
                .keys()
                .filter(|key| key.starts_with(prefix))
                .cloned()
                .collect(),
        };

        let start: usize = continuation_token
            .map(|t| t.parse().expect("numeric continuation token"))
            .unwrap_or(0);
        let end = (start + self.page_size).min(entries.len());
        let slice = entries[start..end].to_vec();

        let mut page = ListingPage {
            next_continuation_token: (end < entries.len()).then(|| end.to_string()),
            ..Default::default()
        };

        if delimiter.is_some() {
            page.common_prefixes = slice;
        } else {
            page.keys = slice;
        }

        Ok(page)
    }

    async fn fetch_object(&self, _bucket: &str, key: &str) -> Result<Bytes> {
        self.metrics.fetch_calls.fetch_add(1, Ordering::SeqCst);
        let live = self.metrics.live_fetches.fetch_add(1, Ordering::SeqCst) + 1;
        self.metrics.peak_fetches.fetch_max(live, Ordering::SeqCst);

        if let Some(delay) = self.fetch_delay {
            tokio::time::sleep(delay).await;
        }

        let result = if self.fail_keys.contains(key) {
            Err(BkError::Fetch(FetchError::Transport(format!(
                "injected fetch failure for {key}"
            ))))
        } else {
            self.objects
                .get(key)
                .cloned()
                .ok_or_else(|| FetchError::NotFound(key.to_string()).into())
        };

        self.metrics.live_fetches.fetch_sub(1, Ordering::SeqCst);
        result
    }
}
