//! The remote object-store boundary.
//!
//! The reader core only talks to the remote service through
//! [`ObjectStore`]: one paginated listing call and one blob fetch.
//! [`crate::s3::S3Store`] adapts `aws_sdk_s3::Client` to it; tests
//! substitute an in-memory implementation.

use async_trait::async_trait;
use bk_error::Result;
use bytes::Bytes;

/// One response unit from the paginated listing call.
#[derive(Debug, Clone, Default)]
pub struct ListingPage {
    /// Object keys on this page.
    pub keys: Vec<String>,

    /// One-level child namespace segments, populated when the listing
    /// was delimiter-scoped.
    pub common_prefixes: Vec<String>,

    /// Cursor for the next page. `None` marks the listing complete for
    /// this prefix.
    pub next_continuation_token: Option<String>,
}

/// A remote object store: hierarchical keys under a bucket, paginated
/// listings, whole-object retrieval.
///
/// Implementations must be safe for concurrent use by multiple workers;
/// one instance is shared across a whole batch call.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Request one listing page for `(bucket, prefix)`.
    ///
    /// With a `delimiter`, the page carries common prefixes (one level
    /// of sub-namespace) instead of leaf keys. `continuation_token`
    /// must be the token returned by the previous page, or `None` for
    /// the first page.
    async fn list_page(
        &self,
        bucket: &str,
        prefix: &str,
        delimiter: Option<&str>,
        continuation_token: Option<&str>,
    ) -> Result<ListingPage>;

    /// Fetch an object's entire contents into memory.
    async fn fetch_object(&self, bucket: &str, key: &str) -> Result<Bytes>;
}
