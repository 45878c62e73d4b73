//! S3-backed implementation of the object-store boundary.

use async_trait::async_trait;
use aws_sdk_s3::Client;
use bk_error::{FetchError, ListingError, Result};
use bytes::Bytes;

use super::client::{S3Config, create_s3_client};
use crate::store::{ListingPage, ObjectStore};

/// [`ObjectStore`] over `aws_sdk_s3::Client`.
///
/// The wrapped client is Arc-backed; cloning the store shares the
/// underlying connection pool.
#[derive(Debug, Clone)]
pub struct S3Store {
    client: Client,
}

impl S3Store {
    /// Wrap an existing S3 client.
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Create the client from configuration and wrap it.
    pub async fn connect(config: &S3Config) -> Result<Self> {
        Ok(Self::new(create_s3_client(config).await?))
    }

    /// Access the underlying S3 client.
    pub fn client(&self) -> &Client {
        &self.client
    }
}

#[async_trait]
impl ObjectStore for S3Store {
    async fn list_page(
        &self,
        bucket: &str,
        prefix: &str,
        delimiter: Option<&str>,
        continuation_token: Option<&str>,
    ) -> Result<ListingPage> {
        let mut req = self.client.list_objects_v2().bucket(bucket).prefix(prefix);

        if let Some(delimiter) = delimiter {
            req = req.delimiter(delimiter);
        }

        if let Some(token) = continuation_token {
            req = req.continuation_token(token);
        }

        let resp = req.send().await.map_err(|e| {
            if e.as_service_error().is_some_and(|e| e.is_no_such_bucket()) {
                ListingError::BucketNotFound(bucket.to_string())
            } else {
                ListingError::Request(format!("ListObjectsV2 failed for {prefix}: {e}"))
            }
        })?;

        let mut page = ListingPage::default();

        if let Some(contents) = resp.contents {
            for obj in contents {
                let key = obj.key.unwrap_or_default();

                // Skip directory markers and empty keys
                if key.is_empty() || key.ends_with('/') {
                    continue;
                }

                page.keys.push(key);
            }
        }

        if let Some(common_prefixes) = resp.common_prefixes {
            for cp in common_prefixes {
                if let Some(p) = cp.prefix {
                    page.common_prefixes.push(p);
                }
            }
        }

        // The token marks listing-complete only by its absence; a page
        // that is not truncated never carries one.
        if resp.is_truncated == Some(true) {
            page.next_continuation_token = resp.next_continuation_token;
        }

        Ok(page)
    }

    async fn fetch_object(&self, bucket: &str, key: &str) -> Result<Bytes> {
        let resp = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| {
                if e.as_service_error().is_some_and(|e| e.is_no_such_key()) {
                    FetchError::NotFound(key.to_string())
                } else {
                    FetchError::Transport(format!("GetObject failed for {key}: {e}"))
                }
            })?;

        // Whole object buffered in memory; large-object streaming is
        // out of scope for this reader.
        let data = resp
            .body
            .collect()
            .await
            .map_err(|e| FetchError::Transport(format!("Body download failed for {key}: {e}")))?;

        Ok(data.into_bytes())
    }
}
