//! bk-reader - concurrent S3 listing and retrieval for bucketeer.
//!
//! This crate provides the fan-out/fan-in core behind the `bucketeer`
//! CLI. It supports:
//!
//! - Paginated key listing, exhausting every page of a prefix
//! - One-level sub-prefix discovery via delimiter-scoped listing
//! - Bounded-concurrency batch operations over prefixes and keys
//! - Object retrieval as raw bytes, parsed JSON, or files on disk
//! - Per-item failure isolation with typed failure reporting
//!
//! # Example
//!
//! ```ignore
//! use bk_reader::{BucketReader, OutputFormat, ReaderConfig, S3Config};
//!
//! // Configure S3 access; the client is created once and shared by
//! // every worker.
//! let s3 = S3Config::new("my-bucket").with_region("us-east-1");
//! let reader = BucketReader::connect(&s3, ReaderConfig::new()).await?;
//!
//! // Enumerate keys under two prefixes, sixteen listings at a time.
//! let listing = reader
//!     .list_keys_by_prefixes(vec!["logs/2024/".into(), "logs/2025/".into()])
//!     .await;
//!
//! // Fetch everything that listed, persisting under ./out/<key>.
//! let batch = reader
//!     .download_by_keys(listing.entries, OutputFormat::Bytes, Some("out".as_ref()))
//!     .await;
//!
//! eprintln!("{} objects, {} failures", batch.len(), batch.failures.len());
//! ```

pub mod batch;
pub mod config;
pub mod download;
pub mod fanout;
pub mod paginate;
pub mod s3;
pub mod store;

pub use batch::{BucketReader, DownloadBatch, KeyFailure, ListBatch, PrefixFailure};
pub use config::ReaderConfig;
pub use download::{DownloadedObject, OutputFormat, Payload, download_by_key};
pub use fanout::{DEFAULT_MAX_WORKERS, run_bounded};
pub use paginate::{drain_listing, list_keys_by_prefix, list_prefixes_by_prefix};
pub use s3::{S3Config, S3Store, create_s3_client};
pub use store::{ListingPage, ObjectStore};
