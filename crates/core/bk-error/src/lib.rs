//! Error types for bucketeer.
//!
//! This crate provides:
//! - [`BkError`] - Top-level error enum for all reader operations
//! - Domain-specific errors ([`ListingError`], [`FetchError`], [`ParseError`], [`PersistError`])
//! - The [`Result`] alias used throughout the workspace
//!
//! Batch operations catch these at the smallest unit of work (one
//! prefix's pagination, one key's fetch) and report them per item
//! instead of aborting sibling work. Only configuration errors and
//! client-construction failures abort a whole batch call.

use thiserror::Error;

/// Top-level error type for bucketeer.
#[derive(Error, Debug)]
pub enum BkError {
    /// Listing errors (ListObjectsV2 request, pagination)
    #[error("Listing error: {0}")]
    Listing(#[from] ListingError),

    /// Fetch errors (GetObject request, body download)
    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    /// Parse errors (payload could not be decoded as structured data)
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    /// Persist errors (local directory creation, file write)
    #[error("Persist error: {0}")]
    Persist(#[from] PersistError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic errors (wrapped anyhow)
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Listing-related errors.
#[derive(Error, Debug)]
pub enum ListingError {
    /// The bucket does not exist
    #[error("Bucket not found: {0}")]
    BucketNotFound(String),

    /// A list page request failed
    #[error("List request failed: {0}")]
    Request(String),
}

/// Fetch-related errors.
#[derive(Error, Debug)]
pub enum FetchError {
    /// The object does not exist
    #[error("Object not found: {0}")]
    NotFound(String),

    /// The request or body download failed
    #[error("Transport error: {0}")]
    Transport(String),
}

/// Parse-related errors.
#[derive(Error, Debug)]
pub enum ParseError {
    /// The payload is not valid JSON
    #[error("Invalid JSON in {key}: {message}")]
    Json { key: String, message: String },
}

/// Persist-related errors.
#[derive(Error, Debug)]
pub enum PersistError {
    /// Creating the parent directory failed
    #[error("Failed to create directory {path}: {message}")]
    CreateDir { path: String, message: String },

    /// Writing the object file failed
    #[error("Failed to write {path}: {message}")]
    Write { path: String, message: String },

    /// The key resolves outside the output directory
    #[error("Key escapes the output directory: {0}")]
    UnsafeKey(String),
}

impl BkError {
    /// Whether this error means the remote object or bucket is absent,
    /// as opposed to unreachable.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            BkError::Fetch(FetchError::NotFound(_))
                | BkError::Listing(ListingError::BucketNotFound(_))
        )
    }
}

/// Result type alias using BkError.
pub type Result<T> = std::result::Result<T, BkError>;
