//! S3 client configuration and the S3-backed object store.

mod client;
mod store;

pub use client::{S3Config, create_s3_client};
pub use store::S3Store;
