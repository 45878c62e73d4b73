//! Shared utilities for bucketeer CLI binaries.
//!
//! This crate provides the log-level argument type, logging
//! initialization, and output-formatting helpers used by the
//! `bucketeer` binary.

pub mod args;
pub mod format;
pub mod logging;

pub use args::LogLevel;
pub use format::format_bytes;
pub use logging::init_logging;
