//! Configuration types for batch operations.

use serde::{Deserialize, Serialize};

use crate::fanout::DEFAULT_MAX_WORKERS;

/// Configuration for a reader's batch fan-out.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReaderConfig {
    /// Maximum concurrent workers per batch call. The effective cap is
    /// `min(max_workers, item_count)`.
    pub max_workers: usize,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            max_workers: DEFAULT_MAX_WORKERS,
        }
    }
}

impl ReaderConfig {
    /// Create a new reader configuration with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum concurrent workers.
    pub fn with_max_workers(mut self, max_workers: usize) -> Self {
        self.max_workers = max_workers;
        self
    }
}
