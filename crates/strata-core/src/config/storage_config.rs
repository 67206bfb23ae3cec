//! Storage configuration.

use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_INDEX_DIR;

/// Configuration for the graph store.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct StorageConfig {
    /// Index directory relative to the repository root. Default: `.strata`.
    pub index_dir: Option<String>,
    /// Read-only connections in the pool. Default: 4, max 8.
    pub read_pool_size: Option<usize>,
}

impl StorageConfig {
    pub fn effective_index_dir(&self) -> &str {
        self.index_dir.as_deref().unwrap_or(DEFAULT_INDEX_DIR)
    }

    pub fn effective_read_pool_size(&self) -> usize {
        self.read_pool_size.unwrap_or(4)
    }
}
