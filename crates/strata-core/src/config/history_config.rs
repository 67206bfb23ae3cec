//! Version-control history configuration.

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_MAX_COMMITS, DEFAULT_MAX_FILES_PER_COMMIT};

/// Configuration for historical signals.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct HistoryConfig {
    /// Read git history at all. Default: true.
    pub enabled: Option<bool>,
    /// Commits walked per refresh. Default: 5000.
    pub max_commits: Option<usize>,
    /// Commits touching more files are excluded from co-change. Default: 100.
    pub max_files_per_commit: Option<usize>,
}

impl HistoryConfig {
    pub fn effective_enabled(&self) -> bool {
        self.enabled.unwrap_or(true)
    }

    pub fn effective_max_commits(&self) -> usize {
        self.max_commits.unwrap_or(DEFAULT_MAX_COMMITS)
    }

    pub fn effective_max_files_per_commit(&self) -> usize {
        self.max_files_per_commit
            .unwrap_or(DEFAULT_MAX_FILES_PER_COMMIT)
    }
}
