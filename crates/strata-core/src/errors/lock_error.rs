//! Run lock errors.

use std::path::PathBuf;

use super::error_code::{self, StrataErrorCode};

/// Errors acquiring or clearing the per-repository run lock.
#[derive(Debug, thiserror::Error)]
pub enum LockError {
    #[error("Another indexing run holds {path} (pid {pid:?})")]
    ConcurrentRunConflict { path: PathBuf, pid: Option<u32> },

    #[error("Stale lock at {path} left by pid {pid:?}; clear it explicitly before indexing")]
    StaleLock { path: PathBuf, pid: Option<u32> },

    #[error("Lock IO error at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl StrataErrorCode for LockError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::ConcurrentRunConflict { .. } => error_code::CONCURRENT_RUN,
            Self::StaleLock { .. } => error_code::STALE_LOCK,
            Self::Io { .. } => error_code::LOCK_ERROR,
        }
    }
}
