//! Discovery errors.

use std::path::PathBuf;

use super::error_code::{self, StrataErrorCode};

/// Failures that stop discovery of the file set. Unreadable individual
/// entries are skipped, not reported here.
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    #[error("repository root {} is missing or not a directory", path.display())]
    RootNotFound { path: PathBuf },

    #[error("cannot build ignore rules for {}: {message}", path.display())]
    WalkFailed { path: PathBuf, message: String },

    #[error("discovery cancelled")]
    Cancelled,
}

impl StrataErrorCode for ScanError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Cancelled => error_code::CANCELLED,
            Self::RootNotFound { .. } | Self::WalkFailed { .. } => error_code::SCAN_ERROR,
        }
    }
}
