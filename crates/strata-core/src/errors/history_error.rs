//! Version-control history errors.

use super::error_code::{self, StrataErrorCode};

/// Errors reading commit history.
#[derive(Debug, thiserror::Error)]
pub enum HistoryError {
    #[error("Git error: {message}")]
    Git { message: String },

    #[error("No repository found at or above {path}")]
    NotARepository { path: String },
}

impl StrataErrorCode for HistoryError {
    fn error_code(&self) -> &'static str {
        error_code::HISTORY_ERROR
    }
}
