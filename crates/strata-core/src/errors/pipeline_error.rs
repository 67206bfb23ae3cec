//! Errors that abort an indexing run.

use super::error_code::{self, StrataErrorCode};
use super::{
    ConfigError, GraphError, HistoryError, LockError, ParseError, ScanError, StorageError,
};

/// Anything that stops a run before it commits. The previous snapshot
/// stays current and the runs table records the failure.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("discovery: {0}")]
    Scan(#[from] ScanError),

    #[error("extraction: {0}")]
    Parse(#[from] ParseError),

    #[error("storage: {0}")]
    Storage(#[from] StorageError),

    #[error("run lock: {0}")]
    Lock(#[from] LockError),

    #[error("history: {0}")]
    History(#[from] HistoryError),

    #[error("graph: {0}")]
    Graph(#[from] GraphError),

    #[error("config: {0}")]
    Config(#[from] ConfigError),

    #[error("phase {from} cannot be followed by {to}")]
    InvalidTransition { from: String, to: String },

    #[error("run cancelled")]
    Cancelled,
}

impl StrataErrorCode for PipelineError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Scan(inner) => inner.error_code(),
            Self::Parse(inner) => inner.error_code(),
            Self::Storage(inner) => inner.error_code(),
            Self::Lock(inner) => inner.error_code(),
            Self::History(inner) => inner.error_code(),
            Self::Graph(inner) => inner.error_code(),
            Self::Config(inner) => inner.error_code(),
            Self::InvalidTransition { .. } => error_code::PIPELINE_ERROR,
            Self::Cancelled => error_code::CANCELLED,
        }
    }
}
