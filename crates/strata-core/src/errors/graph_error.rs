//! Graph query errors.

use super::error_code::{self, StrataErrorCode};

/// Errors raised by graph queries against the in-memory arena.
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    #[error("Symbol not found in graph: {id}")]
    SymbolNotFound { id: i64 },

    #[error("Invalid analytics parameter {name}: {message}")]
    InvalidParameter { name: String, message: String },
}

impl StrataErrorCode for GraphError {
    fn error_code(&self) -> &'static str {
        error_code::GRAPH_ERROR
    }
}
