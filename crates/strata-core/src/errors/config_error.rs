//! Errors raised while loading `strata.toml` and environment overrides.

use super::error_code::{self, StrataErrorCode};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read config {path}")]
    FileNotFound { path: String },

    #[error("{path} is not valid TOML: {message}")]
    ParseError { path: String, message: String },

    /// A value parsed but falls outside what the indexer accepts.
    #[error("`{field}` {message}")]
    ValidationFailed { field: String, message: String },
}

impl StrataErrorCode for ConfigError {
    fn error_code(&self) -> &'static str {
        error_code::CONFIG_ERROR
    }
}
