//! Per-file extraction errors.

use super::error_code::{self, StrataErrorCode};

/// Why one file could not be turned into symbols and references.
///
/// Never fatal to a run. The registry records the message on the file's
/// extraction status and indexing moves on.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("{language} grammar rejected by the parser: {message}")]
    GrammarRejected { language: String, message: String },

    #[error("{path}: parser returned no syntax tree")]
    NoTree { path: String },

    #[error("no extractor for extension `{extension}`")]
    UnsupportedLanguage { extension: String },
}

impl StrataErrorCode for ParseError {
    fn error_code(&self) -> &'static str {
        if let Self::UnsupportedLanguage { .. } = self {
            error_code::UNSUPPORTED_LANGUAGE
        } else {
            error_code::PARSE_ERROR
        }
    }
}
