//! Extractor trait: the contract every language extractor implements.

use strata_core::errors::ParseError;

use super::types::FileExtraction;
use crate::scanner::language_detect::Language;

/// Produces symbol and reference candidates from one file's text.
///
/// Output must be deterministic: identical input yields identical
/// candidates in identical order. Unparseable input is reported through
/// [`FileExtraction::status`], not as an error.
pub trait Extractor: Send + Sync {
    /// The language this extractor handles.
    fn language(&self) -> Language;

    /// File extensions this extractor handles.
    fn extensions(&self) -> &[&'static str];

    /// Tag distinguishing extractors that share a language but not a
    /// grammar (TypeScript and TSX). Part of the extraction cache key.
    fn grammar_tag(&self) -> &'static str {
        self.language().key()
    }

    /// Extract symbols and references from `source`. `path` is the
    /// repository-relative path and names the module symbol.
    fn extract(&self, source: &[u8], path: &str) -> Result<FileExtraction, ParseError>;
}
