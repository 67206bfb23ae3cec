//! Extraction subsystem: per-language extractors that turn file text into
//! ordered symbol and reference candidates.

pub mod cache;
pub mod complexity;
pub mod error_tolerant;
pub mod exports;
pub mod grammar_extractor;
pub mod queries;
pub mod registry;
pub mod traits;
pub mod types;

pub use cache::ExtractionCache;
pub use grammar_extractor::GrammarExtractor;
pub use registry::ExtractorRegistry;
pub use traits::Extractor;
pub use types::{
    ExtractStatus, FileExtraction, RefCandidate, RefKind, SymbolCandidate, SymbolKind,
};
