//! Extractor registry: file extension → extractor, built once at startup.

use std::sync::Arc;

use rustc_hash::FxHashMap;

use super::cache::ExtractionCache;
use super::grammar_extractor::GrammarExtractor;
use super::traits::Extractor;
use super::types::{count_lines, FileExtraction};
use crate::scanner::language_detect::Language;

/// Read-only lookup table from extension to extractor.
#[derive(Clone, Default)]
pub struct ExtractorRegistry {
    by_extension: FxHashMap<&'static str, Arc<dyn Extractor>>,
}

impl ExtractorRegistry {
    /// A registry with no extractors. Every file extracts as unsupported.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Registry with every built-in grammar, plus the aliased languages.
    pub fn builtin() -> Self {
        let mut registry = Self::empty();
        for lang in Language::all() {
            if *lang == Language::TypeScript {
                registry.register(Arc::new(GrammarExtractor::with_grammar(
                    Language::TypeScript,
                    vec!["ts", "mts", "cts"],
                    "typescript",
                    tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
                )));
                registry.register(Arc::new(GrammarExtractor::with_grammar(
                    Language::TypeScript,
                    vec!["tsx"],
                    "tsx",
                    tree_sitter_typescript::LANGUAGE_TSX.into(),
                )));
            } else {
                registry.register(Arc::new(GrammarExtractor::new(*lang)));
            }
        }
        tracing::debug!(extensions = registry.by_extension.len(), "extractor registry built");
        registry
    }

    /// Register an extractor for all of its extensions. A later
    /// registration replaces an earlier one for the same extension.
    pub fn register(&mut self, extractor: Arc<dyn Extractor>) {
        for ext in extractor.extensions() {
            self.by_extension.insert(*ext, Arc::clone(&extractor));
        }
    }

    pub fn for_extension(&self, ext: &str) -> Option<&Arc<dyn Extractor>> {
        self.by_extension.get(ext.to_ascii_lowercase().as_str())
    }

    pub fn for_path(&self, path: &str) -> Option<&Arc<dyn Extractor>> {
        let base = path.rsplit('/').next().unwrap_or(path);
        let (_, ext) = base.rsplit_once('.')?;
        self.for_extension(ext)
    }

    /// Registered extensions, sorted.
    pub fn extensions(&self) -> Vec<&'static str> {
        let mut exts: Vec<&'static str> = self.by_extension.keys().copied().collect();
        exts.sort_unstable();
        exts
    }

    pub fn len(&self) -> usize {
        self.by_extension.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_extension.is_empty()
    }

    /// Extract one file. Never fails: a missing extractor yields
    /// `unsupported` and an extractor error yields `failed`.
    pub fn extract(
        &self,
        path: &str,
        source: &[u8],
        content_hash: u64,
        cache: Option<&ExtractionCache>,
    ) -> FileExtraction {
        let Some(extractor) = self.for_path(path) else {
            let ext = path.rsplit_once('.').map(|(_, e)| e);
            return FileExtraction::unsupported(Language::from_extension(ext), count_lines(source));
        };
        let result = match cache {
            Some(cache) => cache.get_or_extract(content_hash, extractor.as_ref(), source, path),
            None => extractor.extract(source, path),
        };
        match result {
            Ok(extraction) => extraction,
            Err(e) => {
                tracing::warn!(path, error = %e, "extraction failed");
                FileExtraction::failed(Some(extractor.language()), count_lines(source), e.to_string())
            }
        }
    }
}

impl std::fmt::Debug for ExtractorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExtractorRegistry")
            .field("extensions", &self.extensions())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::types::ExtractStatus;

    #[test]
    fn test_builtin_covers_every_language_extension() {
        let registry = ExtractorRegistry::builtin();
        for lang in Language::all() {
            for ext in lang.extensions() {
                let ex = registry.for_extension(ext).unwrap();
                assert_eq!(ex.language(), *lang, "extension {ext}");
            }
        }
    }

    #[test]
    fn test_tsx_has_its_own_grammar() {
        let registry = ExtractorRegistry::builtin();
        assert_eq!(registry.for_extension("tsx").unwrap().grammar_tag(), "tsx");
        assert_eq!(registry.for_extension("ts").unwrap().grammar_tag(), "typescript");
    }

    #[test]
    fn test_unknown_extension_is_unsupported() {
        let registry = ExtractorRegistry::builtin();
        let out = registry.extract("notes.txt", b"hello\n", 1, None);
        assert_eq!(out.status, ExtractStatus::Unsupported);
        assert!(out.symbols.is_empty());
        assert_eq!(out.line_count, 1);
    }

    #[test]
    fn test_extension_lookup_ignores_case() {
        let registry = ExtractorRegistry::builtin();
        assert!(registry.for_path("src/Main.JAVA").is_some());
        assert!(registry.for_path("Makefile").is_none());
    }
}
