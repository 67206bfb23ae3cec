//! Extraction cache keyed by (content hash, grammar).
//!
//! Identical file contents extract identically, except for the module
//! symbol's name, which follows the file path and is rebound on a hit.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use moka::sync::Cache;
use strata_core::errors::ParseError;

use super::traits::Extractor;
use super::types::FileExtraction;

const MAX_ENTRIES: u64 = 100_000;

pub struct ExtractionCache {
    cache: Cache<(u64, &'static str), Arc<FileExtraction>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl ExtractionCache {
    pub fn new() -> Self {
        Self::with_capacity(MAX_ENTRIES)
    }

    pub fn with_capacity(capacity: u64) -> Self {
        Self {
            cache: Cache::builder().max_capacity(capacity).build(),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Return the cached extraction for this content or run the extractor.
    pub fn get_or_extract(
        &self,
        content_hash: u64,
        extractor: &dyn Extractor,
        source: &[u8],
        path: &str,
    ) -> Result<FileExtraction, ParseError> {
        let key = (content_hash, extractor.grammar_tag());
        if let Some(cached) = self.cache.get(&key) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            let mut extraction = FileExtraction::clone(&cached);
            extraction.rebind_module(path);
            return Ok(extraction);
        }
        self.misses.fetch_add(1, Ordering::Relaxed);
        let extraction = extractor.extract(source, path)?;
        self.cache.insert(key, Arc::new(extraction.clone()));
        Ok(extraction)
    }

    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }

    /// Fraction of lookups served from the cache (0.0 when unused).
    pub fn hit_rate(&self) -> f64 {
        let hits = self.hits();
        let total = hits + self.misses();
        if total == 0 {
            0.0
        } else {
            hits as f64 / total as f64
        }
    }

    pub fn clear(&self) {
        self.cache.invalidate_all();
    }
}

impl Default for ExtractionCache {
    fn default() -> Self {
        Self::new()
    }
}
