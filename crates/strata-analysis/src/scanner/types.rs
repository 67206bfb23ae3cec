//! Scanner data types: discovered files, fingerprints and change sets.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use strata_core::config::FingerprintMode;
use strata_storage::queries::files::FileFingerprint;

use super::language_detect::Language;

/// A file found by discovery, before fingerprinting.
#[derive(Debug, Clone)]
pub struct DiscoveredFile {
    /// Forward-slash path relative to the repository root.
    pub path: String,
    pub abs_path: PathBuf,
    pub size: u64,
    pub mtime_secs: i64,
    pub mtime_nanos: u32,
    pub language: Option<Language>,
}

/// Outcome of discovery: the sorted file list and what was skipped.
#[derive(Debug, Clone, Default)]
pub struct Discovery {
    pub files: Vec<DiscoveredFile>,
    pub skipped_large: usize,
    pub skipped_filtered: usize,
    pub walk_errors: Vec<String>,
}

/// Change class of a discovered file relative to the stored fingerprint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileClass {
    Unchanged,
    Changed,
    New,
}

/// A discovered file with its class and current content hash.
#[derive(Debug, Clone)]
pub struct ClassifiedFile {
    pub file: DiscoveredFile,
    pub class: FileClass,
    pub content_hash: u64,
    /// True when the stored mtime differs although the content did not.
    pub mtime_moved: bool,
}

/// Full classification of a tree against the store.
#[derive(Debug, Clone, Default)]
pub struct ChangeSet {
    /// Every discovered file, sorted by path.
    pub files: Vec<ClassifiedFile>,
    /// Live stored files that were not discovered, sorted by path.
    pub deleted: Vec<FileFingerprint>,
    pub fingerprint: FingerprintModeUsed,
    /// Files whose content could not be read this run.
    pub unreadable: Vec<String>,
}

/// The fingerprint strategy actually applied to this run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FingerprintModeUsed {
    #[default]
    Mtime,
    Hash,
}

impl FingerprintModeUsed {
    pub fn name(&self) -> &'static str {
        match self {
            FingerprintModeUsed::Mtime => "mtime",
            FingerprintModeUsed::Hash => "hash",
        }
    }
}

impl From<FingerprintMode> for FingerprintModeUsed {
    fn from(mode: FingerprintMode) -> Self {
        match mode {
            FingerprintMode::Hash => FingerprintModeUsed::Hash,
            FingerprintMode::Mtime | FingerprintMode::Auto => FingerprintModeUsed::Mtime,
        }
    }
}

impl ChangeSet {
    pub fn count(&self, class: FileClass) -> usize {
        self.files.iter().filter(|f| f.class == class).count()
    }

    /// Files that must be re-parsed (changed or new), in path order.
    pub fn to_parse(&self) -> impl Iterator<Item = &ClassifiedFile> {
        self.files.iter().filter(|f| f.class != FileClass::Unchanged)
    }

    /// True when nothing was changed, added or deleted.
    pub fn is_clean(&self) -> bool {
        self.deleted.is_empty() && self.files.iter().all(|f| f.class == FileClass::Unchanged)
    }
}
