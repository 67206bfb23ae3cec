//! Scanner configuration.

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_MAX_FILE_SIZE, DEFAULT_THREADS, IGNORE_FILE_NAME};

/// How the change detector decides whether a file changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum FingerprintMode {
    /// Probe the volume once per run; fall back to hashing when mtime is unreliable.
    #[default]
    Auto,
    /// Trust mtime: unchanged mtime skips the hash read.
    Mtime,
    /// Always hash.
    Hash,
}

impl FingerprintMode {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Mtime => "mtime",
            Self::Hash => "hash",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "auto" => Some(Self::Auto),
            "mtime" => Some(Self::Mtime),
            "hash" => Some(Self::Hash),
            _ => None,
        }
    }
}

/// Configuration for discovery and change detection.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ScanConfig {
    /// Maximum file size in bytes. Default: 1,000,000.
    pub max_file_size: Option<u64>,
    /// Parse worker threads (0 = auto). Default: 0.
    pub threads: Option<usize>,
    /// Additional ignore globs in gitignore syntax.
    #[serde(default)]
    pub extra_ignore: Vec<String>,
    /// Follow symbolic links. Default: false.
    pub follow_symlinks: Option<bool>,
    /// Fingerprint policy. Default: auto.
    pub fingerprint: Option<FingerprintMode>,
    /// Name of the project ignore file. Default: `.strataignore`.
    pub ignore_file: Option<String>,
    /// Respect `.gitignore` files. Default: true.
    pub respect_gitignore: Option<bool>,
}

impl ScanConfig {
    /// Returns the effective max file size, defaulting to 1,000,000 bytes.
    pub fn effective_max_file_size(&self) -> u64 {
        self.max_file_size.unwrap_or(DEFAULT_MAX_FILE_SIZE)
    }

    /// Returns the effective thread count (0 = let rayon decide).
    pub fn effective_threads(&self) -> usize {
        self.threads.unwrap_or(DEFAULT_THREADS)
    }

    pub fn effective_follow_symlinks(&self) -> bool {
        self.follow_symlinks.unwrap_or(false)
    }

    pub fn effective_fingerprint(&self) -> FingerprintMode {
        self.fingerprint.unwrap_or_default()
    }

    pub fn effective_ignore_file(&self) -> &str {
        self.ignore_file.as_deref().unwrap_or(IGNORE_FILE_NAME)
    }

    pub fn effective_respect_gitignore(&self) -> bool {
        self.respect_gitignore.unwrap_or(true)
    }
}
