//! File discovery over the `ignore` walker.
//!
//! Respects `.gitignore` and the project ignore file, prunes dependency and
//! build directories, and drops lockfiles, binaries and oversized files.
//! The index directory is never walked.

use std::path::Path;
use std::time::{Instant, UNIX_EPOCH};

use ignore::overrides::OverrideBuilder;
use ignore::WalkBuilder;
use strata_core::config::ScanConfig;
use strata_core::errors::ScanError;
use strata_core::types::interning::normalize_path;
use strata_core::{Cancellable, CancellationToken};

use super::language_detect::Language;
use super::types::{DiscoveredFile, Discovery};

/// Directory names pruned during the walk.
pub const SKIP_DIRS: &[&str] = &[
    ".git",
    ".hg",
    ".svn",
    "node_modules",
    "__pycache__",
    ".tox",
    ".mypy_cache",
    ".pytest_cache",
    ".ruff_cache",
    "venv",
    ".venv",
    "env",
    ".env",
    "dist",
    "build",
    ".eggs",
    ".next",
    ".nuxt",
    ".output",
    "target",
    "obj",
];

/// Lockfiles never worth indexing.
pub const SKIP_NAMES: &[&str] = &[
    "package-lock.json",
    "yarn.lock",
    "pnpm-lock.yaml",
    "Cargo.lock",
    "poetry.lock",
    "composer.lock",
    "Gemfile.lock",
    "Pipfile.lock",
];

/// Binary, media and minified-asset suffixes (matched lowercase).
pub const SKIP_SUFFIXES: &[&str] = &[
    ".lock", ".min.js", ".min.css", ".map", ".png", ".jpg", ".jpeg", ".gif", ".bmp", ".ico",
    ".svg", ".webp", ".woff", ".woff2", ".ttf", ".eot", ".otf", ".zip", ".tar", ".gz", ".bz2",
    ".xz", ".7z", ".rar", ".exe", ".dll", ".so", ".dylib", ".o", ".a", ".lib", ".pyc", ".pyo",
    ".class", ".jar", ".db", ".sqlite", ".sqlite3", ".pdf", ".doc", ".docx", ".xls", ".xlsx",
    ".mp3", ".mp4", ".wav", ".avi", ".mov", ".bin", ".dat", ".pak", ".wasm",
];

fn is_skipped_name(name: &str) -> bool {
    if SKIP_NAMES.contains(&name) {
        return true;
    }
    let lower = name.to_ascii_lowercase();
    SKIP_SUFFIXES.iter().any(|s| lower.ends_with(s))
}

/// Walk `root` and return every indexable file, sorted by relative path.
pub fn discover(
    root: &Path,
    config: &ScanConfig,
    index_dir: &Path,
    cancel: &CancellationToken,
) -> Result<Discovery, ScanError> {
    if !root.is_dir() {
        return Err(ScanError::RootNotFound {
            path: root.to_path_buf(),
        });
    }
    let start = Instant::now();
    let max_size = config.effective_max_file_size();
    let respect_gitignore = config.effective_respect_gitignore();

    let mut overrides = OverrideBuilder::new(root);
    for glob in &config.extra_ignore {
        overrides
            .add(&format!("!{glob}"))
            .map_err(|e| ScanError::WalkFailed {
                path: root.to_path_buf(),
                message: format!("bad ignore glob {glob:?}: {e}"),
            })?;
    }
    let overrides = overrides.build().map_err(|e| ScanError::WalkFailed {
        path: root.to_path_buf(),
        message: e.to_string(),
    })?;

    let index_dir = index_dir.to_path_buf();
    let mut builder = WalkBuilder::new(root);
    builder
        .hidden(true)
        .git_ignore(respect_gitignore)
        .git_exclude(respect_gitignore)
        .git_global(false)
        .parents(false)
        .require_git(false)
        .follow_links(config.effective_follow_symlinks())
        .add_custom_ignore_filename(config.effective_ignore_file())
        .overrides(overrides)
        .filter_entry(move |entry| {
            if entry.path() == index_dir {
                return false;
            }
            let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);
            !(is_dir && SKIP_DIRS.contains(&entry.file_name().to_string_lossy().as_ref()))
        });

    let mut discovery = Discovery::default();
    for entry in builder.build() {
        if cancel.is_cancelled() {
            return Err(ScanError::Cancelled);
        }
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                discovery.walk_errors.push(e.to_string());
                continue;
            }
        };
        if !entry.file_type().map(|t| t.is_file()).unwrap_or(false) {
            continue;
        }
        let name = entry.file_name().to_string_lossy();
        if is_skipped_name(&name) {
            discovery.skipped_filtered += 1;
            continue;
        }
        let rel = match entry.path().strip_prefix(root) {
            Ok(rel) => normalize_path(&rel.to_string_lossy()),
            Err(_) => continue,
        };
        let metadata = match entry.metadata() {
            Ok(m) => m,
            Err(e) => {
                discovery.walk_errors.push(format!("{rel}: {e}"));
                continue;
            }
        };
        if metadata.len() > max_size {
            discovery.skipped_large += 1;
            continue;
        }
        let (mtime_secs, mtime_nanos) = metadata
            .modified()
            .ok()
            .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
            .map(|d| (d.as_secs() as i64, d.subsec_nanos()))
            .unwrap_or((0, 0));
        let language = Language::from_extension(entry.path().extension().and_then(|e| e.to_str()));

        discovery.files.push(DiscoveredFile {
            path: rel,
            abs_path: entry.path().to_path_buf(),
            size: metadata.len(),
            mtime_secs,
            mtime_nanos,
            language,
        });
    }

    discovery.files.sort_by(|a, b| a.path.cmp(&b.path));
    tracing::debug!(
        files_discovered = discovery.files.len(),
        skipped_large = discovery.skipped_large,
        skipped_filtered = discovery.skipped_filtered,
        discovery_duration = start.elapsed().as_millis() as u64,
        "discovery complete"
    );
    Ok(discovery)
}
