//! Change detection: two-level mtime + content hash comparison.
//!
//! Level 1 compares (mtime, size) against the stored fingerprint and skips
//! the read on a match. Level 2 hashes the content; only a hash mismatch
//! marks a file changed, so a touched but unedited file stays unchanged.
//! Volumes with unreliable mtime run hash-only.

use std::path::Path;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use rayon::prelude::*;
use strata_core::config::FingerprintMode;
use strata_core::types::collections::{FxHashMap, FxHashSet};
use strata_storage::queries::files::FileFingerprint;

use super::hasher::{hash_content, hash_hex};
use super::types::{
    ChangeSet, ClassifiedFile, DiscoveredFile, Discovery, FileClass, FingerprintModeUsed,
};

/// Path fragments of cloud-synced folders whose mtimes are rewritten by the
/// sync client.
pub const CLOUD_SYNC_MARKERS: &[&str] = &["OneDrive", "Dropbox", "Google Drive", "iCloud", "Nextcloud"];

const PROBE_FILE: &str = ".mtime_probe";
const PROBE_TOLERANCE: Duration = Duration::from_secs(2);

/// Decide the fingerprint strategy for this run.
pub fn resolve_mode(mode: FingerprintMode, root: &Path, index_dir: &Path) -> FingerprintModeUsed {
    match mode {
        FingerprintMode::Mtime => FingerprintModeUsed::Mtime,
        FingerprintMode::Hash => FingerprintModeUsed::Hash,
        FingerprintMode::Auto => match unreliable_mtime_reason(root, index_dir) {
            Some(reason) => {
                tracing::info!(reason = %reason, "mtime unreliable on this volume, hashing every file");
                FingerprintModeUsed::Hash
            }
            None => FingerprintModeUsed::Mtime,
        },
    }
}

/// Why mtimes on this volume cannot be trusted, if they cannot.
pub fn unreliable_mtime_reason(root: &Path, index_dir: &Path) -> Option<String> {
    let root_str = root.to_string_lossy();
    if let Some(marker) = CLOUD_SYNC_MARKERS.iter().find(|m| root_str.contains(*m)) {
        return Some(format!("cloud-sync folder ({marker})"));
    }

    let probe = index_dir.join(PROBE_FILE);
    if std::fs::create_dir_all(index_dir).is_err() || std::fs::write(&probe, b"probe").is_err() {
        tracing::debug!(path = %probe.display(), "mtime probe not writable, trusting mtime");
        return None;
    }
    let now = SystemTime::now();
    let observed = std::fs::metadata(&probe).and_then(|m| m.modified());
    let _ = std::fs::remove_file(&probe);

    match observed {
        Ok(mtime) if mtime == UNIX_EPOCH => Some("volume reports zero mtime".to_string()),
        Ok(mtime) => {
            let skew = match now.duration_since(mtime) {
                Ok(d) => d,
                Err(e) => e.duration(),
            };
            (skew > PROBE_TOLERANCE).then(|| format!("mtime skew of {}ms", skew.as_millis()))
        }
        Err(_) => None,
    }
}

fn parse_stored_hash(hex: &str) -> u64 {
    u64::from_str_radix(hex, 16).unwrap_or(0)
}

enum Outcome {
    Classified(ClassifiedFile),
    Unreadable(String),
}

fn classify_one(
    file: DiscoveredFile,
    stored: Option<&FileFingerprint>,
    mode: FingerprintModeUsed,
) -> Outcome {
    let mtime_matches = stored.is_some_and(|s| {
        s.mtime == file.mtime_secs && s.mtime_nanos == i64::from(file.mtime_nanos)
    });

    if let Some(s) = stored {
        if mode == FingerprintModeUsed::Mtime && mtime_matches && s.size == file.size as i64 {
            return Outcome::Classified(ClassifiedFile {
                content_hash: parse_stored_hash(&s.hash),
                file,
                class: FileClass::Unchanged,
                mtime_moved: false,
            });
        }
    }

    let content = match std::fs::read(&file.abs_path) {
        Ok(c) => c,
        Err(e) => {
            tracing::warn!(path = %file.path, error = %e, "unreadable file");
            return match stored {
                // Keep the stored version rather than report a deletion.
                Some(s) => Outcome::Classified(ClassifiedFile {
                    content_hash: parse_stored_hash(&s.hash),
                    file,
                    class: FileClass::Unchanged,
                    mtime_moved: false,
                }),
                None => Outcome::Unreadable(file.path),
            };
        }
    };
    let content_hash = hash_content(&content);

    let class = match stored {
        None => FileClass::New,
        Some(s) if s.hash == hash_hex(content_hash) => FileClass::Unchanged,
        Some(_) => FileClass::Changed,
    };
    Outcome::Classified(ClassifiedFile {
        mtime_moved: class == FileClass::Unchanged && !mtime_matches,
        file,
        class,
        content_hash,
    })
}

/// Classify every discovered file against the stored fingerprints.
///
/// Stored live files absent from discovery are reported as deleted.
pub fn classify(
    discovery: Discovery,
    stored: &[FileFingerprint],
    mode: FingerprintModeUsed,
) -> ChangeSet {
    let by_path: FxHashMap<&str, &FileFingerprint> =
        stored.iter().map(|s| (s.path.as_str(), s)).collect();

    let outcomes: Vec<Outcome> = discovery
        .files
        .into_par_iter()
        .map(|file| {
            let prior = by_path.get(file.path.as_str()).copied();
            classify_one(file, prior, mode)
        })
        .collect();

    let mut change_set = ChangeSet {
        fingerprint: mode,
        ..Default::default()
    };
    for outcome in outcomes {
        match outcome {
            Outcome::Classified(c) => change_set.files.push(c),
            Outcome::Unreadable(path) => change_set.unreadable.push(path),
        }
    }
    change_set.files.sort_by(|a, b| a.file.path.cmp(&b.file.path));

    let seen: FxHashSet<&str> =
        change_set.files.iter().map(|f| f.file.path.as_str()).collect();
    let mut deleted: Vec<FileFingerprint> = stored
        .iter()
        .filter(|s| !seen.contains(s.path.as_str()) && !change_set.unreadable.contains(&s.path))
        .cloned()
        .collect();
    deleted.sort_by(|a, b| a.path.cmp(&b.path));
    change_set.deleted = deleted;
    change_set
}
