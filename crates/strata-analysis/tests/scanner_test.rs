//! Scanner tests: discovery filters, ignore files, language detection and
//! change classification against stored fingerprints.

use std::fs;
use std::path::Path;

use strata_analysis::scanner::hasher::{hash_content, hash_hex};
use strata_analysis::scanner::language_detect::Language;
use strata_analysis::scanner::{classify, discover, FileClass, FingerprintModeUsed};
use strata_core::config::ScanConfig;
use strata_core::errors::ScanError;
use strata_core::CancellationToken;
use strata_storage::queries::files::FileFingerprint;
use tempfile::TempDir;

// ---- Helpers ----

fn write(root: &Path, rel: &str, body: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, body).unwrap();
}

fn paths(root: &Path, config: &ScanConfig) -> Vec<String> {
    discover(root, config, &root.join(".strata"), &CancellationToken::new())
        .unwrap()
        .files
        .into_iter()
        .map(|f| f.path)
        .collect()
}

fn fingerprint(path: &str, body: &str) -> FileFingerprint {
    FileFingerprint {
        id: 0,
        path: path.to_string(),
        hash: hash_hex(hash_content(body.as_bytes())),
        mtime: 0,
        mtime_nanos: 0,
        size: body.len() as i64,
    }
}

// ---- Discovery ----

#[test]
fn test_discovery_is_sorted_and_skips_dependency_dirs() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "src/z.py", "z = 1\n");
    write(dir.path(), "src/a.ts", "export const a = 1;\n");
    write(dir.path(), "node_modules/pkg/index.js", "module.exports = 1;\n");
    write(dir.path(), "target/debug/build.rs", "fn main() {}\n");
    write(dir.path(), "package-lock.json", "{}\n");
    write(dir.path(), "logo.png", "not really a png");
    write(dir.path(), ".strata/index.db", "");

    let discovery = discover(
        dir.path(),
        &ScanConfig::default(),
        &dir.path().join(".strata"),
        &CancellationToken::new(),
    )
    .unwrap();
    let found: Vec<&str> = discovery.files.iter().map(|f| f.path.as_str()).collect();
    assert_eq!(found, vec!["src/a.ts", "src/z.py"]);
    assert_eq!(discovery.skipped_filtered, 2);
    assert_eq!(discovery.files[0].language, Some(Language::TypeScript));
    assert_eq!(discovery.files[1].language, Some(Language::Python));
}

#[test]
fn test_gitignore_and_project_ignore_file() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), ".gitignore", "generated/\n");
    write(dir.path(), ".strataignore", "*.test.py\n");
    write(dir.path(), "generated/out.py", "x = 1\n");
    write(dir.path(), "app.py", "x = 1\n");
    write(dir.path(), "app.test.py", "x = 1\n");

    assert_eq!(paths(dir.path(), &ScanConfig::default()), vec!["app.py"]);

    let config = ScanConfig {
        respect_gitignore: Some(false),
        ..ScanConfig::default()
    };
    assert_eq!(paths(dir.path(), &config), vec!["app.py", "generated/out.py"]);
}

#[test]
fn test_extra_ignore_globs() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "keep.go", "package main\n");
    write(dir.path(), "vendor/dep.go", "package dep\n");
    let config = ScanConfig {
        extra_ignore: vec!["vendor/**".to_string()],
        ..ScanConfig::default()
    };
    assert_eq!(paths(dir.path(), &config), vec!["keep.go"]);
}

#[test]
fn test_oversized_files_are_counted_not_listed() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "small.rs", "fn a() {}\n");
    write(dir.path(), "big.rs", &"// padding\n".repeat(200));
    let config = ScanConfig {
        max_file_size: Some(100),
        ..ScanConfig::default()
    };
    let discovery = discover(
        dir.path(),
        &config,
        &dir.path().join(".strata"),
        &CancellationToken::new(),
    )
    .unwrap();
    assert_eq!(discovery.files.len(), 1);
    assert_eq!(discovery.skipped_large, 1);
}

#[test]
fn test_missing_root_and_cancellation() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("nope");
    let err = discover(&missing, &ScanConfig::default(), &missing, &CancellationToken::new())
        .unwrap_err();
    assert!(matches!(err, ScanError::RootNotFound { .. }));

    write(dir.path(), "a.py", "x = 1\n");
    let cancel = CancellationToken::cancelled();
    let err = discover(dir.path(), &ScanConfig::default(), &dir.path().join(".strata"), &cancel)
        .unwrap_err();
    assert!(matches!(err, ScanError::Cancelled));
}

#[test]
fn test_unknown_extensions_have_no_language() {
    assert_eq!(Language::from_extension(Some("txt")), None);
    assert_eq!(Language::from_extension(None), None);
    assert_eq!(Language::from_extension(Some("kt")), Some(Language::Kotlin));
    for lang in Language::all() {
        for ext in lang.extensions() {
            assert_eq!(Language::from_extension(Some(*ext)), Some(*lang), "{ext}");
        }
    }
}

// ---- Classification ----

#[test]
fn test_classify_against_stored_fingerprints() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "same.py", "a = 1\n");
    write(dir.path(), "edited.py", "b = 2\n");
    write(dir.path(), "fresh.py", "c = 3\n");
    let stored = vec![
        fingerprint("edited.py", "b = 1\n"),
        fingerprint("gone.py", "d = 4\n"),
        fingerprint("same.py", "a = 1\n"),
    ];

    let discovery = discover(
        dir.path(),
        &ScanConfig::default(),
        &dir.path().join(".strata"),
        &CancellationToken::new(),
    )
    .unwrap();
    let changes = classify(discovery, &stored, FingerprintModeUsed::Hash);

    let class_of = |p: &str| {
        changes
            .files
            .iter()
            .find(|f| f.file.path == p)
            .map(|f| f.class)
            .unwrap()
    };
    assert_eq!(class_of("same.py"), FileClass::Unchanged);
    assert_eq!(class_of("edited.py"), FileClass::Changed);
    assert_eq!(class_of("fresh.py"), FileClass::New);
    assert_eq!(changes.deleted.len(), 1);
    assert_eq!(changes.deleted[0].path, "gone.py");
    assert!(!changes.is_clean());
    assert_eq!(changes.to_parse().count(), 2);

    // stored mtime is 0, so the unchanged file counts as touched
    let same = changes.files.iter().find(|f| f.file.path == "same.py").unwrap();
    assert!(same.mtime_moved);
}

#[test]
fn test_clean_tree_is_clean() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "a.py", "a = 1\n");
    let stored = vec![fingerprint("a.py", "a = 1\n")];
    let discovery = discover(
        dir.path(),
        &ScanConfig::default(),
        &dir.path().join(".strata"),
        &CancellationToken::new(),
    )
    .unwrap();
    let changes = classify(discovery, &stored, FingerprintModeUsed::Hash);
    assert!(changes.is_clean());
    assert_eq!(changes.count(FileClass::Unchanged), 1);
}
