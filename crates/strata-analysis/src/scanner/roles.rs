//! File role classification.
//!
//! Three tiers, cheapest first: directory patterns on the relative path,
//! filename and extension rules, then generated-code markers in the first
//! kilobyte of content. Content markers only ever promote a file to
//! `generated`; shebangs mark scripts when nothing else matched.

use std::sync::LazyLock;

use aho_corasick::{AhoCorasick, AhoCorasickBuilder, MatchKind};
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Role of a tracked file within the repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileRole {
    Source,
    Test,
    Config,
    Build,
    Docs,
    Generated,
    Vendored,
    Data,
    Examples,
    Scripts,
    Ci,
}

impl FileRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            FileRole::Source => "source",
            FileRole::Test => "test",
            FileRole::Config => "config",
            FileRole::Build => "build",
            FileRole::Docs => "docs",
            FileRole::Generated => "generated",
            FileRole::Vendored => "vendored",
            FileRole::Data => "data",
            FileRole::Examples => "examples",
            FileRole::Scripts => "scripts",
            FileRole::Ci => "ci",
        }
    }
}

impl std::fmt::Display for FileRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Bytes of content inspected for generated-code markers.
pub const CONTENT_PROBE_BYTES: usize = 1024;

const MINIFIED_AVG_LINE: usize = 110;

const DIR_RULES: &[(&str, FileRole)] = &[
    (".github", FileRole::Ci),
    (".circleci", FileRole::Ci),
    (".gitlab-ci", FileRole::Ci),
    (".gitlab", FileRole::Ci),
    ("vendor", FileRole::Vendored),
    ("node_modules", FileRole::Vendored),
    ("third_party", FileRole::Vendored),
    ("third-party", FileRole::Vendored),
    ("extern", FileRole::Vendored),
    ("external", FileRole::Vendored),
    ("tests", FileRole::Test),
    ("test", FileRole::Test),
    ("__tests__", FileRole::Test),
    ("spec", FileRole::Test),
    ("testing", FileRole::Test),
    ("docs", FileRole::Docs),
    ("doc", FileRole::Docs),
    ("documentation", FileRole::Docs),
    ("examples", FileRole::Examples),
    ("example", FileRole::Examples),
    ("samples", FileRole::Examples),
    ("sample", FileRole::Examples),
    ("scripts", FileRole::Scripts),
    ("bin", FileRole::Scripts),
    ("dev", FileRole::Scripts),
    ("build", FileRole::Build),
    ("dist", FileRole::Build),
    ("out", FileRole::Build),
    ("target", FileRole::Build),
];

static DIR_PATTERNS: LazyLock<Vec<(Regex, FileRole)>> = LazyLock::new(|| {
    DIR_RULES
        .iter()
        .filter_map(|(dir, role)| {
            Regex::new(&format!(r"(^|/){}/", regex::escape(dir)))
                .ok()
                .map(|re| (re, *role))
        })
        .collect()
});

const BUILD_FILENAMES: &[&str] = &[
    "makefile",
    "dockerfile",
    "jenkinsfile",
    "vagrantfile",
    "rakefile",
    "gulpfile.js",
    "gruntfile.js",
    "webpack.config.js",
    "webpack.config.ts",
    "rollup.config.js",
    "rollup.config.ts",
    "vite.config.js",
    "vite.config.ts",
    "cmakelists.txt",
    "build.gradle",
    "build.gradle.kts",
    "pom.xml",
    "justfile",
    "taskfile.yml",
    "taskfile.yaml",
    "tiltfile",
    "procfile",
];

const DOC_PREFIXES: &[&str] = &[
    "readme",
    "license",
    "licence",
    "changelog",
    "contributing",
    "authors",
    "history",
    "copying",
    "code_of_conduct",
];

static NAME_PATTERNS: LazyLock<Vec<(Regex, FileRole)>> = LazyLock::new(|| {
    [
        (r"^\.gitlab-ci\.yml$", FileRole::Ci),
        (r"^\.travis\.yml$", FileRole::Ci),
        (r"^appveyor\.yml$", FileRole::Ci),
        (r"^azure-pipelines\.yml$", FileRole::Ci),
        (r"^bitbucket-pipelines\.yml$", FileRole::Ci),
        (r"^cloudbuild\.yaml$", FileRole::Ci),
        (r"^\.drone\.yml$", FileRole::Ci),
        (r"^codecov\.yml$", FileRole::Ci),
        (r"^\.coveragerc$", FileRole::Ci),
        (r"^.*\.generated\.\w+$", FileRole::Generated),
        (r"^.*\.g\.\w+$", FileRole::Generated),
        (r"^.*\.pb\.go$", FileRole::Generated),
        (r"^.*_pb2\.py$", FileRole::Generated),
        (r"^.*\.pb\.h$", FileRole::Generated),
        (r"^.*\.pb\.cc$", FileRole::Generated),
        (r"^.*\.min\.\w+$", FileRole::Generated),
        (r"^.*\.lock$", FileRole::Config),
        (r"^.*-lock\.\w+$", FileRole::Config),
    ]
    .iter()
    .filter_map(|(pat, role)| Regex::new(pat).ok().map(|re| (re, *role)))
    .collect()
});

static TEST_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"^test_.*\.py$",
        r"^.*_test\.py$",
        r"^conftest\.py$",
        r"^.*_test\.go$",
        r"^.*\.test\.[jt]sx?$",
        r"^.*\.spec\.[jt]sx?$",
        r"^.*Tests?\.java$",
        r"^.*Tests?\.kt$",
        r"^.*Tests?\.cs$",
        r"^.*_spec\.rb$",
        r"^.*Test\.php$",
        r"^.*(?:Test|Spec)\.scala$",
        r"^.*_test\.rs$",
        r"^.*Tests?\.swift$",
    ]
    .iter()
    .filter_map(|pat| Regex::new(pat).ok())
    .collect()
});

const DOC_EXTENSIONS: &[&str] = &["md", "rst", "adoc", "asciidoc", "txt"];

const CONFIG_EXTENSIONS: &[&str] = &[
    "json", "yaml", "yml", "toml", "ini", "cfg", "conf", "properties", "env", "editorconfig",
    "xml",
];

const CONFIG_FILENAMES: &[&str] = &[
    ".gitignore",
    ".gitattributes",
    ".dockerignore",
    ".eslintrc",
    ".prettierrc",
    ".babelrc",
    ".flake8",
    ".pylintrc",
    "setup.cfg",
    "pyproject.toml",
    "setup.py",
    "package.json",
    "tsconfig.json",
    "jsconfig.json",
    "tox.ini",
    "mypy.ini",
    "pytest.ini",
    "cargo.toml",
    "go.mod",
    "go.sum",
    "gemfile",
    "composer.json",
    "requirements.txt",
    "constraints.txt",
    "pipfile",
];

const DATA_EXTENSIONS: &[&str] = &[
    "png", "jpg", "jpeg", "gif", "svg", "ico", "bmp", "webp", "tiff", "tif", "psd", "mp3", "mp4",
    "wav", "ogg", "flac", "avi", "mov", "mkv", "woff", "woff2", "ttf", "eot", "otf", "zip", "tar",
    "gz", "bz2", "xz", "7z", "rar", "pdf", "doc", "docx", "xls", "xlsx", "ppt", "pptx", "csv",
    "tsv", "parquet", "avro", "db", "sqlite", "sqlite3", "bin", "dat", "pak", "wasm", "exe", "dll",
    "so", "dylib", "o", "a", "lib", "pyc", "pyo", "class", "jar",
];

const GENERATED_MARKERS: &[&str] = &[
    "do not edit",
    "generated by",
    "auto-generated",
    "@generated",
    "generated file",
    "this file is generated",
    "machine generated",
    "code generated",
    "automatically generated",
];

static MARKER_MATCHER: LazyLock<Option<AhoCorasick>> = LazyLock::new(|| {
    AhoCorasickBuilder::new()
        .ascii_case_insensitive(true)
        .match_kind(MatchKind::LeftmostFirst)
        .build(GENERATED_MARKERS)
        .ok()
});

fn dir_role(path: &str) -> Option<FileRole> {
    DIR_PATTERNS
        .iter()
        .find(|(re, _)| re.is_match(path))
        .map(|(_, role)| *role)
}

fn name_role(basename: &str, ext: &str, path: &str) -> Option<FileRole> {
    let lower = basename.to_lowercase();
    if BUILD_FILENAMES.contains(&lower.as_str()) {
        return Some(FileRole::Build);
    }
    if let Some((_, role)) = NAME_PATTERNS.iter().find(|(re, _)| re.is_match(&lower)) {
        return Some(*role);
    }
    if DOC_PREFIXES.iter().any(|p| lower.starts_with(p)) {
        return Some(FileRole::Docs);
    }
    if TEST_PATTERNS.iter().any(|re| re.is_match(basename)) {
        return Some(FileRole::Test);
    }
    if DATA_EXTENSIONS.contains(&ext) {
        return Some(FileRole::Data);
    }
    if DOC_EXTENSIONS.contains(&ext) {
        return Some(FileRole::Docs);
    }
    if CONFIG_FILENAMES.contains(&lower.as_str()) {
        return Some(FileRole::Config);
    }
    if CONFIG_EXTENSIONS.contains(&ext) {
        return match dir_role(path) {
            Some(r @ (FileRole::Test | FileRole::Vendored)) => Some(r),
            _ => Some(FileRole::Config),
        };
    }
    None
}

fn content_role(head: &[u8], ext: &str) -> Option<FileRole> {
    if let Some(matcher) = MARKER_MATCHER.as_ref() {
        if matcher.is_match(head) {
            return Some(FileRole::Generated);
        }
    }
    let text = String::from_utf8_lossy(head);
    let mut lines = text.lines();
    if let Some(first) = lines.next() {
        if first.starts_with("#!") && first.contains('/') {
            return Some(FileRole::Scripts);
        }
    }
    if ext == "js" || ext == "css" {
        let non_empty: Vec<&str> = text.lines().filter(|l| !l.trim().is_empty()).collect();
        if !non_empty.is_empty() {
            let avg = non_empty.iter().map(|l| l.len()).sum::<usize>() / non_empty.len();
            if avg > MINIFIED_AVG_LINE {
                return Some(FileRole::Generated);
            }
        }
    }
    None
}

/// Classify a forward-slash relative path, optionally with a content head.
pub fn classify_role(path: &str, head: Option<&[u8]>) -> FileRole {
    let basename = path.rsplit('/').next().unwrap_or(path);
    let ext = basename
        .rsplit_once('.')
        .map(|(_, e)| e.to_ascii_lowercase())
        .unwrap_or_default();

    let from_content = head.and_then(|h| content_role(&h[..h.len().min(CONTENT_PROBE_BYTES)], &ext));
    if from_content == Some(FileRole::Generated) {
        return FileRole::Generated;
    }

    let from_dir = dir_role(path);
    if matches!(from_dir, Some(FileRole::Vendored) | Some(FileRole::Test)) {
        return from_dir.unwrap_or(FileRole::Source);
    }

    let from_name = name_role(basename, &ext, path);
    if from_name == Some(FileRole::Test) {
        return FileRole::Test;
    }
    if from_dir == Some(FileRole::Ci) || from_name == Some(FileRole::Ci) {
        return FileRole::Ci;
    }
    if from_dir == Some(FileRole::Build) || from_name == Some(FileRole::Build) {
        return FileRole::Build;
    }
    from_name
        .or(from_dir)
        .or(from_content)
        .unwrap_or(FileRole::Source)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_source() {
        assert_eq!(classify_role("src/app/main.py", None), FileRole::Source);
        assert_eq!(classify_role("a.py", Some(b"def foo(): pass\n")), FileRole::Source);
    }

    #[test]
    fn directory_rules_win_in_priority_order() {
        assert_eq!(classify_role("vendor/lib/x.go", None), FileRole::Vendored);
        assert_eq!(classify_role("tests/util.py", None), FileRole::Test);
        assert_eq!(classify_role(".github/workflows/ci.yml", None), FileRole::Ci);
        assert_eq!(classify_role("docs/guide/intro.py", None), FileRole::Docs);
        assert_eq!(classify_role("dist/bundle.js", None), FileRole::Build);
    }

    #[test]
    fn filename_rules() {
        assert_eq!(classify_role("pkg/foo_test.go", None), FileRole::Test);
        assert_eq!(classify_role("src/Widget.test.tsx", None), FileRole::Test);
        assert_eq!(classify_role("Makefile", None), FileRole::Build);
        assert_eq!(classify_role("README.md", None), FileRole::Docs);
        assert_eq!(classify_role("api/service_pb2.py", None), FileRole::Generated);
        assert_eq!(classify_role("config/app.yaml", None), FileRole::Config);
        assert_eq!(classify_role("tests/fixtures/data.json", None), FileRole::Test);
        assert_eq!(classify_role("assets/logo.png", None), FileRole::Data);
    }

    #[test]
    fn content_markers_are_case_insensitive() {
        let head = b"// Code generated by protoc-gen-go. DO NOT EDIT.\npackage api\n";
        assert_eq!(classify_role("api/service.go", Some(head)), FileRole::Generated);
        assert_eq!(
            classify_role("lib/x.rs", Some(b"// @Generated\nfn a() {}\n")),
            FileRole::Generated
        );
    }

    #[test]
    fn shebang_marks_scripts_only_as_fallback() {
        assert_eq!(
            classify_role("tool", Some(b"#!/usr/bin/env python\nprint(1)\n")),
            FileRole::Scripts
        );
        assert_eq!(
            classify_role("tests/tool", Some(b"#!/usr/bin/env python\n")),
            FileRole::Test
        );
    }
}
