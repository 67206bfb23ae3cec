//! v001: files, symbols, edges, file_edges, cached references, runs,
//! metric snapshots.

pub const MIGRATION_SQL: &str = r#"
-- Tracked files. Rows are never deleted; removal sets removed_at.
CREATE TABLE IF NOT EXISTS files (
    id INTEGER PRIMARY KEY,
    path TEXT NOT NULL UNIQUE,
    language TEXT,
    hash TEXT NOT NULL,
    mtime INTEGER NOT NULL,
    mtime_nanos INTEGER NOT NULL DEFAULT 0,
    size INTEGER NOT NULL,
    role TEXT NOT NULL,
    line_count INTEGER NOT NULL DEFAULT 0,
    complexity REAL NOT NULL DEFAULT 0,
    parse_status TEXT NOT NULL,
    parse_errors INTEGER NOT NULL DEFAULT 0,
    removed_at INTEGER
) STRICT;

CREATE INDEX IF NOT EXISTS idx_files_live ON files(removed_at);

-- Symbols are retired and replaced with their file, never updated.
-- provenance = content hash of the producing file version.
CREATE TABLE IF NOT EXISTS symbols (
    id INTEGER PRIMARY KEY,
    file_id INTEGER NOT NULL REFERENCES files(id) ON DELETE CASCADE,
    ordinal INTEGER NOT NULL,
    name TEXT NOT NULL,
    qualified_name TEXT NOT NULL,
    kind TEXT NOT NULL,
    visibility TEXT NOT NULL,
    is_exported INTEGER NOT NULL DEFAULT 0,
    parent_id INTEGER,
    line_start INTEGER NOT NULL,
    line_end INTEGER NOT NULL,
    provenance TEXT NOT NULL,
    UNIQUE (file_id, ordinal)
) STRICT;

CREATE INDEX IF NOT EXISTS idx_symbols_name ON symbols(name);
CREATE INDEX IF NOT EXISTS idx_symbols_file ON symbols(file_id);

-- Resolved symbol-to-symbol edges.
-- alt_target_id holds the runner-up candidate of an ambiguous tie.
CREATE TABLE IF NOT EXISTS edges (
    source_id INTEGER NOT NULL REFERENCES symbols(id) ON DELETE CASCADE,
    target_id INTEGER NOT NULL REFERENCES symbols(id) ON DELETE CASCADE,
    kind TEXT NOT NULL,
    source_file_id INTEGER NOT NULL REFERENCES files(id) ON DELETE CASCADE,
    target_file_id INTEGER NOT NULL REFERENCES files(id) ON DELETE CASCADE,
    tier TEXT NOT NULL,
    confidence REAL NOT NULL,
    ambiguous INTEGER NOT NULL DEFAULT 0,
    alt_target_id INTEGER REFERENCES symbols(id) ON DELETE SET NULL,
    line INTEGER NOT NULL,
    provenance TEXT NOT NULL,
    PRIMARY KEY (source_id, target_id, kind)
) STRICT, WITHOUT ROWID;

CREATE INDEX IF NOT EXISTS idx_edges_target ON edges(target_id);
CREATE INDEX IF NOT EXISTS idx_edges_source_file ON edges(source_file_id);
CREATE INDEX IF NOT EXISTS idx_edges_target_file ON edges(target_file_id);
CREATE INDEX IF NOT EXISTS idx_edges_alt ON edges(alt_target_id);

-- File-level aggregation of cross-file symbol edges.
CREATE TABLE IF NOT EXISTS file_edges (
    source_file_id INTEGER NOT NULL REFERENCES files(id) ON DELETE CASCADE,
    target_file_id INTEGER NOT NULL REFERENCES files(id) ON DELETE CASCADE,
    weight INTEGER NOT NULL,
    kinds TEXT NOT NULL,
    PRIMARY KEY (source_file_id, target_file_id)
) STRICT, WITHOUT ROWID;

CREATE INDEX IF NOT EXISTS idx_file_edges_target ON file_edges(target_file_id);

-- Extracted references per live file, kept so unchanged neighbours can be
-- re-resolved without re-parsing.
CREATE TABLE IF NOT EXISTS refs (
    file_id INTEGER NOT NULL REFERENCES files(id) ON DELETE CASCADE,
    ordinal INTEGER NOT NULL,
    source_id INTEGER NOT NULL,
    target_name TEXT NOT NULL,
    qualifier TEXT,
    kind TEXT NOT NULL,
    line INTEGER NOT NULL,
    PRIMARY KEY (file_id, ordinal)
) STRICT, WITHOUT ROWID;

CREATE INDEX IF NOT EXISTS idx_refs_target ON refs(target_name);

-- One row per indexing attempt.
CREATE TABLE IF NOT EXISTS runs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    started_at INTEGER NOT NULL,
    finished_at INTEGER,
    root TEXT NOT NULL,
    status TEXT NOT NULL,
    phase TEXT NOT NULL,
    files_parsed INTEGER NOT NULL DEFAULT 0,
    duration_ms INTEGER,
    report_json TEXT,
    error TEXT
) STRICT;

-- Append-only trend history.
CREATE TABLE IF NOT EXISTS metric_snapshots (
    ts INTEGER NOT NULL,
    name TEXT NOT NULL,
    value REAL NOT NULL,
    run_id INTEGER NOT NULL
) STRICT;

CREATE INDEX IF NOT EXISTS idx_metric_snapshots_name_ts ON metric_snapshots(name, ts);
"#;
