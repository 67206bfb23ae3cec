//! v002: derived analytics, history and snapshot tables. Additive only.

pub const MIGRATION_SQL: &str = r#"
-- Per-symbol analytics, replaced wholesale by each analytics pass.
CREATE TABLE IF NOT EXISTS symbol_metrics (
    symbol_id INTEGER PRIMARY KEY REFERENCES symbols(id) ON DELETE CASCADE,
    in_degree INTEGER NOT NULL,
    out_degree INTEGER NOT NULL,
    pagerank REAL NOT NULL,
    betweenness REAL NOT NULL,
    closeness REAL NOT NULL,
    eigenvector REAL NOT NULL,
    scc_id INTEGER,
    community_id INTEGER NOT NULL,
    layer INTEGER NOT NULL,
    partition INTEGER NOT NULL,
    is_god INTEGER NOT NULL DEFAULT 0,
    is_bottleneck INTEGER NOT NULL DEFAULT 0,
    run_id INTEGER NOT NULL
) STRICT;

CREATE INDEX IF NOT EXISTS idx_symbol_metrics_pagerank ON symbol_metrics(pagerank DESC);

CREATE TABLE IF NOT EXISTS communities (
    community_id INTEGER PRIMARY KEY,
    size INTEGER NOT NULL,
    conductance REAL NOT NULL,
    run_id INTEGER NOT NULL
) STRICT;

CREATE TABLE IF NOT EXISTS layer_violations (
    source_id INTEGER NOT NULL REFERENCES symbols(id) ON DELETE CASCADE,
    target_id INTEGER NOT NULL REFERENCES symbols(id) ON DELETE CASCADE,
    source_layer INTEGER NOT NULL,
    target_layer INTEGER NOT NULL,
    severity REAL NOT NULL,
    run_id INTEGER NOT NULL,
    PRIMARY KEY (source_id, target_id)
) STRICT, WITHOUT ROWID;

-- Per-file history signals and health.
CREATE TABLE IF NOT EXISTS file_stats (
    file_id INTEGER PRIMARY KEY REFERENCES files(id) ON DELETE CASCADE,
    commit_count INTEGER NOT NULL DEFAULT 0,
    churn INTEGER NOT NULL DEFAULT 0,
    distinct_authors INTEGER NOT NULL DEFAULT 0,
    top_owner TEXT,
    owner_share REAL NOT NULL DEFAULT 0,
    cochange_entropy REAL NOT NULL DEFAULT 0,
    health REAL NOT NULL DEFAULT 10,
    run_id INTEGER NOT NULL
) STRICT;

-- Raw commit facts, appended as HEAD advances.
CREATE TABLE IF NOT EXISTS git_commits (
    hash TEXT PRIMARY KEY,
    author TEXT NOT NULL,
    timestamp INTEGER NOT NULL,
    file_count INTEGER NOT NULL
) STRICT;

CREATE TABLE IF NOT EXISTS git_file_changes (
    commit_hash TEXT NOT NULL REFERENCES git_commits(hash) ON DELETE CASCADE,
    path TEXT NOT NULL,
    lines_added INTEGER NOT NULL,
    lines_removed INTEGER NOT NULL,
    PRIMARY KEY (commit_hash, path)
) STRICT, WITHOUT ROWID;

CREATE INDEX IF NOT EXISTS idx_git_file_changes_path ON git_file_changes(path);

CREATE TABLE IF NOT EXISTS history_state (
    id INTEGER PRIMARY KEY CHECK (id = 1),
    head TEXT NOT NULL,
    commits INTEGER NOT NULL,
    updated_at INTEGER NOT NULL
) STRICT;

-- Graph-level summary per committed run.
CREATE TABLE IF NOT EXISTS snapshots (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    run_id INTEGER NOT NULL,
    ts INTEGER NOT NULL,
    files INTEGER NOT NULL,
    symbols INTEGER NOT NULL,
    edges INTEGER NOT NULL,
    tangle_ratio REAL NOT NULL,
    cycles INTEGER NOT NULL,
    god_components INTEGER NOT NULL,
    bottlenecks INTEGER NOT NULL,
    layer_violations INTEGER NOT NULL,
    modularity REAL NOT NULL,
    spectral_gap REAL NOT NULL,
    propagation_cost REAL NOT NULL,
    propagation_tier TEXT NOT NULL,
    health_score REAL NOT NULL
) STRICT;
"#;
