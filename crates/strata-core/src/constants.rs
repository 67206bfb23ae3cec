//! Shared constants for the Strata index engine.

/// Strata version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Maximum file size in bytes for indexing (files above are skipped).
pub const DEFAULT_MAX_FILE_SIZE: u64 = 1_000_000;

/// Default number of parse threads (0 = auto-detect).
pub const DEFAULT_THREADS: usize = 0;

/// Default index directory, relative to the repository root.
pub const DEFAULT_INDEX_DIR: &str = ".strata";

/// Database file name inside the index directory.
pub const DB_FILE_NAME: &str = "index.db";

/// Run lock file name inside the index directory.
pub const LOCK_FILE_NAME: &str = "index.lock";

/// Project-level config file name.
pub const PROJECT_CONFIG_FILE: &str = "strata.toml";

/// Project-level ignore file, layered on top of `.gitignore`.
pub const IGNORE_FILE_NAME: &str = ".strataignore";

/// Default hash algorithm.
pub const DEFAULT_HASH_ALGORITHM: &str = "xxh3";

// ---- Batching ----

/// Bound parameters per statement for id-list queries.
/// Kept well under SQLite's compiled `SQLITE_MAX_VARIABLE_NUMBER`.
pub const MAX_SQL_PARAMS: usize = 400;

// ---- Analytics ----

/// Node count above which super-linear algorithms switch to sampling.
pub const DEFAULT_SIZE_GUARD: usize = 500;

/// Total degree above which a symbol is a god component.
pub const DEFAULT_GOD_DEGREE: usize = 20;

/// Minimum pivot count for sampled centrality and propagation cost.
pub const MIN_SAMPLE_SIZE: usize = 64;

/// Seed mixed into pivot selection so sampled runs are reproducible.
pub const SAMPLE_SEED: u64 = 42;

/// PageRank convergence tolerance (L1, scaled by node count).
pub const PAGERANK_TOLERANCE: f64 = 1e-6;

/// PageRank iteration cap.
pub const PAGERANK_MAX_ITER: usize = 100;

/// Eigenvector centrality iteration cap.
pub const EIGENVECTOR_MAX_ITER: usize = 300;

/// Eigenvector centrality tolerance.
pub const EIGENVECTOR_TOLERANCE: f64 = 1e-6;

// ---- History ----

/// Maximum commits walked per history refresh.
pub const DEFAULT_MAX_COMMITS: usize = 5000;

/// Commits touching more files than this are excluded from co-change.
pub const DEFAULT_MAX_FILES_PER_COMMIT: usize = 100;

// ---- Reporting ----

/// Sample paths kept per failure class in the run report.
pub const REPORT_SAMPLE_PATHS: usize = 10;

// ---- Supported Languages ----

/// Number of languages with a dedicated grammar.
pub const SUPPORTED_LANGUAGE_COUNT: usize = 10;

/// Languages with a dedicated grammar.
pub const SUPPORTED_LANGUAGES: [&str; SUPPORTED_LANGUAGE_COUNT] = [
    "typescript",
    "javascript",
    "python",
    "java",
    "csharp",
    "go",
    "rust",
    "ruby",
    "php",
    "kotlin",
];
