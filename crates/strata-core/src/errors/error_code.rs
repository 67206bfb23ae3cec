//! Stable machine-readable codes for every error enum.

/// Maps an error to a code that stays fixed across releases, so stored
/// run failures and callers can branch without parsing messages.
pub trait StrataErrorCode {
    fn error_code(&self) -> &'static str;

    /// `[CODE] message`, the form written to the runs table.
    fn tagged(&self) -> String
    where
        Self: std::fmt::Display,
    {
        format!("[{}] {self}", self.error_code())
    }
}

// discovery and extraction
pub const SCAN_ERROR: &str = "SCAN_ERROR";
pub const PARSE_ERROR: &str = "PARSE_ERROR";
pub const UNSUPPORTED_LANGUAGE: &str = "UNSUPPORTED_LANGUAGE";

// store
pub const STORAGE_ERROR: &str = "STORAGE_ERROR";
pub const DB_BUSY: &str = "DB_BUSY";
pub const DB_CORRUPT: &str = "DB_CORRUPT";
pub const DISK_FULL: &str = "DISK_FULL";
pub const MIGRATION_FAILED: &str = "MIGRATION_FAILED";
pub const SCHEMA_MISMATCH: &str = "SCHEMA_MISMATCH";

// run coordination
pub const CONCURRENT_RUN: &str = "CONCURRENT_RUN_CONFLICT";
pub const STALE_LOCK: &str = "STALE_LOCK";
pub const LOCK_ERROR: &str = "LOCK_ERROR";
pub const CANCELLED: &str = "CANCELLED";
pub const PIPELINE_ERROR: &str = "PIPELINE_ERROR";

pub const CONFIG_ERROR: &str = "CONFIG_ERROR";
pub const HISTORY_ERROR: &str = "HISTORY_ERROR";
pub const GRAPH_ERROR: &str = "GRAPH_ERROR";
