//! Storage errors.

use super::error_code::{self, StrataErrorCode};

/// Errors from the SQLite graph store.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("SQLite error: {message}")]
    SqliteError { message: String },

    #[error("Database busy (another writer holds the lock)")]
    DbBusy,

    #[error("Database corrupt: {details}")]
    DbCorrupt { details: String },

    #[error("Disk full")]
    DiskFull,

    #[error("Migration to v{version} failed: {message}")]
    MigrationFailed { version: u32, message: String },

    #[error("Store schema v{found} is newer than supported v{supported}")]
    SchemaMismatch { found: u32, supported: u32 },

    #[error("Id collision on {table} for id {id}")]
    IdCollision { table: String, id: i64 },

    #[error("Integrity violation: {message}")]
    Integrity { message: String },
}

impl StrataErrorCode for StorageError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::DbBusy => error_code::DB_BUSY,
            Self::DbCorrupt { .. } => error_code::DB_CORRUPT,
            Self::DiskFull => error_code::DISK_FULL,
            Self::MigrationFailed { .. } => error_code::MIGRATION_FAILED,
            Self::SchemaMismatch { .. } => error_code::SCHEMA_MISMATCH,
            _ => error_code::STORAGE_ERROR,
        }
    }
}
