//! Schema migrations using PRAGMA user_version.
//!
//! Migrations are additive only: new tables, new columns with defaults,
//! new indexes. Each one runs in its own transaction together with the
//! `user_version` bump, so a failed migration leaves the store exactly as
//! it was.

pub mod v001_initial;
pub mod v002_signals;
pub mod v003_symbol_complexity;

use rusqlite::Connection;
use strata_core::errors::StorageError;

use crate::connection::writer::with_immediate_transaction;
use crate::queries::util::sqlite_err;

/// Ordered migration list. The last entry is the supported schema version.
pub const MIGRATIONS: &[(&str, u32)] = &[
    (v001_initial::MIGRATION_SQL, 1),
    (v002_signals::MIGRATION_SQL, 2),
    (v003_symbol_complexity::MIGRATION_SQL, 3),
];

/// Highest schema version this build understands.
pub fn latest_version() -> u32 {
    MIGRATIONS.last().map(|(_, v)| *v).unwrap_or(0)
}

/// Refuse stores written by a newer build.
pub fn check_supported(conn: &Connection) -> Result<(), StorageError> {
    let found = current_version(conn)?;
    let supported = latest_version();
    if found > supported {
        return Err(StorageError::SchemaMismatch { found, supported });
    }
    Ok(())
}

/// Run all pending migrations.
pub fn run_migrations(conn: &Connection) -> Result<(), StorageError> {
    run_migration_list(conn, MIGRATIONS)
}

/// Run pending migrations from an explicit list.
pub fn run_migration_list(conn: &Connection, migrations: &[(&str, u32)]) -> Result<(), StorageError> {
    let current_version: u32 = conn
        .pragma_query_value(None, "user_version", |row| row.get(0))
        .map_err(|e| StorageError::MigrationFailed {
            version: 0,
            message: e.to_string(),
        })?;

    for (sql, version) in migrations {
        if current_version < *version {
            with_immediate_transaction(conn, |tx| {
                tx.execute_batch(sql).map_err(|e| StorageError::MigrationFailed {
                    version: *version,
                    message: e.to_string(),
                })?;
                tx.pragma_update(None, "user_version", version)
                    .map_err(|e| StorageError::MigrationFailed {
                        version: *version,
                        message: e.to_string(),
                    })
            })?;
            tracing::info!(version = version, "applied migration");
        }
    }

    Ok(())
}

/// Get the current schema version.
pub fn current_version(conn: &Connection) -> Result<u32, StorageError> {
    conn.pragma_query_value(None, "user_version", |row| row.get(0))
        .map_err(sqlite_err)
}
