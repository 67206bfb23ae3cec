//! Connection settings for the index store.

use rusqlite::Connection;
use strata_core::errors::StorageError;

use crate::queries::util::sqlite_err;

/// Settings shared by the writer and every reader.
const SHARED: &[(&str, &str)] = &[
    ("cache_size", "-64000"),
    ("mmap_size", "268435456"),
    ("busy_timeout", "5000"),
    ("temp_store", "MEMORY"),
];

/// Writer-only settings. WAL lets readers see the last committed run while
/// a new one is staged.
const WRITER: &[(&str, &str)] = &[
    ("journal_mode", "WAL"),
    ("synchronous", "NORMAL"),
    ("foreign_keys", "ON"),
];

const READER: &[(&str, &str)] = &[("query_only", "ON")];

/// Which side of the store a connection serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Writer,
    Reader,
}

impl Role {
    fn settings(self) -> impl Iterator<Item = &'static (&'static str, &'static str)> {
        let own = match self {
            Role::Writer => WRITER,
            Role::Reader => READER,
        };
        own.iter().chain(SHARED.iter())
    }
}

fn render(role: Role) -> String {
    role.settings()
        .map(|(name, value)| format!("PRAGMA {name} = {value};\n"))
        .collect()
}

/// Configure a connection for `role`.
///
/// A writer opening a store with no tables yet also switches it to
/// incremental auto_vacuum, which SQLite only honours before the first
/// table is created.
pub fn configure(conn: &Connection, role: Role) -> Result<(), StorageError> {
    if role == Role::Writer && is_empty(conn)? {
        conn.execute_batch("PRAGMA auto_vacuum = INCREMENTAL;")
            .map_err(sqlite_err)?;
    }
    conn.execute_batch(&render(role))
        .map_err(|e| StorageError::SqliteError {
            message: format!("configure {role:?} connection: {e}"),
        })
}

fn is_empty(conn: &Connection) -> Result<bool, StorageError> {
    let tables: i64 = conn
        .query_row("SELECT count(*) FROM sqlite_master", [], |row| row.get(0))
        .map_err(sqlite_err)?;
    Ok(tables == 0)
}

/// Post-commit maintenance: fold the WAL back into the main file and let
/// SQLite refresh its planner statistics.
pub fn settle(conn: &Connection) -> Result<(), StorageError> {
    conn.execute_batch(
        "PRAGMA wal_checkpoint(TRUNCATE);
         PRAGMA analysis_limit = 400;
         PRAGMA optimize;",
    )
    .map_err(|e| StorageError::SqliteError {
        message: format!("post-commit maintenance: {e}"),
    })
}
