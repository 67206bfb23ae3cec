//! Connection management: write-serialized + read-pooled.

pub mod pool;
pub mod pragmas;
pub mod writer;

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use rusqlite::{Connection, Transaction};
use strata_core::errors::StorageError;

use self::pool::ReadPool;
use self::pragmas::{configure, Role};
use crate::migrations;
use crate::queries::util::sqlite_err;

/// Owns the single write connection and the read connection pool.
///
/// The active indexing run is the only writer. Query consumers use
/// `with_reader`, which never sees uncommitted staging writes and never
/// blocks the writer under WAL.
pub struct DatabaseManager {
    writer: Mutex<Connection>,
    readers: ReadPool,
    path: Option<PathBuf>,
}

impl DatabaseManager {
    /// Open a database at the given path, apply pragmas, run migrations.
    ///
    /// A store written by a newer schema is refused before anything is
    /// written to it.
    pub fn open(path: &Path) -> Result<Self, StorageError> {
        Self::open_with_pool(path, ReadPool::default_size())
    }

    /// Open with an explicit read pool size.
    pub fn open_with_pool(path: &Path, pool_size: usize) -> Result<Self, StorageError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| StorageError::SqliteError {
                    message: format!("create {}: {e}", parent.display()),
                })?;
            }
        }
        let writer = Connection::open(path).map_err(sqlite_err)?;
        migrations::check_supported(&writer)?;
        configure(&writer, Role::Writer)?;
        migrations::run_migrations(&writer)?;

        let readers = ReadPool::open(path, pool_size)?;

        Ok(Self {
            writer: Mutex::new(writer),
            readers,
            path: Some(path.to_path_buf()),
        })
    }

    /// Open an in-memory database (for testing).
    ///
    /// Readers cannot share an in-memory database, so `with_reader` is
    /// routed to the writer connection.
    pub fn open_in_memory() -> Result<Self, StorageError> {
        let writer = Connection::open_in_memory().map_err(sqlite_err)?;
        configure(&writer, Role::Writer)?;
        migrations::run_migrations(&writer)?;

        let readers = ReadPool::open_in_memory(1)?;

        Ok(Self {
            writer: Mutex::new(writer),
            readers,
            path: None,
        })
    }

    /// Execute a write operation with the serialized writer connection.
    pub fn with_writer<F, T>(&self, f: F) -> Result<T, StorageError>
    where
        F: FnOnce(&Connection) -> Result<T, StorageError>,
    {
        let guard = self.lock_writer()?;
        f(&guard)
    }

    /// Run `f` inside one BEGIN IMMEDIATE transaction on the writer.
    /// Nothing `f` writes becomes visible unless it returns `Ok`.
    pub fn with_staging<F, T, E>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(&Transaction<'_>) -> Result<T, E>,
        E: From<StorageError>,
    {
        let guard = self.lock_writer()?;
        writer::with_immediate_transaction_as(&guard, f)
    }

    fn lock_writer(&self) -> Result<std::sync::MutexGuard<'_, Connection>, StorageError> {
        self.writer.lock().map_err(|_| StorageError::SqliteError {
            message: "write lock poisoned".to_string(),
        })
    }

    /// Execute a read operation with a pooled read connection.
    pub fn with_reader<F, T>(&self, f: F) -> Result<T, StorageError>
    where
        F: FnOnce(&Connection) -> Result<T, StorageError>,
    {
        if self.path.is_none() {
            return self.with_writer(f);
        }
        self.readers.with_conn(f)
    }

    /// Checkpoint the WAL and refresh planner statistics after a
    /// committed run.
    pub fn checkpoint(&self) -> Result<(), StorageError> {
        self.with_writer(pragmas::settle)
    }

    /// Get the database file path (None for in-memory).
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}
