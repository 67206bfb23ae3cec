//! Read-only connections shared by query consumers.

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, TryLockError};

use rusqlite::{Connection, OpenFlags};
use strata_core::errors::StorageError;

use super::pragmas::{configure, Role};
use crate::queries::util::sqlite_err;

const DEFAULT_READERS: usize = 4;
const MAX_READERS: usize = 8;

/// Fixed set of reader connections.
///
/// A caller first takes any idle reader, scanning from a rotating start
/// slot, and only waits when every reader is busy.
pub struct ReadPool {
    slots: Vec<Mutex<Connection>>,
    cursor: AtomicUsize,
}

impl ReadPool {
    /// Open `readers` query-only connections on the store at `path`.
    /// The count is clamped to `1..=8`.
    pub fn open(path: &Path, readers: usize) -> Result<Self, StorageError> {
        let flags = OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        Self::build(readers, || {
            let conn = Connection::open_with_flags(path, flags).map_err(sqlite_err)?;
            configure(&conn, Role::Reader)?;
            Ok(conn)
        })
    }

    /// Readers over private in-memory databases. Only useful as a
    /// placeholder when the store itself is in memory.
    pub fn open_in_memory(readers: usize) -> Result<Self, StorageError> {
        Self::build(readers, || Connection::open_in_memory().map_err(sqlite_err))
    }

    fn build(
        readers: usize,
        mut connect: impl FnMut() -> Result<Connection, StorageError>,
    ) -> Result<Self, StorageError> {
        let slots = (0..readers.clamp(1, MAX_READERS))
            .map(|_| connect().map(Mutex::new))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            slots,
            cursor: AtomicUsize::new(0),
        })
    }

    /// Run `f` on a reader.
    pub fn with_conn<F, T>(&self, f: F) -> Result<T, StorageError>
    where
        F: FnOnce(&Connection) -> Result<T, StorageError>,
    {
        let guard = self.acquire()?;
        f(&guard)
    }

    fn acquire(&self) -> Result<MutexGuard<'_, Connection>, StorageError> {
        let n = self.slots.len();
        let start = self.cursor.fetch_add(1, Ordering::Relaxed) % n;
        for offset in 0..n {
            match self.slots[(start + offset) % n].try_lock() {
                Ok(guard) => return Ok(guard),
                Err(TryLockError::WouldBlock) => continue,
                Err(TryLockError::Poisoned(_)) => return Err(poisoned()),
            }
        }
        self.slots[start].lock().map_err(|_| poisoned())
    }

    /// Number of reader connections.
    pub fn size(&self) -> usize {
        self.slots.len()
    }

    /// Reader count used when the configuration leaves it unset.
    pub fn default_size() -> usize {
        DEFAULT_READERS
    }
}

fn poisoned() -> StorageError {
    StorageError::SqliteError {
        message: "reader connection poisoned".to_string(),
    }
}
