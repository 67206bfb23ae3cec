//! Per-repository run lock.
//!
//! `<index_dir>/index.lock` is held with an exclusive advisory lock for the
//! whole run, and carries a `pid started_at` record while held. A clean
//! release truncates the record. The OS drops the advisory lock when its
//! owner dies, so an acquirable lock with a leftover record means the
//! previous run never finished; that state is reported and left for an
//! operator to clear.

use std::fs::{File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use strata_core::constants::LOCK_FILE_NAME;
use strata_core::errors::LockError;
use strata_storage::queries::util::unix_now;

/// Who holds (or last held) the lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockRecord {
    pub pid: Option<u32>,
    pub started_at: Option<i64>,
}

impl LockRecord {
    fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        let mut parts = text.split_whitespace();
        let pid = parts.next().and_then(|p| p.parse().ok());
        let started_at = parts.next().and_then(|t| t.parse().ok());
        Some(Self { pid, started_at })
    }
}

pub struct RunLock {
    path: PathBuf,
    lock: fd_lock::RwLock<File>,
}

impl RunLock {
    /// Open (creating if needed) the lock file under `index_dir`.
    pub fn open(index_dir: &Path) -> Result<Self, LockError> {
        let path = index_dir.join(LOCK_FILE_NAME);
        std::fs::create_dir_all(index_dir).map_err(|e| io_err(&path, e))?;
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)
            .map_err(|e| io_err(&path, e))?;
        Ok(Self {
            path,
            lock: fd_lock::RwLock::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Hold the lock for the duration of `f`.
    ///
    /// Fails fast with `ConcurrentRunConflict` when another run holds it,
    /// and with `StaleLock` when a previous owner left its record behind.
    /// If `f` panics the record is left in place and the next run reports
    /// a stale lock.
    pub fn hold<T>(&mut self, f: impl FnOnce() -> T) -> Result<T, LockError> {
        let path = self.path.clone();
        let mut guard = match self.lock.try_write() {
            Ok(guard) => guard,
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => {
                let pid = read_record(&path).and_then(|r| r.pid);
                return Err(LockError::ConcurrentRunConflict { path, pid });
            }
            Err(e) => return Err(io_err(&path, e)),
        };

        let mut existing = String::new();
        guard.seek(SeekFrom::Start(0)).map_err(|e| io_err(&path, e))?;
        guard
            .read_to_string(&mut existing)
            .map_err(|e| io_err(&path, e))?;
        if let Some(record) = LockRecord::parse(&existing) {
            tracing::warn!(path = %path.display(), pid = ?record.pid, "stale run lock");
            return Err(LockError::StaleLock {
                path,
                pid: record.pid,
            });
        }

        let record = format!("{} {}\n", std::process::id(), unix_now());
        write_from_start(&mut guard, record.as_bytes()).map_err(|e| io_err(&path, e))?;

        let out = f();

        write_from_start(&mut guard, b"").map_err(|e| io_err(&path, e))?;
        Ok(out)
    }

    /// The record left by a run that did not release the lock, if any.
    /// Returns `None` while a live run holds it.
    pub fn stale_record(index_dir: &Path) -> Result<Option<LockRecord>, LockError> {
        let mut lock = Self::open(index_dir)?;
        let path = lock.path.clone();
        let held = match lock.lock.try_write() {
            Ok(guard) => guard,
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => return Ok(None),
            Err(e) => return Err(io_err(&path, e)),
        };
        drop(held);
        Ok(read_record(&path))
    }

    /// Operator action: discard a stale record. Returns whether one was
    /// cleared. A lock held by a live run is never touched.
    pub fn clear_stale(index_dir: &Path) -> Result<bool, LockError> {
        let mut lock = Self::open(index_dir)?;
        let path = lock.path.clone();
        let mut guard = match lock.lock.try_write() {
            Ok(guard) => guard,
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => {
                let pid = read_record(&path).and_then(|r| r.pid);
                return Err(LockError::ConcurrentRunConflict { path, pid });
            }
            Err(e) => return Err(io_err(&path, e)),
        };
        let Some(record) = read_record(&path) else {
            return Ok(false);
        };
        write_from_start(&mut guard, b"").map_err(|e| io_err(&path, e))?;
        tracing::info!(path = %path.display(), pid = ?record.pid, "cleared stale run lock");
        Ok(true)
    }
}

impl std::fmt::Debug for RunLock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RunLock").field("path", &self.path).finish()
    }
}

fn read_record(path: &Path) -> Option<LockRecord> {
    std::fs::read_to_string(path)
        .ok()
        .and_then(|text| LockRecord::parse(&text))
}

fn write_from_start(file: &mut File, bytes: &[u8]) -> io::Result<()> {
    file.set_len(0)?;
    file.seek(SeekFrom::Start(0))?;
    file.write_all(bytes)?;
    file.sync_data()
}

fn io_err(path: &Path, source: io::Error) -> LockError {
    LockError::Io {
        path: path.to_path_buf(),
        source,
    }
}
