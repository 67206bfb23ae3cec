//! files table queries.

use rusqlite::{params, Connection};
use strata_core::errors::StorageError;

use super::util::{collect_rows, sqlite_err, OptionalExt};
use crate::batching::batched_execute;

/// A tracked file row.
#[derive(Debug, Clone, PartialEq)]
pub struct FileRecord {
    pub id: i64,
    pub path: String,
    pub language: Option<String>,
    pub hash: String,
    pub mtime: i64,
    pub mtime_nanos: i64,
    pub size: i64,
    pub role: String,
    pub line_count: i64,
    pub complexity: f64,
    pub parse_status: String,
    pub parse_errors: i64,
    pub removed_at: Option<i64>,
}

/// Stored fingerprint of a live file, used by the change detector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileFingerprint {
    pub id: i64,
    pub path: String,
    pub hash: String,
    pub mtime: i64,
    pub mtime_nanos: i64,
    pub size: i64,
}

const FILE_COLUMNS: &str = "id, path, language, hash, mtime, mtime_nanos, size, role, line_count,
     complexity, parse_status, parse_errors, removed_at";

fn map_file(row: &rusqlite::Row<'_>) -> rusqlite::Result<FileRecord> {
    Ok(FileRecord {
        id: row.get(0)?,
        path: row.get(1)?,
        language: row.get(2)?,
        hash: row.get(3)?,
        mtime: row.get(4)?,
        mtime_nanos: row.get(5)?,
        size: row.get(6)?,
        role: row.get(7)?,
        line_count: row.get(8)?,
        complexity: row.get(9)?,
        parse_status: row.get(10)?,
        parse_errors: row.get(11)?,
        removed_at: row.get(12)?,
    })
}

/// Insert or replace a file row, clearing any removal mark.
pub fn upsert_file(conn: &Connection, file: &FileRecord) -> Result<(), StorageError> {
    conn.prepare_cached(
        "INSERT INTO files (id, path, language, hash, mtime, mtime_nanos, size, role,
                            line_count, complexity, parse_status, parse_errors, removed_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, NULL)
         ON CONFLICT(id) DO UPDATE SET
            language = excluded.language,
            hash = excluded.hash,
            mtime = excluded.mtime,
            mtime_nanos = excluded.mtime_nanos,
            size = excluded.size,
            role = excluded.role,
            line_count = excluded.line_count,
            complexity = excluded.complexity,
            parse_status = excluded.parse_status,
            parse_errors = excluded.parse_errors,
            removed_at = NULL",
    )
    .map_err(sqlite_err)?
    .execute(params![
        file.id,
        file.path,
        file.language,
        file.hash,
        file.mtime,
        file.mtime_nanos,
        file.size,
        file.role,
        file.line_count,
        file.complexity,
        file.parse_status,
        file.parse_errors,
    ])
    .map_err(sqlite_err)?;
    Ok(())
}

/// Refresh only the mtime of an unchanged file (touch-without-edit).
pub fn update_mtime(
    conn: &Connection,
    id: i64,
    mtime: i64,
    mtime_nanos: i64,
) -> Result<(), StorageError> {
    conn.execute(
        "UPDATE files SET mtime = ?1, mtime_nanos = ?2 WHERE id = ?3",
        params![mtime, mtime_nanos, id],
    )
    .map_err(sqlite_err)?;
    Ok(())
}

/// Mark files removed. Their rows stay for historical joins.
pub fn mark_removed(conn: &Connection, ids: &[i64], removed_at: i64) -> Result<usize, StorageError> {
    let template = format!("UPDATE files SET removed_at = {removed_at} WHERE id IN ({{ids}})");
    batched_execute(conn, &template, ids)
}

/// Fingerprints of all live files, sorted by path.
pub fn live_fingerprints(conn: &Connection) -> Result<Vec<FileFingerprint>, StorageError> {
    let mut stmt = conn
        .prepare_cached(
            "SELECT id, path, hash, mtime, mtime_nanos, size
             FROM files WHERE removed_at IS NULL ORDER BY path",
        )
        .map_err(sqlite_err)?;
    let rows = stmt
        .query_map([], |row| {
            Ok(FileFingerprint {
                id: row.get(0)?,
                path: row.get(1)?,
                hash: row.get(2)?,
                mtime: row.get(3)?,
                mtime_nanos: row.get(4)?,
                size: row.get(5)?,
            })
        })
        .map_err(sqlite_err)?;
    collect_rows(rows)
}

/// All live files, sorted by path.
pub fn live_files(conn: &Connection) -> Result<Vec<FileRecord>, StorageError> {
    let sql = format!("SELECT {FILE_COLUMNS} FROM files WHERE removed_at IS NULL ORDER BY path");
    let mut stmt = conn.prepare_cached(&sql).map_err(sqlite_err)?;
    let rows = stmt.query_map([], map_file).map_err(sqlite_err)?;
    collect_rows(rows)
}

/// Every file row including removed ones, sorted by path.
pub fn all_files(conn: &Connection) -> Result<Vec<FileRecord>, StorageError> {
    let sql = format!("SELECT {FILE_COLUMNS} FROM files ORDER BY path");
    let mut stmt = conn.prepare_cached(&sql).map_err(sqlite_err)?;
    let rows = stmt.query_map([], map_file).map_err(sqlite_err)?;
    collect_rows(rows)
}

/// Look up a file by path (live or removed).
pub fn file_by_path(conn: &Connection, path: &str) -> Result<Option<FileRecord>, StorageError> {
    let sql = format!("SELECT {FILE_COLUMNS} FROM files WHERE path = ?1");
    let mut stmt = conn.prepare_cached(&sql).map_err(sqlite_err)?;
    stmt.query_row(params![path], map_file).optional()
}

/// Number of live files.
pub fn count_live_files(conn: &Connection) -> Result<i64, StorageError> {
    conn.query_row(
        "SELECT COUNT(*) FROM files WHERE removed_at IS NULL",
        [],
        |row| row.get(0),
    )
    .map_err(sqlite_err)
}
