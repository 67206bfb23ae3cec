//! refs table: extracted references cached per live file.

use rusqlite::{params, Connection};
use strata_core::errors::StorageError;

use super::util::sqlite_err;
use crate::batching::{batched_execute, batched_query};

/// One cached reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefRecord {
    pub file_id: i64,
    pub ordinal: i64,
    /// Enclosing symbol (or module symbol) the reference originates from.
    pub source_id: i64,
    pub target_name: String,
    pub qualifier: Option<String>,
    pub kind: String,
    pub line: i64,
}

pub fn insert_refs(conn: &Connection, refs: &[RefRecord]) -> Result<usize, StorageError> {
    let mut stmt = conn
        .prepare_cached(
            "INSERT INTO refs (file_id, ordinal, source_id, target_name, qualifier, kind, line)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        )
        .map_err(sqlite_err)?;
    for r in refs {
        stmt.execute(params![
            r.file_id,
            r.ordinal,
            r.source_id,
            r.target_name,
            r.qualifier,
            r.kind,
            r.line,
        ])
        .map_err(sqlite_err)?;
    }
    Ok(refs.len())
}

pub fn delete_refs_for_files(conn: &Connection, file_ids: &[i64]) -> Result<usize, StorageError> {
    batched_execute(conn, "DELETE FROM refs WHERE file_id IN ({ids})", file_ids)
}

/// Cached references of the given files, ordered by (file, ordinal).
pub fn refs_for_files(conn: &Connection, file_ids: &[i64]) -> Result<Vec<RefRecord>, StorageError> {
    let mut rows = batched_query(
        conn,
        "SELECT file_id, ordinal, source_id, target_name, qualifier, kind, line
         FROM refs WHERE file_id IN ({ids})",
        file_ids,
        |row| {
            Ok(RefRecord {
                file_id: row.get(0)?,
                ordinal: row.get(1)?,
                source_id: row.get(2)?,
                target_name: row.get(3)?,
                qualifier: row.get(4)?,
                kind: row.get(5)?,
                line: row.get(6)?,
            })
        },
    )?;
    rows.sort_by_key(|r| (r.file_id, r.ordinal));
    Ok(rows)
}

/// Distinct files holding a reference whose target is one of `names`.
pub fn files_referencing(conn: &Connection, names: &[String]) -> Result<Vec<i64>, StorageError> {
    let mut ids = batched_query(
        conn,
        "SELECT DISTINCT file_id FROM refs WHERE target_name IN ({ids})",
        names,
        |row| row.get::<_, i64>(0),
    )?;
    ids.sort_unstable();
    ids.dedup();
    Ok(ids)
}
