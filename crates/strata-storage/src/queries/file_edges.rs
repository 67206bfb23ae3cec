//! file_edges aggregation queries.

use std::collections::BTreeMap;

use rusqlite::{params, Connection};
use strata_core::errors::StorageError;

use super::util::{collect_rows, sqlite_err};
use crate::batching::{batched_execute, batched_query};

/// Aggregated dependency of one file on another.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEdgeRecord {
    pub source_file_id: i64,
    pub target_file_id: i64,
    pub weight: i64,
    /// Comma-joined, sorted edge kinds.
    pub kinds: String,
}

/// Remove aggregates whose source or target is in `file_ids`.
pub fn delete_touching(conn: &Connection, file_ids: &[i64]) -> Result<usize, StorageError> {
    batched_execute(
        conn,
        "DELETE FROM file_edges WHERE source_file_id IN ({ids}) OR target_file_id IN ({ids})",
        file_ids,
    )
}

/// Rebuild the aggregates of the given source files from `edges`.
///
/// Self-file edges are not aggregated. Returns rows written.
pub fn recompute_for_sources(
    conn: &Connection,
    source_file_ids: &[i64],
) -> Result<usize, StorageError> {
    batched_execute(
        conn,
        "DELETE FROM file_edges WHERE source_file_id IN ({ids})",
        source_file_ids,
    )?;

    let grouped = batched_query(
        conn,
        "SELECT source_file_id, target_file_id, kind, COUNT(*)
         FROM edges
         WHERE source_file_id IN ({ids}) AND source_file_id != target_file_id
         GROUP BY source_file_id, target_file_id, kind",
        source_file_ids,
        |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, i64>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, i64>(3)?,
            ))
        },
    )?;

    let mut aggregated: BTreeMap<(i64, i64), (i64, Vec<String>)> = BTreeMap::new();
    for (source, target, kind, count) in grouped {
        let entry = aggregated.entry((source, target)).or_default();
        entry.0 += count;
        entry.1.push(kind);
    }

    let mut stmt = conn
        .prepare_cached(
            "INSERT INTO file_edges (source_file_id, target_file_id, weight, kinds)
             VALUES (?1, ?2, ?3, ?4)",
        )
        .map_err(sqlite_err)?;
    let written = aggregated.len();
    for ((source, target), (weight, mut kinds)) in aggregated {
        kinds.sort();
        stmt.execute(params![source, target, weight, kinds.join(",")])
            .map_err(sqlite_err)?;
    }
    Ok(written)
}

/// Every aggregate ordered by key.
pub fn all_file_edges(conn: &Connection) -> Result<Vec<FileEdgeRecord>, StorageError> {
    let mut stmt = conn
        .prepare_cached(
            "SELECT source_file_id, target_file_id, weight, kinds
             FROM file_edges ORDER BY source_file_id, target_file_id",
        )
        .map_err(sqlite_err)?;
    let rows = stmt.query_map([], map_file_edge).map_err(sqlite_err)?;
    collect_rows(rows)
}

/// Files `file_id` depends on, heaviest first.
pub fn dependencies_of(conn: &Connection, file_id: i64) -> Result<Vec<FileEdgeRecord>, StorageError> {
    let mut stmt = conn
        .prepare_cached(
            "SELECT source_file_id, target_file_id, weight, kinds
             FROM file_edges WHERE source_file_id = ?1
             ORDER BY weight DESC, target_file_id",
        )
        .map_err(sqlite_err)?;
    let rows = stmt.query_map(params![file_id], map_file_edge).map_err(sqlite_err)?;
    collect_rows(rows)
}

/// Files depending on `file_id`, heaviest first.
pub fn dependents_of(conn: &Connection, file_id: i64) -> Result<Vec<FileEdgeRecord>, StorageError> {
    let mut stmt = conn
        .prepare_cached(
            "SELECT source_file_id, target_file_id, weight, kinds
             FROM file_edges WHERE target_file_id = ?1
             ORDER BY weight DESC, source_file_id",
        )
        .map_err(sqlite_err)?;
    let rows = stmt.query_map(params![file_id], map_file_edge).map_err(sqlite_err)?;
    collect_rows(rows)
}

fn map_file_edge(row: &rusqlite::Row<'_>) -> rusqlite::Result<FileEdgeRecord> {
    Ok(FileEdgeRecord {
        source_file_id: row.get(0)?,
        target_file_id: row.get(1)?,
        weight: row.get(2)?,
        kinds: row.get(3)?,
    })
}
