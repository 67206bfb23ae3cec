//! edges table queries.

use rusqlite::{params, Connection};
use strata_core::errors::StorageError;

use super::util::{collect_rows, sqlite_err};
use crate::batching::{batched_and, batched_execute};

/// A resolved symbol-to-symbol edge.
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeRecord {
    pub source_id: i64,
    pub target_id: i64,
    pub kind: String,
    pub source_file_id: i64,
    pub target_file_id: i64,
    pub tier: String,
    pub confidence: f64,
    pub ambiguous: bool,
    pub alt_target_id: Option<i64>,
    pub line: i64,
    pub provenance: String,
}

/// Primary key of an edge.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EdgeKey {
    pub source_id: i64,
    pub target_id: i64,
    pub kind: String,
}

/// Caller or callee of a symbol, joined with its name and path.
#[derive(Debug, Clone, PartialEq)]
pub struct Neighbor {
    pub symbol_id: i64,
    pub name: String,
    pub path: String,
    pub kind: String,
    pub confidence: f64,
}

const EDGE_COLUMNS: &str = "source_id, target_id, kind, source_file_id, target_file_id, tier,
     confidence, ambiguous, alt_target_id, line, provenance";

fn map_edge(row: &rusqlite::Row<'_>) -> rusqlite::Result<EdgeRecord> {
    Ok(EdgeRecord {
        source_id: row.get(0)?,
        target_id: row.get(1)?,
        kind: row.get(2)?,
        source_file_id: row.get(3)?,
        target_file_id: row.get(4)?,
        tier: row.get(5)?,
        confidence: row.get(6)?,
        ambiguous: row.get(7)?,
        alt_target_id: row.get(8)?,
        line: row.get(9)?,
        provenance: row.get(10)?,
    })
}

/// Insert edges. Duplicate keys are ignored (first write wins).
pub fn insert_edges(conn: &Connection, edges: &[EdgeRecord]) -> Result<usize, StorageError> {
    let mut stmt = conn
        .prepare_cached(
            "INSERT OR IGNORE INTO edges (source_id, target_id, kind, source_file_id,
                                          target_file_id, tier, confidence, ambiguous,
                                          alt_target_id, line, provenance)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        )
        .map_err(sqlite_err)?;
    let mut inserted = 0;
    for e in edges {
        inserted += stmt
            .execute(params![
                e.source_id,
                e.target_id,
                e.kind,
                e.source_file_id,
                e.target_file_id,
                e.tier,
                e.confidence,
                e.ambiguous,
                e.alt_target_id,
                e.line,
                e.provenance,
            ])
            .map_err(sqlite_err)?;
    }
    Ok(inserted)
}

/// Delete all outgoing edges of the given source files.
pub fn delete_edges_from_files(conn: &Connection, file_ids: &[i64]) -> Result<usize, StorageError> {
    batched_execute(conn, "DELETE FROM edges WHERE source_file_id IN ({ids})", file_ids)
}

/// Every edge ordered by key.
pub fn all_edges(conn: &Connection) -> Result<Vec<EdgeRecord>, StorageError> {
    let sql = format!("SELECT {EDGE_COLUMNS} FROM edges ORDER BY source_id, target_id, kind");
    let mut stmt = conn.prepare_cached(&sql).map_err(sqlite_err)?;
    let rows = stmt.query_map([], map_edge).map_err(sqlite_err)?;
    collect_rows(rows)
}

/// Edges whose source is in `sources` AND whose target is in `targets`.
pub fn edges_between(
    conn: &Connection,
    sources: &[i64],
    targets: &[i64],
) -> Result<Vec<EdgeKey>, StorageError> {
    let map = |row: &rusqlite::Row<'_>| -> rusqlite::Result<EdgeKey> {
        Ok(EdgeKey {
            source_id: row.get(0)?,
            target_id: row.get(1)?,
            kind: row.get(2)?,
        })
    };
    batched_and(
        conn,
        "SELECT source_id, target_id, kind FROM edges WHERE source_id IN ({ids})",
        sources,
        "SELECT source_id, target_id, kind FROM edges WHERE target_id IN ({ids})",
        targets,
        map,
    )
}

/// Number of distinct symbols with an edge into `symbol_id`.
pub fn fan_in(conn: &Connection, symbol_id: i64) -> Result<i64, StorageError> {
    conn.query_row(
        "SELECT COUNT(DISTINCT source_id) FROM edges WHERE target_id = ?1",
        params![symbol_id],
        |row| row.get(0),
    )
    .map_err(sqlite_err)
}

/// Number of distinct symbols `symbol_id` has an edge to.
pub fn fan_out(conn: &Connection, symbol_id: i64) -> Result<i64, StorageError> {
    conn.query_row(
        "SELECT COUNT(DISTINCT target_id) FROM edges WHERE source_id = ?1",
        params![symbol_id],
        |row| row.get(0),
    )
    .map_err(sqlite_err)
}

/// Symbols with an edge into `symbol_id`.
pub fn callers(conn: &Connection, symbol_id: i64) -> Result<Vec<Neighbor>, StorageError> {
    let mut stmt = conn
        .prepare_cached(
            "SELECT s.id, s.name, f.path, e.kind, e.confidence
             FROM edges e
             JOIN symbols s ON s.id = e.source_id
             JOIN files f ON f.id = s.file_id
             WHERE e.target_id = ?1
             ORDER BY f.path, s.ordinal, e.kind",
        )
        .map_err(sqlite_err)?;
    let rows = stmt
        .query_map(params![symbol_id], map_neighbor)
        .map_err(sqlite_err)?;
    collect_rows(rows)
}

/// Symbols `symbol_id` has an edge to.
pub fn callees(conn: &Connection, symbol_id: i64) -> Result<Vec<Neighbor>, StorageError> {
    let mut stmt = conn
        .prepare_cached(
            "SELECT s.id, s.name, f.path, e.kind, e.confidence
             FROM edges e
             JOIN symbols s ON s.id = e.target_id
             JOIN files f ON f.id = s.file_id
             WHERE e.source_id = ?1
             ORDER BY f.path, s.ordinal, e.kind",
        )
        .map_err(sqlite_err)?;
    let rows = stmt
        .query_map(params![symbol_id], map_neighbor)
        .map_err(sqlite_err)?;
    collect_rows(rows)
}

fn map_neighbor(row: &rusqlite::Row<'_>) -> rusqlite::Result<Neighbor> {
    Ok(Neighbor {
        symbol_id: row.get(0)?,
        name: row.get(1)?,
        path: row.get(2)?,
        kind: row.get(3)?,
        confidence: row.get(4)?,
    })
}

/// Edges touching any symbol of the given file, in either direction.
pub fn count_edges_touching_file(conn: &Connection, file_id: i64) -> Result<i64, StorageError> {
    conn.query_row(
        "SELECT COUNT(*) FROM edges WHERE source_file_id = ?1 OR target_file_id = ?1",
        params![file_id],
        |row| row.get(0),
    )
    .map_err(sqlite_err)
}

pub fn count_edges(conn: &Connection) -> Result<i64, StorageError> {
    conn.query_row("SELECT COUNT(*) FROM edges", [], |row| row.get(0))
        .map_err(sqlite_err)
}

/// Number of edges flagged ambiguous.
pub fn count_ambiguous(conn: &Connection) -> Result<i64, StorageError> {
    conn.query_row("SELECT COUNT(*) FROM edges WHERE ambiguous = 1", [], |row| row.get(0))
        .map_err(sqlite_err)
}
