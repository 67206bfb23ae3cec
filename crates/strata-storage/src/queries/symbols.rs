//! symbols table queries.

use rusqlite::{params, Connection};
use strata_core::errors::StorageError;

use super::util::{collect_rows, sqlite_err, OptionalExt};
use crate::batching::{batched_execute, batched_query};

/// A symbol row.
#[derive(Debug, Clone, PartialEq)]
pub struct SymbolRecord {
    pub id: i64,
    pub file_id: i64,
    pub ordinal: i64,
    pub name: String,
    pub qualified_name: String,
    pub kind: String,
    pub visibility: String,
    pub is_exported: bool,
    pub parent_id: Option<i64>,
    pub line_start: i64,
    pub line_end: i64,
    pub provenance: String,
    pub cognitive_complexity: i64,
}

/// A live symbol joined with its file, as the resolver and analytics read it.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexedSymbol {
    pub id: i64,
    pub file_id: i64,
    pub ordinal: i64,
    pub path: String,
    pub language: Option<String>,
    pub name: String,
    pub qualified_name: String,
    pub kind: String,
    pub is_exported: bool,
    pub line_start: i64,
    pub line_end: i64,
}

const SYMBOL_COLUMNS: &str = "id, file_id, ordinal, name, qualified_name, kind, visibility,
     is_exported, parent_id, line_start, line_end, provenance, cognitive_complexity";

fn map_symbol(row: &rusqlite::Row<'_>) -> rusqlite::Result<SymbolRecord> {
    Ok(SymbolRecord {
        id: row.get(0)?,
        file_id: row.get(1)?,
        ordinal: row.get(2)?,
        name: row.get(3)?,
        qualified_name: row.get(4)?,
        kind: row.get(5)?,
        visibility: row.get(6)?,
        is_exported: row.get(7)?,
        parent_id: row.get(8)?,
        line_start: row.get(9)?,
        line_end: row.get(10)?,
        provenance: row.get(11)?,
        cognitive_complexity: row.get(12)?,
    })
}

/// Insert symbols. Ids are derived, so a collision means two files or two
/// ordinals hashed to the same id and is reported as an error.
pub fn insert_symbols(conn: &Connection, symbols: &[SymbolRecord]) -> Result<usize, StorageError> {
    let mut stmt = conn
        .prepare_cached(
            "INSERT INTO symbols (id, file_id, ordinal, name, qualified_name, kind, visibility,
                                  is_exported, parent_id, line_start, line_end, provenance,
                                  cognitive_complexity)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
        )
        .map_err(sqlite_err)?;
    for s in symbols {
        stmt.execute(params![
            s.id,
            s.file_id,
            s.ordinal,
            s.name,
            s.qualified_name,
            s.kind,
            s.visibility,
            s.is_exported,
            s.parent_id,
            s.line_start,
            s.line_end,
            s.provenance,
            s.cognitive_complexity,
        ])
        .map_err(|e| match e {
            rusqlite::Error::SqliteFailure(f, _)
                if f.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                StorageError::IdCollision {
                    table: "symbols".to_string(),
                    id: s.id,
                }
            }
            other => sqlite_err(other),
        })?;
    }
    Ok(symbols.len())
}

/// Retire all symbols of the given files. Edges, metrics and layer
/// violations touching them cascade.
pub fn delete_symbols_for_files(conn: &Connection, file_ids: &[i64]) -> Result<usize, StorageError> {
    batched_execute(conn, "DELETE FROM symbols WHERE file_id IN ({ids})", file_ids)
}

/// Distinct names declared in the given files.
pub fn names_in_files(conn: &Connection, file_ids: &[i64]) -> Result<Vec<String>, StorageError> {
    let mut names = batched_query(
        conn,
        "SELECT DISTINCT name FROM symbols WHERE file_id IN ({ids})",
        file_ids,
        |row| row.get::<_, String>(0),
    )?;
    names.sort();
    names.dedup();
    Ok(names)
}

/// Symbols of the given files, ordered by (file, ordinal).
pub fn symbols_for_files(
    conn: &Connection,
    file_ids: &[i64],
) -> Result<Vec<SymbolRecord>, StorageError> {
    let template = format!("SELECT {SYMBOL_COLUMNS} FROM symbols WHERE file_id IN ({{ids}})");
    let mut rows = batched_query(conn, &template, file_ids, map_symbol)?;
    rows.sort_by_key(|s| (s.file_id, s.ordinal));
    Ok(rows)
}

/// Every live symbol joined with its file, ordered by (path, ordinal).
pub fn load_index(conn: &Connection) -> Result<Vec<IndexedSymbol>, StorageError> {
    let mut stmt = conn
        .prepare_cached(
            "SELECT s.id, s.file_id, s.ordinal, f.path, f.language, s.name, s.qualified_name,
                    s.kind, s.is_exported, s.line_start, s.line_end
             FROM symbols s JOIN files f ON f.id = s.file_id
             WHERE f.removed_at IS NULL
             ORDER BY f.path, s.ordinal",
        )
        .map_err(sqlite_err)?;
    let rows = stmt
        .query_map([], |row| {
            Ok(IndexedSymbol {
                id: row.get(0)?,
                file_id: row.get(1)?,
                ordinal: row.get(2)?,
                path: row.get(3)?,
                language: row.get(4)?,
                name: row.get(5)?,
                qualified_name: row.get(6)?,
                kind: row.get(7)?,
                is_exported: row.get(8)?,
                line_start: row.get(9)?,
                line_end: row.get(10)?,
            })
        })
        .map_err(sqlite_err)?;
    collect_rows(rows)
}

/// All symbol rows ordered by id.
pub fn all_symbols(conn: &Connection) -> Result<Vec<SymbolRecord>, StorageError> {
    let sql = format!("SELECT {SYMBOL_COLUMNS} FROM symbols ORDER BY id");
    let mut stmt = conn.prepare_cached(&sql).map_err(sqlite_err)?;
    let rows = stmt.query_map([], map_symbol).map_err(sqlite_err)?;
    collect_rows(rows)
}

pub fn symbol_by_id(conn: &Connection, id: i64) -> Result<Option<SymbolRecord>, StorageError> {
    let sql = format!("SELECT {SYMBOL_COLUMNS} FROM symbols WHERE id = ?1");
    let mut stmt = conn.prepare_cached(&sql).map_err(sqlite_err)?;
    stmt.query_row(params![id], map_symbol).optional()
}

/// Symbols with an exact name, ordered by file path then ordinal.
pub fn symbols_by_name(conn: &Connection, name: &str) -> Result<Vec<SymbolRecord>, StorageError> {
    let mut stmt = conn
        .prepare_cached(
            "SELECT s.id, s.file_id, s.ordinal, s.name, s.qualified_name, s.kind, s.visibility,
                    s.is_exported, s.parent_id, s.line_start, s.line_end, s.provenance,
                    s.cognitive_complexity
             FROM symbols s JOIN files f ON f.id = s.file_id
             WHERE s.name = ?1
             ORDER BY f.path, s.ordinal",
        )
        .map_err(sqlite_err)?;
    let rows = stmt.query_map(params![name], map_symbol).map_err(sqlite_err)?;
    collect_rows(rows)
}

/// Highest symbol complexity per live file. Files without symbols are absent.
pub fn max_complexity_by_file(conn: &Connection) -> Result<Vec<(i64, i64)>, StorageError> {
    let mut stmt = conn
        .prepare_cached(
            "SELECT s.file_id, MAX(s.cognitive_complexity)
             FROM symbols s JOIN files f ON f.id = s.file_id
             WHERE f.removed_at IS NULL
             GROUP BY s.file_id
             ORDER BY s.file_id",
        )
        .map_err(sqlite_err)?;
    let rows = stmt
        .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))
        .map_err(sqlite_err)?;
    collect_rows(rows)
}

pub fn count_symbols(conn: &Connection) -> Result<i64, StorageError> {
    conn.query_row("SELECT COUNT(*) FROM symbols", [], |row| row.get(0))
        .map_err(sqlite_err)
}
