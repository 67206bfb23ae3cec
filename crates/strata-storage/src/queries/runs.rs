//! runs table: one row per index run, written even when nothing changed.

use rusqlite::{params, Connection};
use strata_core::errors::StorageError;

use super::util::{collect_rows, sqlite_err, OptionalExt};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunRecord {
    pub id: i64,
    pub started_at: i64,
    pub finished_at: Option<i64>,
    pub root: String,
    pub status: String,
    pub phase: String,
    pub files_parsed: i64,
    pub duration_ms: Option<i64>,
    pub report_json: Option<String>,
    pub error: Option<String>,
}

/// Open a run in `running` state. Returns its id.
pub fn insert_run_start(
    conn: &Connection,
    root: &str,
    started_at: i64,
) -> Result<i64, StorageError> {
    conn.execute(
        "INSERT INTO runs (started_at, root, status, phase) VALUES (?1, ?2, 'running', 'idle')",
        params![started_at, root],
    )
    .map_err(sqlite_err)?;
    Ok(conn.last_insert_rowid())
}

/// Advance the phase column of a running run.
pub fn update_run_phase(conn: &Connection, id: i64, phase: &str) -> Result<(), StorageError> {
    conn.execute(
        "UPDATE runs SET phase = ?1 WHERE id = ?2",
        params![phase, id],
    )
    .map_err(sqlite_err)?;
    Ok(())
}

#[allow(clippy::too_many_arguments)]
pub fn update_run_complete(
    conn: &Connection,
    id: i64,
    status: &str,
    phase: &str,
    finished_at: i64,
    files_parsed: i64,
    duration_ms: i64,
    report_json: &str,
) -> Result<(), StorageError> {
    conn.execute(
        "UPDATE runs SET status = ?1, phase = ?2, finished_at = ?3, files_parsed = ?4,
                         duration_ms = ?5, report_json = ?6
         WHERE id = ?7",
        params![status, phase, finished_at, files_parsed, duration_ms, report_json, id],
    )
    .map_err(sqlite_err)?;
    Ok(())
}

pub fn update_run_failed(
    conn: &Connection,
    id: i64,
    phase: &str,
    finished_at: i64,
    duration_ms: i64,
    error: &str,
) -> Result<(), StorageError> {
    conn.execute(
        "UPDATE runs SET status = 'failed', phase = ?1, finished_at = ?2, duration_ms = ?3,
                         error = ?4
         WHERE id = ?5",
        params![phase, finished_at, duration_ms, error, id],
    )
    .map_err(sqlite_err)?;
    Ok(())
}

const RUN_COLUMNS: &str = "id, started_at, finished_at, root, status, phase, files_parsed,
     duration_ms, report_json, error";

fn map_run(row: &rusqlite::Row<'_>) -> rusqlite::Result<RunRecord> {
    Ok(RunRecord {
        id: row.get(0)?,
        started_at: row.get(1)?,
        finished_at: row.get(2)?,
        root: row.get(3)?,
        status: row.get(4)?,
        phase: row.get(5)?,
        files_parsed: row.get(6)?,
        duration_ms: row.get(7)?,
        report_json: row.get(8)?,
        error: row.get(9)?,
    })
}

pub fn latest_run(conn: &Connection) -> Result<Option<RunRecord>, StorageError> {
    let sql = format!("SELECT {RUN_COLUMNS} FROM runs ORDER BY id DESC LIMIT 1");
    let mut stmt = conn.prepare_cached(&sql).map_err(sqlite_err)?;
    stmt.query_row([], map_run).optional()
}

/// Last completed (non-failed, non-running) run.
pub fn latest_completed_run(conn: &Connection) -> Result<Option<RunRecord>, StorageError> {
    let sql = format!(
        "SELECT {RUN_COLUMNS} FROM runs WHERE status IN ('completed', 'up_to_date')
         ORDER BY id DESC LIMIT 1"
    );
    let mut stmt = conn.prepare_cached(&sql).map_err(sqlite_err)?;
    stmt.query_row([], map_run).optional()
}

/// Most recent runs, newest first.
pub fn recent_runs(conn: &Connection, limit: usize) -> Result<Vec<RunRecord>, StorageError> {
    let sql = format!("SELECT {RUN_COLUMNS} FROM runs ORDER BY id DESC LIMIT ?1");
    let mut stmt = conn.prepare_cached(&sql).map_err(sqlite_err)?;
    let rows = stmt
        .query_map(params![limit as i64], map_run)
        .map_err(sqlite_err)?;
    collect_rows(rows)
}

pub fn count_runs(conn: &Connection) -> Result<i64, StorageError> {
    conn.query_row("SELECT COUNT(*) FROM runs", [], |row| row.get(0))
        .map_err(sqlite_err)
}
