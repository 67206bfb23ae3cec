//! snapshots and metric_snapshots: append-only trend history.

use rusqlite::{params, Connection};
use strata_core::errors::StorageError;

use super::util::{collect_rows, sqlite_err, OptionalExt};

/// Graph-level summary written once per committed run.
#[derive(Debug, Clone, PartialEq)]
pub struct SnapshotRecord {
    pub run_id: i64,
    pub ts: i64,
    pub files: i64,
    pub symbols: i64,
    pub edges: i64,
    pub tangle_ratio: f64,
    pub cycles: i64,
    pub god_components: i64,
    pub bottlenecks: i64,
    pub layer_violations: i64,
    pub modularity: f64,
    pub spectral_gap: f64,
    pub propagation_cost: f64,
    /// `exact` or `sampled`.
    pub propagation_tier: String,
    pub health_score: f64,
}

/// One named value of a trend series.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricPoint {
    pub ts: i64,
    pub value: f64,
    pub run_id: i64,
}

pub fn insert_snapshot(conn: &Connection, s: &SnapshotRecord) -> Result<i64, StorageError> {
    conn.prepare_cached(
        "INSERT INTO snapshots (run_id, ts, files, symbols, edges, tangle_ratio, cycles,
                               god_components, bottlenecks, layer_violations, modularity,
                               spectral_gap, propagation_cost, propagation_tier, health_score)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)",
    )
    .map_err(sqlite_err)?
    .execute(params![
        s.run_id,
        s.ts,
        s.files,
        s.symbols,
        s.edges,
        s.tangle_ratio,
        s.cycles,
        s.god_components,
        s.bottlenecks,
        s.layer_violations,
        s.modularity,
        s.spectral_gap,
        s.propagation_cost,
        s.propagation_tier,
        s.health_score,
    ])
    .map_err(sqlite_err)?;
    Ok(conn.last_insert_rowid())
}

/// Append named values sharing one timestamp and run.
pub fn append_metric_values(
    conn: &Connection,
    ts: i64,
    run_id: i64,
    values: &[(&str, f64)],
) -> Result<usize, StorageError> {
    let mut stmt = conn
        .prepare_cached(
            "INSERT INTO metric_snapshots (ts, name, value, run_id) VALUES (?1, ?2, ?3, ?4)",
        )
        .map_err(sqlite_err)?;
    for (name, value) in values {
        stmt.execute(params![ts, name, value, run_id])
            .map_err(sqlite_err)?;
    }
    Ok(values.len())
}

pub fn latest_snapshot(conn: &Connection) -> Result<Option<SnapshotRecord>, StorageError> {
    conn.query_row(
        "SELECT run_id, ts, files, symbols, edges, tangle_ratio, cycles, god_components,
                bottlenecks, layer_violations, modularity, spectral_gap, propagation_cost,
                propagation_tier, health_score
         FROM snapshots ORDER BY id DESC LIMIT 1",
        [],
        |row| {
            Ok(SnapshotRecord {
                run_id: row.get(0)?,
                ts: row.get(1)?,
                files: row.get(2)?,
                symbols: row.get(3)?,
                edges: row.get(4)?,
                tangle_ratio: row.get(5)?,
                cycles: row.get(6)?,
                god_components: row.get(7)?,
                bottlenecks: row.get(8)?,
                layer_violations: row.get(9)?,
                modularity: row.get(10)?,
                spectral_gap: row.get(11)?,
                propagation_cost: row.get(12)?,
                propagation_tier: row.get(13)?,
                health_score: row.get(14)?,
            })
        },
    )
    .optional()
}

pub fn count_snapshots(conn: &Connection) -> Result<i64, StorageError> {
    conn.query_row("SELECT COUNT(*) FROM snapshots", [], |row| row.get(0))
        .map_err(sqlite_err)
}

/// Values of `name`, oldest first, at most `limit` most recent points.
pub fn metric_trend(
    conn: &Connection,
    name: &str,
    limit: usize,
) -> Result<Vec<MetricPoint>, StorageError> {
    let mut stmt = conn
        .prepare_cached(
            "SELECT ts, value, run_id FROM (
                 SELECT rowid AS rid, ts, value, run_id FROM metric_snapshots
                 WHERE name = ?1 ORDER BY ts DESC, rid DESC LIMIT ?2
             ) ORDER BY ts, rid",
        )
        .map_err(sqlite_err)?;
    let rows = stmt
        .query_map(params![name, limit as i64], |row| {
            Ok(MetricPoint {
                ts: row.get(0)?,
                value: row.get(1)?,
                run_id: row.get(2)?,
            })
        })
        .map_err(sqlite_err)?;
    collect_rows(rows)
}
