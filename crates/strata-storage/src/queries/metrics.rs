//! Derived analytics tables: symbol_metrics, communities, layer_violations.
//!
//! Each analytics pass replaces these tables wholesale inside the staging
//! transaction, so readers always see one consistent pass.

use rusqlite::{params, Connection};
use strata_core::errors::StorageError;

use super::util::{collect_rows, sqlite_err, OptionalExt};

/// Per-symbol metrics row.
#[derive(Debug, Clone, PartialEq)]
pub struct SymbolMetricsRecord {
    pub symbol_id: i64,
    pub in_degree: i64,
    pub out_degree: i64,
    pub pagerank: f64,
    pub betweenness: f64,
    pub closeness: f64,
    pub eigenvector: f64,
    pub scc_id: Option<i64>,
    pub community_id: i64,
    pub layer: i64,
    pub partition: i64,
    pub is_god: bool,
    pub is_bottleneck: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CommunityRecord {
    pub community_id: i64,
    pub size: i64,
    pub conductance: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LayerViolationRecord {
    pub source_id: i64,
    pub target_id: i64,
    pub source_layer: i64,
    pub target_layer: i64,
    pub severity: f64,
}

/// A symbol ranked by pagerank, joined with its name and path.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedSymbol {
    pub symbol_id: i64,
    pub name: String,
    pub path: String,
    pub pagerank: f64,
}

const METRIC_COLUMNS: &str = "symbol_id, in_degree, out_degree, pagerank, betweenness, closeness,
     eigenvector, scc_id, community_id, layer, partition, is_god, is_bottleneck";

fn map_metrics(row: &rusqlite::Row<'_>) -> rusqlite::Result<SymbolMetricsRecord> {
    Ok(SymbolMetricsRecord {
        symbol_id: row.get(0)?,
        in_degree: row.get(1)?,
        out_degree: row.get(2)?,
        pagerank: row.get(3)?,
        betweenness: row.get(4)?,
        closeness: row.get(5)?,
        eigenvector: row.get(6)?,
        scc_id: row.get(7)?,
        community_id: row.get(8)?,
        layer: row.get(9)?,
        partition: row.get(10)?,
        is_god: row.get(11)?,
        is_bottleneck: row.get(12)?,
    })
}

pub fn replace_symbol_metrics(
    conn: &Connection,
    rows: &[SymbolMetricsRecord],
    run_id: i64,
) -> Result<usize, StorageError> {
    conn.execute("DELETE FROM symbol_metrics", []).map_err(sqlite_err)?;
    let mut stmt = conn
        .prepare_cached(
            "INSERT INTO symbol_metrics (symbol_id, in_degree, out_degree, pagerank, betweenness,
                                         closeness, eigenvector, scc_id, community_id, layer,
                                         partition, is_god, is_bottleneck, run_id)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
        )
        .map_err(sqlite_err)?;
    for m in rows {
        stmt.execute(params![
            m.symbol_id,
            m.in_degree,
            m.out_degree,
            m.pagerank,
            m.betweenness,
            m.closeness,
            m.eigenvector,
            m.scc_id,
            m.community_id,
            m.layer,
            m.partition,
            m.is_god,
            m.is_bottleneck,
            run_id,
        ])
        .map_err(sqlite_err)?;
    }
    Ok(rows.len())
}

pub fn replace_communities(
    conn: &Connection,
    rows: &[CommunityRecord],
    run_id: i64,
) -> Result<usize, StorageError> {
    conn.execute("DELETE FROM communities", []).map_err(sqlite_err)?;
    let mut stmt = conn
        .prepare_cached(
            "INSERT INTO communities (community_id, size, conductance, run_id)
             VALUES (?1, ?2, ?3, ?4)",
        )
        .map_err(sqlite_err)?;
    for c in rows {
        stmt.execute(params![c.community_id, c.size, c.conductance, run_id])
            .map_err(sqlite_err)?;
    }
    Ok(rows.len())
}

pub fn replace_layer_violations(
    conn: &Connection,
    rows: &[LayerViolationRecord],
    run_id: i64,
) -> Result<usize, StorageError> {
    conn.execute("DELETE FROM layer_violations", []).map_err(sqlite_err)?;
    let mut stmt = conn
        .prepare_cached(
            "INSERT INTO layer_violations (source_id, target_id, source_layer, target_layer,
                                           severity, run_id)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        )
        .map_err(sqlite_err)?;
    for v in rows {
        stmt.execute(params![
            v.source_id,
            v.target_id,
            v.source_layer,
            v.target_layer,
            v.severity,
            run_id,
        ])
        .map_err(sqlite_err)?;
    }
    Ok(rows.len())
}

pub fn metrics_for(
    conn: &Connection,
    symbol_id: i64,
) -> Result<Option<SymbolMetricsRecord>, StorageError> {
    let sql = format!("SELECT {METRIC_COLUMNS} FROM symbol_metrics WHERE symbol_id = ?1");
    let mut stmt = conn.prepare_cached(&sql).map_err(sqlite_err)?;
    stmt.query_row(params![symbol_id], map_metrics).optional()
}

pub fn all_symbol_metrics(conn: &Connection) -> Result<Vec<SymbolMetricsRecord>, StorageError> {
    let sql = format!("SELECT {METRIC_COLUMNS} FROM symbol_metrics ORDER BY symbol_id");
    let mut stmt = conn.prepare_cached(&sql).map_err(sqlite_err)?;
    let rows = stmt.query_map([], map_metrics).map_err(sqlite_err)?;
    collect_rows(rows)
}

/// Highest-pagerank symbols. Ties break on symbol id.
pub fn top_by_pagerank(conn: &Connection, limit: usize) -> Result<Vec<RankedSymbol>, StorageError> {
    let mut stmt = conn
        .prepare_cached(
            "SELECT m.symbol_id, s.name, f.path, m.pagerank
             FROM symbol_metrics m
             JOIN symbols s ON s.id = m.symbol_id
             JOIN files f ON f.id = s.file_id
             ORDER BY m.pagerank DESC, m.symbol_id
             LIMIT ?1",
        )
        .map_err(sqlite_err)?;
    let rows = stmt
        .query_map(params![limit as i64], |row| {
            Ok(RankedSymbol {
                symbol_id: row.get(0)?,
                name: row.get(1)?,
                path: row.get(2)?,
                pagerank: row.get(3)?,
            })
        })
        .map_err(sqlite_err)?;
    collect_rows(rows)
}

pub fn all_communities(conn: &Connection) -> Result<Vec<CommunityRecord>, StorageError> {
    let mut stmt = conn
        .prepare_cached(
            "SELECT community_id, size, conductance FROM communities ORDER BY community_id",
        )
        .map_err(sqlite_err)?;
    let rows = stmt
        .query_map([], |row| {
            Ok(CommunityRecord {
                community_id: row.get(0)?,
                size: row.get(1)?,
                conductance: row.get(2)?,
            })
        })
        .map_err(sqlite_err)?;
    collect_rows(rows)
}

/// Layer violations, most severe first.
pub fn all_layer_violations(conn: &Connection) -> Result<Vec<LayerViolationRecord>, StorageError> {
    let mut stmt = conn
        .prepare_cached(
            "SELECT source_id, target_id, source_layer, target_layer, severity
             FROM layer_violations ORDER BY severity DESC, source_id, target_id",
        )
        .map_err(sqlite_err)?;
    let rows = stmt
        .query_map([], |row| {
            Ok(LayerViolationRecord {
                source_id: row.get(0)?,
                target_id: row.get(1)?,
                source_layer: row.get(2)?,
                target_layer: row.get(3)?,
                severity: row.get(4)?,
            })
        })
        .map_err(sqlite_err)?;
    collect_rows(rows)
}
