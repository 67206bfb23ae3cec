//! Git history tables: git_commits, git_file_changes, history_state, file_stats.

use rusqlite::{params, Connection};
use strata_core::errors::StorageError;

use super::util::{collect_rows, sqlite_err, OptionalExt};
use crate::batching::batched_query;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitRecord {
    pub hash: String,
    pub author: String,
    pub timestamp: i64,
    pub file_count: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileChangeRecord {
    pub path: String,
    pub lines_added: i64,
    pub lines_removed: i64,
}

/// One (commit, file) pair joined with the commit's author and time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeRow {
    pub commit_hash: String,
    pub author: String,
    pub timestamp: i64,
    pub file_count: i64,
    pub path: String,
    pub lines_added: i64,
    pub lines_removed: i64,
}

/// Last processed HEAD.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryState {
    pub head: String,
    pub commits: i64,
    pub updated_at: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FileStatsRecord {
    pub file_id: i64,
    pub commit_count: i64,
    pub churn: i64,
    pub distinct_authors: i64,
    pub top_owner: Option<String>,
    pub owner_share: f64,
    pub cochange_entropy: f64,
    pub health: f64,
}

/// Record a commit and its file changes. Re-inserting a known commit is a no-op.
pub fn insert_commit(
    conn: &Connection,
    commit: &CommitRecord,
    changes: &[FileChangeRecord],
) -> Result<bool, StorageError> {
    let inserted = conn
        .prepare_cached(
            "INSERT OR IGNORE INTO git_commits (hash, author, timestamp, file_count)
             VALUES (?1, ?2, ?3, ?4)",
        )
        .map_err(sqlite_err)?
        .execute(params![
            commit.hash,
            commit.author,
            commit.timestamp,
            commit.file_count
        ])
        .map_err(sqlite_err)?;
    if inserted == 0 {
        return Ok(false);
    }
    let mut stmt = conn
        .prepare_cached(
            "INSERT OR IGNORE INTO git_file_changes (commit_hash, path, lines_added, lines_removed)
             VALUES (?1, ?2, ?3, ?4)",
        )
        .map_err(sqlite_err)?;
    for c in changes {
        stmt.execute(params![commit.hash, c.path, c.lines_added, c.lines_removed])
            .map_err(sqlite_err)?;
    }
    Ok(true)
}

/// Forget all recorded history (used when HEAD no longer descends from
/// the stored head).
pub fn clear_history(conn: &Connection) -> Result<(), StorageError> {
    conn.execute_batch(
        "DELETE FROM git_file_changes; DELETE FROM git_commits; DELETE FROM history_state;",
    )
    .map_err(sqlite_err)
}

pub fn history_state(conn: &Connection) -> Result<Option<HistoryState>, StorageError> {
    conn.query_row(
        "SELECT head, commits, updated_at FROM history_state WHERE id = 1",
        [],
        |row| {
            Ok(HistoryState {
                head: row.get(0)?,
                commits: row.get(1)?,
                updated_at: row.get(2)?,
            })
        },
    )
    .optional()
}

pub fn set_history_state(conn: &Connection, state: &HistoryState) -> Result<(), StorageError> {
    conn.execute(
        "INSERT INTO history_state (id, head, commits, updated_at) VALUES (1, ?1, ?2, ?3)
         ON CONFLICT(id) DO UPDATE SET head = excluded.head, commits = excluded.commits,
                                       updated_at = excluded.updated_at",
        params![state.head, state.commits, state.updated_at],
    )
    .map_err(sqlite_err)?;
    Ok(())
}

pub fn count_commits(conn: &Connection) -> Result<i64, StorageError> {
    conn.query_row("SELECT COUNT(*) FROM git_commits", [], |row| row.get(0))
        .map_err(sqlite_err)
}

/// Every recorded change, oldest commit first.
pub fn all_changes(conn: &Connection) -> Result<Vec<ChangeRow>, StorageError> {
    let mut stmt = conn
        .prepare_cached(
            "SELECT c.hash, c.author, c.timestamp, c.file_count,
                    ch.path, ch.lines_added, ch.lines_removed
             FROM git_file_changes ch JOIN git_commits c ON c.hash = ch.commit_hash
             ORDER BY c.timestamp, c.hash, ch.path",
        )
        .map_err(sqlite_err)?;
    let rows = stmt
        .query_map([], |row| {
            Ok(ChangeRow {
                commit_hash: row.get(0)?,
                author: row.get(1)?,
                timestamp: row.get(2)?,
                file_count: row.get(3)?,
                path: row.get(4)?,
                lines_added: row.get(5)?,
                lines_removed: row.get(6)?,
            })
        })
        .map_err(sqlite_err)?;
    collect_rows(rows)
}

/// Replace file_stats for every given row.
pub fn replace_file_stats(
    conn: &Connection,
    rows: &[FileStatsRecord],
    run_id: i64,
) -> Result<usize, StorageError> {
    conn.execute("DELETE FROM file_stats", []).map_err(sqlite_err)?;
    let mut stmt = conn
        .prepare_cached(
            "INSERT INTO file_stats (file_id, commit_count, churn, distinct_authors, top_owner,
                                     owner_share, cochange_entropy, health, run_id)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        )
        .map_err(sqlite_err)?;
    for s in rows {
        stmt.execute(params![
            s.file_id,
            s.commit_count,
            s.churn,
            s.distinct_authors,
            s.top_owner,
            s.owner_share,
            s.cochange_entropy,
            s.health,
            run_id,
        ])
        .map_err(sqlite_err)?;
    }
    Ok(rows.len())
}

const STATS_COLUMNS: &str = "file_id, commit_count, churn, distinct_authors, top_owner,
     owner_share, cochange_entropy, health";

fn map_stats(row: &rusqlite::Row<'_>) -> rusqlite::Result<FileStatsRecord> {
    Ok(FileStatsRecord {
        file_id: row.get(0)?,
        commit_count: row.get(1)?,
        churn: row.get(2)?,
        distinct_authors: row.get(3)?,
        top_owner: row.get(4)?,
        owner_share: row.get(5)?,
        cochange_entropy: row.get(6)?,
        health: row.get(7)?,
    })
}

pub fn file_stats_for(
    conn: &Connection,
    file_ids: &[i64],
) -> Result<Vec<FileStatsRecord>, StorageError> {
    let template = format!("SELECT {STATS_COLUMNS} FROM file_stats WHERE file_id IN ({{ids}})");
    let mut rows = batched_query(conn, &template, file_ids, map_stats)?;
    rows.sort_by_key(|s| s.file_id);
    Ok(rows)
}

pub fn all_file_stats(conn: &Connection) -> Result<Vec<FileStatsRecord>, StorageError> {
    let sql = format!("SELECT {STATS_COLUMNS} FROM file_stats ORDER BY file_id");
    let mut stmt = conn.prepare_cached(&sql).map_err(sqlite_err)?;
    let rows = stmt.query_map([], map_stats).map_err(sqlite_err)?;
    collect_rows(rows)
}
