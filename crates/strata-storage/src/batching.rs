//! Chunked queries over externally sized id lists.
//!
//! Every statement binds at most [`MAX_SQL_PARAMS`] parameters. Templates
//! mark the id list with `{ids}`. A template that uses the list more than
//! once gets proportionally smaller chunks, since each chunk is bound once
//! per occurrence.
//!
//! A predicate over two lists (`a IN (A) AND b IN (B)`) cannot be chunked
//! by slicing both lists in lockstep: a row whose `a` is in chunk 1 and
//! whose `b` is in chunk 2 would never be seen. [`batched_and`] instead
//! fetches each side's matches independently and intersects in memory.

use std::hash::Hash;

use rusqlite::{params_from_iter, Connection, Row, ToSql};
use rustc_hash::FxHashSet;
use strata_core::constants::MAX_SQL_PARAMS;
use strata_core::errors::StorageError;

use crate::queries::util::sqlite_err;

const IDS_MARKER: &str = "{ids}";

/// Ids per chunk when each id is bound `placeholders_per_id` times.
pub fn chunk_size(placeholders_per_id: usize) -> usize {
    (MAX_SQL_PARAMS / placeholders_per_id.max(1)).max(1)
}

/// `?,?,?` with `n` placeholders.
pub fn placeholders(n: usize) -> String {
    let mut s = String::with_capacity(n * 2);
    for i in 0..n {
        if i > 0 {
            s.push(',');
        }
        s.push('?');
    }
    s
}

fn expand(template: &str, n: usize) -> (String, usize) {
    let occurrences = template.matches(IDS_MARKER).count().max(1);
    (template.replace(IDS_MARKER, &placeholders(n)), occurrences)
}

/// Run a SELECT template once per chunk and concatenate the mapped rows.
pub fn batched_query<V, T, F>(
    conn: &Connection,
    template: &str,
    ids: &[V],
    mut map: F,
) -> Result<Vec<T>, StorageError>
where
    V: ToSql,
    F: FnMut(&Row<'_>) -> rusqlite::Result<T>,
{
    let mut result = Vec::new();
    if ids.is_empty() {
        return Ok(result);
    }
    let occurrences = template.matches(IDS_MARKER).count().max(1);
    for chunk in ids.chunks(chunk_size(occurrences)) {
        let (sql, occ) = expand(template, chunk.len());
        let mut stmt = conn.prepare(&sql).map_err(sqlite_err)?;
        let bound = (0..occ).flat_map(|_| chunk.iter());
        let rows = stmt
            .query_map(params_from_iter(bound), &mut map)
            .map_err(sqlite_err)?;
        for row in rows {
            result.push(row.map_err(sqlite_err)?);
        }
    }
    Ok(result)
}

/// Run a DML template once per chunk. Returns total affected rows.
pub fn batched_execute<V: ToSql>(
    conn: &Connection,
    template: &str,
    ids: &[V],
) -> Result<usize, StorageError> {
    if ids.is_empty() {
        return Ok(0);
    }
    let occurrences = template.matches(IDS_MARKER).count().max(1);
    let mut affected = 0;
    for chunk in ids.chunks(chunk_size(occurrences)) {
        let (sql, occ) = expand(template, chunk.len());
        let bound = (0..occ).flat_map(|_| chunk.iter());
        affected += conn
            .execute(&sql, params_from_iter(bound))
            .map_err(sqlite_err)?;
    }
    Ok(affected)
}

/// Rows matching `template_a` over `ids_a` AND `template_b` over `ids_b`.
///
/// Both templates must select the same row shape. The result is sorted
/// and free of duplicates.
pub fn batched_and<V, W, T, F>(
    conn: &Connection,
    template_a: &str,
    ids_a: &[V],
    template_b: &str,
    ids_b: &[W],
    mut map: F,
) -> Result<Vec<T>, StorageError>
where
    V: ToSql,
    W: ToSql,
    T: Eq + Hash + Ord,
    F: FnMut(&Row<'_>) -> rusqlite::Result<T>,
{
    if ids_a.is_empty() || ids_b.is_empty() {
        return Ok(Vec::new());
    }
    let side_a: FxHashSet<T> = batched_query(conn, template_a, ids_a, &mut map)?
        .into_iter()
        .collect();
    let side_b: FxHashSet<T> = batched_query(conn, template_b, ids_b, &mut map)?
        .into_iter()
        .collect();
    let mut both: Vec<T> = side_a.into_iter().filter(|row| side_b.contains(row)).collect();
    both.sort();
    Ok(both)
}
