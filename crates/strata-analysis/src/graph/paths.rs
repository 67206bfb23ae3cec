//! Bounded path queries over the symbol graph.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};
use strata_core::errors::GraphError;

use super::arena::{Adjacency, SymbolGraph};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Along edges: what `start` depends on.
    Outgoing,
    /// Against edges: what depends on `start`.
    Incoming,
    Both,
}

fn neighbors<'a>(
    adj: &'a Adjacency,
    v: usize,
    direction: Direction,
) -> Box<dyn Iterator<Item = usize> + 'a> {
    match direction {
        Direction::Outgoing => Box::new(adj.out[v].iter().copied()),
        Direction::Incoming => Box::new(adj.inc[v].iter().copied()),
        Direction::Both => Box::new(adj.out[v].iter().chain(&adj.inc[v]).copied()),
    }
}

/// Shortest directed path from `from` to `to` with at most `max_depth`
/// edges, as symbol ids including both ends. Neighbours are expanded in
/// id order, so the first shortest path found is stable.
pub fn shortest_path(
    graph: &SymbolGraph,
    adj: &Adjacency,
    from: i64,
    to: i64,
    max_depth: usize,
) -> Result<Option<Vec<i64>>, GraphError> {
    let source = graph.index_of(from)?;
    let target = graph.index_of(to)?;
    if source == target {
        return Ok(Some(vec![from]));
    }
    let n = adj.len();
    let mut parent = vec![usize::MAX; n];
    let mut depth = vec![usize::MAX; n];
    depth[source] = 0;
    let mut queue = VecDeque::from([source]);
    while let Some(v) = queue.pop_front() {
        if depth[v] >= max_depth {
            continue;
        }
        for &u in &adj.out[v] {
            if depth[u] != usize::MAX {
                continue;
            }
            depth[u] = depth[v] + 1;
            parent[u] = v;
            if u == target {
                let mut path = vec![graph.id_of(u)];
                let mut cur = u;
                while cur != source {
                    cur = parent[cur];
                    path.push(graph.id_of(cur));
                }
                path.reverse();
                return Ok(Some(path));
            }
            queue.push_back(u);
        }
    }
    Ok(None)
}

/// Symbols reachable from `start` within `max_depth` hops, as
/// (id, depth) sorted by depth then id. `start` itself is excluded.
pub fn reachable(
    graph: &SymbolGraph,
    adj: &Adjacency,
    start: i64,
    direction: Direction,
    max_depth: usize,
) -> Result<Vec<(i64, usize)>, GraphError> {
    let origin = graph.index_of(start)?;
    let mut depth = vec![usize::MAX; adj.len()];
    depth[origin] = 0;
    let mut queue = VecDeque::from([origin]);
    let mut found = Vec::new();
    while let Some(v) = queue.pop_front() {
        if depth[v] >= max_depth {
            continue;
        }
        for u in neighbors(adj, v, direction) {
            if depth[u] == usize::MAX {
                depth[u] = depth[v] + 1;
                found.push((graph.id_of(u), depth[u]));
                queue.push_back(u);
            }
        }
    }
    found.sort_by_key(|&(id, d)| (d, id));
    Ok(found)
}
