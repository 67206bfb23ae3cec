//! Context propagation from seed symbols along call edges.

use std::collections::VecDeque;

use strata_core::errors::GraphError;

use super::arena::{Adjacency, SymbolGraph};

/// Default weight of propagation when merged with PageRank.
pub const DEFAULT_MERGE_ALPHA: f64 = 0.6;

/// Relevance of every node to `seeds`. Seeds score 1. Callees at depth d
/// score `decay^d`, callers `(decay * 0.5)^d`. A node reached several ways
/// keeps its best score.
pub fn propagate(adj: &Adjacency, seeds: &[usize], decay: f64, max_depth: usize) -> Vec<f64> {
    let mut score = vec![0.0; adj.len()];
    for &s in seeds {
        score[s] = 1.0;
    }
    spread(&adj.out, seeds, decay, max_depth, &mut score);
    spread(&adj.inc, seeds, decay * 0.5, max_depth, &mut score);
    score
}

fn spread(lists: &[Vec<usize>], seeds: &[usize], factor: f64, max_depth: usize, score: &mut [f64]) {
    let mut depth = vec![usize::MAX; lists.len()];
    let mut queue = VecDeque::new();
    for &s in seeds {
        if depth[s] != 0 {
            depth[s] = 0;
            queue.push_back(s);
        }
    }
    while let Some(v) = queue.pop_front() {
        let d = depth[v];
        if d >= max_depth {
            continue;
        }
        for &u in &lists[v] {
            if depth[u] == usize::MAX {
                depth[u] = d + 1;
                let value = factor.powi((d + 1) as i32);
                if value > score[u] {
                    score[u] = value;
                }
                queue.push_back(u);
            }
        }
    }
}

/// `alpha * propagation + (1 - alpha) * pagerank`, each side normalised by
/// its maximum first.
pub fn merge_rankings(pagerank: &[f64], propagation: &[f64], alpha: f64) -> Vec<f64> {
    let pr_max = pagerank.iter().cloned().fold(0.0, f64::max);
    let prop_max = propagation.iter().cloned().fold(0.0, f64::max);
    let norm = |v: f64, max: f64| if max > 0.0 { v / max } else { 0.0 };
    pagerank
        .iter()
        .zip(propagation)
        .map(|(&pr, &prop)| alpha * norm(prop, prop_max) + (1.0 - alpha) * norm(pr, pr_max))
        .collect()
}

/// Propagate from symbol ids. Returns the reached symbols as (id, score),
/// best first, ties by id.
pub fn propagate_from(
    graph: &SymbolGraph,
    adj: &Adjacency,
    seeds: &[i64],
    decay: f64,
    max_depth: usize,
) -> Result<Vec<(i64, f64)>, GraphError> {
    if !(0.0..=1.0).contains(&decay) {
        return Err(GraphError::InvalidParameter {
            name: "decay".to_string(),
            message: format!("{decay} is outside [0, 1]"),
        });
    }
    let dense = seeds
        .iter()
        .map(|&id| graph.index_of(id))
        .collect::<Result<Vec<_>, _>>()?;
    let scores = propagate(adj, &dense, decay, max_depth);
    let mut reached: Vec<(i64, f64)> = scores
        .iter()
        .enumerate()
        .filter(|(_, &s)| s > 0.0)
        .map(|(v, &s)| (graph.id_of(v), s))
        .collect();
    reached.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
    Ok(reached)
}
