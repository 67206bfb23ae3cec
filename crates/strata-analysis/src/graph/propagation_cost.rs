//! Propagation cost: the share of ordered pairs joined by a directed path.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use super::arena::Adjacency;
use super::size_guard::{Precision, SamplePlan};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PropagationCost {
    pub value: f64,
    pub precision: Precision,
}

/// Nodes reachable from `start` by directed edges, not counting `start`.
pub fn reach_count(adj: &Adjacency, start: usize, seen: &mut Vec<bool>) -> usize {
    seen.iter_mut().for_each(|s| *s = false);
    seen[start] = true;
    let mut queue = VecDeque::from([start]);
    let mut count = 0;
    while let Some(v) = queue.pop_front() {
        for &u in &adj.out[v] {
            if !seen[u] {
                seen[u] = true;
                count += 1;
                queue.push_back(u);
            }
        }
    }
    count
}

pub fn propagation_cost(adj: &Adjacency, plan: &SamplePlan) -> PropagationCost {
    let n = adj.len();
    if n < 2 {
        return PropagationCost {
            value: 0.0,
            precision: plan.precision,
        };
    }
    let mut seen = vec![false; n];
    let reached: usize = plan
        .sources
        .iter()
        .map(|&s| reach_count(adj, s, &mut seen))
        .sum();
    let pairs = (n * (n - 1)) as f64;
    PropagationCost {
        value: (reached as f64 * plan.scale() / pairs).min(1.0),
        precision: plan.precision,
    }
}
