//! Strongly connected components (Tarjan) and tangle metrics.

use petgraph::algo::tarjan_scc;
use serde::{Deserialize, Serialize};

use super::arena::{Adjacency, SymbolGraph};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CycleReport {
    /// Cyclic components (size > 1, or a single node with a self-loop),
    /// each with sorted member ids, ordered by smallest member.
    pub sccs: Vec<Vec<i64>>,
    /// Dense node → position in `sccs`.
    #[serde(skip)]
    pub scc_of: Vec<Option<usize>>,
    /// Symbols in components of size > 1 over all symbols.
    pub tangle_ratio: f64,
    /// Directed pairs inside a cyclic component over all directed pairs.
    pub cycle_ratio: f64,
}

impl CycleReport {
    /// Number of components with more than one member.
    pub fn tangled_components(&self) -> usize {
        self.sccs.iter().filter(|c| c.len() > 1).count()
    }
}

pub fn find_cycles(graph: &SymbolGraph, adj: &Adjacency) -> CycleReport {
    let n = graph.node_count();
    if n == 0 {
        return CycleReport::default();
    }
    let mut components: Vec<Vec<usize>> = tarjan_scc(graph.graph())
        .into_iter()
        .map(|c| {
            let mut members: Vec<usize> = c.into_iter().map(|i| i.index()).collect();
            members.sort_unstable();
            members
        })
        .filter(|c| c.len() > 1 || adj.self_loop[c[0]])
        .collect();
    // Dense order is id order, so the smallest dense member is the smallest id.
    components.sort_by_key(|c| c[0]);

    let mut scc_of = vec![None; n];
    let mut tangled = 0usize;
    for (i, c) in components.iter().enumerate() {
        if c.len() > 1 {
            tangled += c.len();
        }
        for &v in c {
            scc_of[v] = Some(i);
        }
    }

    let pairs = adj.pair_count();
    let inside = (0..n)
        .map(|v| {
            adj.out[v]
                .iter()
                .filter(|&&t| scc_of[v].is_some() && scc_of[v] == scc_of[t])
                .count()
        })
        .sum::<usize>();

    CycleReport {
        sccs: components
            .iter()
            .map(|c| c.iter().map(|&v| graph.id_of(v)).collect())
            .collect(),
        scc_of,
        tangle_ratio: tangled as f64 / n as f64,
        cycle_ratio: if pairs == 0 {
            0.0
        } else {
            inside as f64 / pairs as f64
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::arena::chain_graph;

    #[test]
    fn test_three_cycle_plus_isolated_node() {
        let g = chain_graph(&[1, 2, 3, 4], &[(1, 2), (2, 3), (3, 1)]);
        let report = find_cycles(&g, &g.adjacency());
        assert_eq!(report.sccs, vec![vec![1, 2, 3]]);
        assert!((report.tangle_ratio - 0.75).abs() < 1e-12);
        assert_eq!(report.scc_of[3], None);
        assert!((report.cycle_ratio - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_dag_has_no_cycles() {
        let g = chain_graph(&[1, 2, 3], &[(1, 2), (2, 3), (1, 3)]);
        let report = find_cycles(&g, &g.adjacency());
        assert!(report.sccs.is_empty());
        assert_eq!(report.tangle_ratio, 0.0);
        assert_eq!(report.cycle_ratio, 0.0);
    }

    #[test]
    fn test_self_loop_reported_but_not_tangled() {
        let g = chain_graph(&[1, 2], &[(1, 1), (1, 2)]);
        let report = find_cycles(&g, &g.adjacency());
        assert_eq!(report.sccs, vec![vec![1]]);
        assert_eq!(report.tangled_components(), 0);
        assert_eq!(report.tangle_ratio, 0.0);
    }
}
