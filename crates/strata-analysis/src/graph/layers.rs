//! Topological layering on the cycle-suppressed DAG.

use std::collections::VecDeque;

use super::arena::Adjacency;

#[derive(Debug, Clone, PartialEq)]
pub struct LayerViolation {
    pub source: usize,
    pub target: usize,
    pub source_layer: usize,
    pub target_layer: usize,
    pub severity: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayerResult {
    pub layer: Vec<usize>,
    pub max_layer: usize,
    /// Ordered by (source, target).
    pub violations: Vec<LayerViolation>,
}

/// Back edges of a DFS that takes roots and visits successors in
/// ascending dense order. Self-loops count as back edges.
pub fn back_edges(adj: &Adjacency) -> Vec<(usize, usize)> {
    const WHITE: u8 = 0;
    const GREY: u8 = 1;
    const BLACK: u8 = 2;
    let n = adj.len();
    let mut color = vec![WHITE; n];
    let mut back = Vec::new();
    let mut stack: Vec<(usize, usize)> = Vec::new();
    for root in 0..n {
        if color[root] != WHITE {
            continue;
        }
        color[root] = GREY;
        stack.push((root, 0));
        while let Some(top) = stack.last_mut() {
            let (v, next) = *top;
            if let Some(&u) = adj.out[v].get(next) {
                top.1 += 1;
                match color[u] {
                    WHITE => {
                        color[u] = GREY;
                        stack.push((u, 0));
                    }
                    GREY => back.push((v, u)),
                    _ => {}
                }
            } else {
                color[v] = BLACK;
                stack.pop();
            }
        }
    }
    back.sort_unstable();
    back
}

/// Longest-path layer of every node after removing back edges, plus the
/// edges that point from a higher layer to a lower one.
pub fn layers(adj: &Adjacency) -> LayerResult {
    let n = adj.len();
    if n == 0 {
        return LayerResult::default();
    }
    let back = back_edges(adj);
    let is_back = |s: usize, t: usize| back.binary_search(&(s, t)).is_ok();

    let mut indegree = vec![0usize; n];
    for s in 0..n {
        for &t in &adj.out[s] {
            if !is_back(s, t) {
                indegree[t] += 1;
            }
        }
    }
    let mut layer = vec![0usize; n];
    let mut queue: VecDeque<usize> = (0..n).filter(|&v| indegree[v] == 0).collect();
    while let Some(v) = queue.pop_front() {
        for &t in &adj.out[v] {
            if is_back(v, t) {
                continue;
            }
            layer[t] = layer[t].max(layer[v] + 1);
            indegree[t] -= 1;
            if indegree[t] == 0 {
                queue.push_back(t);
            }
        }
    }
    let max_layer = layer.iter().copied().max().unwrap_or(0);
    let scale = max_layer.max(1) as f64;

    let mut violations = Vec::new();
    for s in 0..n {
        for &t in &adj.out[s] {
            if layer[s] > layer[t] {
                violations.push(LayerViolation {
                    source: s,
                    target: t,
                    source_layer: layer[s],
                    target_layer: layer[t],
                    severity: (layer[s] - layer[t]) as f64 / scale,
                });
            }
        }
    }
    LayerResult {
        layer,
        max_layer,
        violations,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chain_layers() {
        let adj = Adjacency::from_edges(4, &[(0, 1), (1, 2), (0, 3), (3, 2)]);
        let r = layers(&adj);
        assert_eq!(r.layer, vec![0, 1, 2, 1]);
        assert_eq!(r.max_layer, 2);
        assert!(r.violations.is_empty());
    }

    #[test]
    fn test_cycle_back_edge_is_the_violation() {
        let adj = Adjacency::from_edges(3, &[(0, 1), (1, 2), (2, 0)]);
        assert_eq!(back_edges(&adj), vec![(2, 0)]);
        let r = layers(&adj);
        assert_eq!(r.layer, vec![0, 1, 2]);
        assert_eq!(r.violations.len(), 1);
        let v = &r.violations[0];
        assert_eq!((v.source, v.target), (2, 0));
        assert!((v.severity - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_self_loop_is_not_a_violation() {
        let adj = Adjacency::from_edges(2, &[(0, 0), (0, 1)]);
        let r = layers(&adj);
        assert_eq!(r.layer, vec![0, 1]);
        assert!(r.violations.is_empty());
    }
}
