//! Betweenness, closeness and eigenvector centrality.

use std::collections::VecDeque;

use strata_core::constants::{EIGENVECTOR_MAX_ITER, EIGENVECTOR_TOLERANCE};

use super::arena::Adjacency;
use super::size_guard::SamplePlan;

/// Directed Brandes betweenness from the plan's sources, lifted to all
/// nodes when sampled and normalised by (n-1)(n-2).
pub fn betweenness(adj: &Adjacency, plan: &SamplePlan) -> Vec<f64> {
    let n = adj.len();
    let mut centrality = vec![0.0; n];
    if n < 3 {
        return centrality;
    }
    let mut sigma = vec![0.0f64; n];
    let mut dist = vec![-1i64; n];
    let mut delta = vec![0.0f64; n];
    let mut preds: Vec<Vec<usize>> = vec![Vec::new(); n];
    let mut order = Vec::with_capacity(n);
    let mut queue = VecDeque::new();

    for &s in &plan.sources {
        for v in 0..n {
            sigma[v] = 0.0;
            dist[v] = -1;
            delta[v] = 0.0;
            preds[v].clear();
        }
        order.clear();
        sigma[s] = 1.0;
        dist[s] = 0;
        queue.push_back(s);
        while let Some(v) = queue.pop_front() {
            order.push(v);
            for &w in &adj.out[v] {
                if dist[w] < 0 {
                    dist[w] = dist[v] + 1;
                    queue.push_back(w);
                }
                if dist[w] == dist[v] + 1 {
                    sigma[w] += sigma[v];
                    preds[w].push(v);
                }
            }
        }
        while let Some(w) = order.pop() {
            for &v in &preds[w] {
                delta[v] += sigma[v] / sigma[w] * (1.0 + delta[w]);
            }
            if w != s {
                centrality[w] += delta[w];
            }
        }
    }

    let norm = plan.scale() / ((n - 1) * (n - 2)) as f64;
    centrality.iter_mut().for_each(|c| *c *= norm);
    centrality
}

/// Wasserman-Faust closeness on the undirected projection:
/// `(r / (n-1)) * (r / Σd)` for the r nodes a node reaches. Sampled runs
/// estimate r and Σd from the plan's sources.
pub fn closeness(adj: &Adjacency, plan: &SamplePlan) -> Vec<f64> {
    let n = adj.len();
    let mut reach = vec![0usize; n];
    let mut total = vec![0usize; n];
    let mut dist = vec![usize::MAX; n];
    let mut queue = VecDeque::new();
    let mut is_source = vec![false; n];

    for &s in &plan.sources {
        is_source[s] = true;
        dist.iter_mut().for_each(|d| *d = usize::MAX);
        dist[s] = 0;
        queue.push_back(s);
        while let Some(v) = queue.pop_front() {
            for u in adj.undirected_neighbors(v) {
                if dist[u] == usize::MAX {
                    dist[u] = dist[v] + 1;
                    reach[u] += 1;
                    total[u] += dist[u];
                    queue.push_back(u);
                }
            }
        }
    }

    (0..n)
        .map(|v| {
            let others = plan.sources.len() - usize::from(is_source[v]);
            if reach[v] == 0 || others == 0 {
                return 0.0;
            }
            let r = reach[v] as f64;
            (r / others as f64) * (r / total[v] as f64)
        })
        .collect()
}

/// Power iteration on `A + I` over the undirected projection, unit length.
/// All zero when there are no edges.
pub fn eigenvector(adj: &Adjacency) -> Vec<f64> {
    let n = adj.len();
    if adj.und.iter().all(Vec::is_empty) {
        return vec![0.0; n];
    }
    let mut x = vec![1.0 / (n as f64).sqrt(); n];
    let mut next = vec![0.0; n];
    for _ in 0..EIGENVECTOR_MAX_ITER {
        for v in 0..n {
            next[v] = x[v] + adj.und[v].iter().map(|&(u, w)| w * x[u]).sum::<f64>();
        }
        let norm = next.iter().map(|v| v * v).sum::<f64>().sqrt();
        next.iter_mut().for_each(|v| *v /= norm);
        let diff: f64 = x.iter().zip(&next).map(|(a, b)| (a - b).abs()).sum();
        std::mem::swap(&mut x, &mut next);
        if diff < EIGENVECTOR_TOLERANCE * n as f64 {
            break;
        }
    }
    x
}
