//! Spectral bisection by the Fiedler vector of the graph Laplacian.

use std::collections::VecDeque;

use strata_core::constants::SAMPLE_SEED;
use xxhash_rust::xxh3::xxh3_64_with_seed;

use super::arena::Adjacency;
use super::communities::modularity;

const CONVERGENCE: f64 = 1e-9;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpectralResult {
    /// Dense node → side (0 or 1). The smallest member of the largest
    /// component is always on side 0.
    pub partition: Vec<usize>,
    /// λ2 of the largest component's Laplacian, or 0 when the graph is
    /// disconnected.
    pub spectral_gap: f64,
    /// Modularity of the two-way split.
    pub modularity: f64,
    pub component_size: usize,
    pub iterations: usize,
}

/// Connected components of the undirected projection, each sorted,
/// largest first with ties broken by smallest member.
pub fn connected_components(adj: &Adjacency) -> Vec<Vec<usize>> {
    let n = adj.len();
    let mut seen = vec![false; n];
    let mut components = Vec::new();
    for start in 0..n {
        if seen[start] {
            continue;
        }
        seen[start] = true;
        let mut members = vec![start];
        let mut queue = VecDeque::from([start]);
        while let Some(v) = queue.pop_front() {
            for u in adj.undirected_neighbors(v) {
                if !seen[u] {
                    seen[u] = true;
                    members.push(u);
                    queue.push_back(u);
                }
            }
        }
        members.sort_unstable();
        components.push(members);
    }
    components.sort_by(|a, b| b.len().cmp(&a.len()).then(a[0].cmp(&b[0])));
    components
}

pub fn bisect(adj: &Adjacency, max_iter: usize) -> SpectralResult {
    let n = adj.len();
    if n == 0 {
        return SpectralResult::default();
    }
    let components = connected_components(adj);
    let lcc = &components[0];
    let mut partition = vec![1usize; n];
    for &v in lcc {
        partition[v] = 0;
    }

    let mut spectral_gap = 0.0;
    let mut iterations = 0;
    if components.len() == 1 && lcc.len() > 1 {
        let (fiedler, lambda, iters) = fiedler_vector(adj, lcc, max_iter);
        iterations = iters;
        spectral_gap = lambda.max(0.0);
        let flip = fiedler[0] < 0.0;
        for (i, &v) in lcc.iter().enumerate() {
            let negative = fiedler[i] < 0.0;
            partition[v] = usize::from(negative != flip);
        }
    }

    let modularity = modularity(adj, &partition);
    SpectralResult {
        partition,
        spectral_gap,
        modularity,
        component_size: lcc.len(),
        iterations,
    }
}

/// Power iteration on `cI - L` restricted to `members`, with the constant
/// vector deflated. Returns the vector (indexed like `members`), its
/// Laplacian eigenvalue and the iterations used.
fn fiedler_vector(adj: &Adjacency, members: &[usize], max_iter: usize) -> (Vec<f64>, f64, usize) {
    let k = members.len();
    let mut local = vec![usize::MAX; adj.len()];
    for (i, &v) in members.iter().enumerate() {
        local[v] = i;
    }
    let rows: Vec<Vec<(usize, f64)>> = members
        .iter()
        .map(|&v| adj.und[v].iter().map(|&(u, w)| (local[u], w)).collect())
        .collect();
    let degree: Vec<f64> = rows
        .iter()
        .map(|r| r.iter().map(|&(_, w)| w).sum())
        .collect();
    let shift = 2.0 * degree.iter().copied().fold(0.0, f64::max) + 1.0;

    let laplacian = |x: &[f64], out: &mut [f64]| {
        for i in 0..k {
            let mut acc = degree[i] * x[i];
            for &(j, w) in &rows[i] {
                acc -= w * x[j];
            }
            out[i] = acc;
        }
    };

    let mut x: Vec<f64> = (0..k)
        .map(|i| {
            let h = xxh3_64_with_seed(&(i as u64).to_le_bytes(), SAMPLE_SEED);
            (h as f64 / u64::MAX as f64) * 2.0 - 1.0
        })
        .collect();
    deflate_and_normalize(&mut x);

    let mut lx = vec![0.0; k];
    let mut iterations = 0;
    for _ in 0..max_iter.max(1) {
        iterations += 1;
        laplacian(&x, &mut lx);
        let mut next: Vec<f64> = x.iter().zip(&lx).map(|(a, b)| shift * a - b).collect();
        if !deflate_and_normalize(&mut next) {
            break;
        }
        let delta: f64 = x.iter().zip(&next).map(|(a, b)| (a - b).powi(2)).sum::<f64>().sqrt();
        x = next;
        if delta < CONVERGENCE {
            break;
        }
    }
    laplacian(&x, &mut lx);
    let lambda: f64 = x.iter().zip(&lx).map(|(a, b)| a * b).sum();
    (x, lambda, iterations)
}

/// Remove the mean and scale to unit length. False when nothing is left.
fn deflate_and_normalize(x: &mut [f64]) -> bool {
    let mean = x.iter().sum::<f64>() / x.len() as f64;
    x.iter_mut().for_each(|v| *v -= mean);
    let norm = x.iter().map(|v| v * v).sum::<f64>().sqrt();
    if norm < f64::EPSILON {
        return false;
    }
    x.iter_mut().for_each(|v| *v /= norm);
    true
}
