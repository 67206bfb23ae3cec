//! Louvain community detection on the undirected weighted projection.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use super::arena::Adjacency;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Community {
    pub id: usize,
    pub size: usize,
    pub conductance: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommunityResult {
    /// Dense node → community id. Ids are numbered by each community's
    /// smallest member.
    pub assignment: Vec<usize>,
    pub communities: Vec<Community>,
    pub modularity: f64,
}

/// One level of the Louvain hierarchy.
struct Level {
    adj: Vec<Vec<(usize, f64)>>,
    /// Weight of edges collapsed inside each node, each counted once.
    inner: Vec<f64>,
}

impl Level {
    fn degree(&self, v: usize) -> f64 {
        self.adj[v].iter().map(|&(_, w)| w).sum::<f64>() + 2.0 * self.inner[v]
    }
}

pub fn louvain(adj: &Adjacency, max_passes: usize) -> CommunityResult {
    let n = adj.len();
    if n == 0 {
        return CommunityResult::default();
    }
    let mut level = Level {
        adj: adj.und.clone(),
        inner: vec![0.0; n],
    };
    // Original node → node of the current level.
    let mut membership: Vec<usize> = (0..n).collect();

    for _ in 0..max_passes.max(1) {
        let (community, moved) = local_moving(&level, max_passes);
        if !moved {
            break;
        }
        let (renumbered, count) = renumber(&community);
        for m in membership.iter_mut() {
            *m = renumbered[*m];
        }
        level = aggregate(&level, &renumbered, count);
    }

    let assignment = by_smallest_member(&membership);
    let modularity = modularity(adj, &assignment);
    let communities = summarize(adj, &assignment);
    CommunityResult {
        assignment,
        communities,
        modularity,
    }
}

fn local_moving(level: &Level, max_sweeps: usize) -> (Vec<usize>, bool) {
    let n = level.adj.len();
    let k: Vec<f64> = (0..n).map(|v| level.degree(v)).collect();
    let m2: f64 = k.iter().sum();
    let mut community: Vec<usize> = (0..n).collect();
    let mut tot = k.clone();
    let mut moved_any = false;
    if m2 == 0.0 {
        return (community, false);
    }

    for _ in 0..max_sweeps.max(1) {
        let mut moved = false;
        for v in 0..n {
            let own = community[v];
            let mut links: FxHashMap<usize, f64> = FxHashMap::default();
            for &(u, w) in &level.adj[v] {
                *links.entry(community[u]).or_insert(0.0) += w;
            }
            tot[own] -= k[v];
            let gain = |c: usize, links_to_c: f64| links_to_c - tot[c] * k[v] / m2;

            let mut best = own;
            let mut best_gain = gain(own, links.get(&own).copied().unwrap_or(0.0));
            let mut candidates: Vec<(usize, f64)> = links.into_iter().collect();
            candidates.sort_by_key(|&(c, _)| c);
            for (c, w) in candidates {
                let g = gain(c, w);
                if g > best_gain + 1e-12 {
                    best = c;
                    best_gain = g;
                }
            }
            tot[best] += k[v];
            if best != own {
                community[v] = best;
                moved = true;
                moved_any = true;
            }
        }
        if !moved {
            break;
        }
    }
    (community, moved_any)
}

/// Compact labels to 0..count in order of first appearance.
fn renumber(labels: &[usize]) -> (Vec<usize>, usize) {
    let mut map: FxHashMap<usize, usize> = FxHashMap::default();
    let out = labels
        .iter()
        .map(|&l| {
            let next = map.len();
            *map.entry(l).or_insert(next)
        })
        .collect();
    (out, map.len())
}

fn aggregate(level: &Level, community: &[usize], count: usize) -> Level {
    let mut inner = vec![0.0; count];
    let mut rows: Vec<FxHashMap<usize, f64>> = vec![FxHashMap::default(); count];
    for (v, row) in level.adj.iter().enumerate() {
        let cv = community[v];
        inner[cv] += level.inner[v];
        for &(u, w) in row {
            let cu = community[u];
            if cu == cv {
                // Each undirected edge is visited from both ends.
                inner[cv] += w / 2.0;
            } else {
                *rows[cv].entry(cu).or_insert(0.0) += w;
            }
        }
    }
    let adj = rows
        .into_iter()
        .map(|r| {
            let mut r: Vec<(usize, f64)> = r.into_iter().collect();
            r.sort_by_key(|&(u, _)| u);
            r
        })
        .collect();
    Level { adj, inner }
}

/// Relabel so community ids follow their smallest dense member.
fn by_smallest_member(labels: &[usize]) -> Vec<usize> {
    renumber(labels).0
}

/// Newman modularity of `assignment` on the undirected projection.
pub fn modularity(adj: &Adjacency, assignment: &[usize]) -> f64 {
    let count = assignment.iter().max().map_or(0, |&c| c + 1);
    let mut inside = vec![0.0; count];
    let mut tot = vec![0.0; count];
    let mut m2 = 0.0;
    for (v, row) in adj.und.iter().enumerate() {
        for &(u, w) in row {
            m2 += w;
            tot[assignment[v]] += w;
            if assignment[u] == assignment[v] {
                inside[assignment[v]] += w;
            }
        }
    }
    if m2 == 0.0 {
        return 0.0;
    }
    (0..count)
        .map(|c| inside[c] / m2 - (tot[c] / m2).powi(2))
        .sum()
}

fn summarize(adj: &Adjacency, assignment: &[usize]) -> Vec<Community> {
    let count = assignment.iter().max().map_or(0, |&c| c + 1);
    let mut size = vec![0usize; count];
    let mut vol = vec![0.0; count];
    let mut cut = vec![0.0; count];
    let mut total = 0.0;
    for (v, row) in adj.und.iter().enumerate() {
        let c = assignment[v];
        size[c] += 1;
        for &(u, w) in row {
            vol[c] += w;
            total += w;
            if assignment[u] != c {
                cut[c] += w;
            }
        }
    }
    (0..count)
        .map(|c| {
            let denom = vol[c].min(total - vol[c]);
            let conductance = if size[c] <= 1 || denom <= 0.0 {
                0.0
            } else {
                cut[c] / denom
            };
            Community {
                id: c,
                size: size[c],
                conductance,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_triangles() -> Adjacency {
        Adjacency::from_edges(
            6,
            &[(0, 1), (1, 2), (2, 0), (3, 4), (4, 5), (5, 3), (2, 3)],
        )
    }

    #[test]
    fn test_two_triangles_split() {
        let r = louvain(&two_triangles(), 20);
        assert_eq!(r.assignment, vec![0, 0, 0, 1, 1, 1]);
        assert_eq!(r.communities.len(), 2);
        assert!(r.modularity > 0.3);
        // One bridging edge over a volume of 7 per side.
        assert!((r.communities[0].conductance - 1.0 / 7.0).abs() < 1e-9);
    }

    #[test]
    fn test_ids_follow_smallest_member() {
        let adj = Adjacency::from_edges(4, &[(0, 2), (1, 3)]);
        let r = louvain(&adj, 20);
        assert_eq!(r.assignment[0], 0);
        assert_eq!(r.assignment[2], 0);
        assert_eq!(r.assignment[1], 1);
        assert_eq!(r.assignment[3], 1);
    }

    #[test]
    fn test_edgeless_graph_is_all_singletons() {
        let adj = Adjacency::from_edges(3, &[]);
        let r = louvain(&adj, 20);
        assert_eq!(r.assignment, vec![0, 1, 2]);
        assert_eq!(r.modularity, 0.0);
        assert!(r.communities.iter().all(|c| c.conductance == 0.0));
    }

    #[test]
    fn test_deterministic() {
        let a = louvain(&two_triangles(), 20);
        let b = louvain(&two_triangles(), 20);
        assert_eq!(a, b);
    }
}
