//! Typed graph arena: symbols as dense-indexed petgraph nodes.
//!
//! Nodes are inserted in symbol-id order, so a node's dense index order
//! is its id order and every algorithm that visits "in id order" can
//! simply iterate `0..n`.

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use rustc_hash::FxHashMap;
use strata_core::errors::GraphError;
use strata_storage::queries::edges::EdgeRecord;
use strata_storage::queries::symbols::IndexedSymbol;

/// A symbol node.
#[derive(Debug, Clone, PartialEq)]
pub struct SymbolNode {
    pub id: i64,
    pub file_id: i64,
    pub name: String,
    pub kind: String,
}

/// Edge payload.
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeData {
    pub kind: String,
    pub confidence: f64,
}

/// The symbol graph of one consistent snapshot.
#[derive(Debug, Default)]
pub struct SymbolGraph {
    graph: DiGraph<SymbolNode, EdgeData>,
    index: FxHashMap<i64, NodeIndex>,
}

/// Deduplicated adjacency in dense indices, derived once per analytics pass.
#[derive(Debug, Clone, Default)]
pub struct Adjacency {
    /// Distinct successors, ascending.
    pub out: Vec<Vec<usize>>,
    /// Distinct predecessors, ascending.
    pub inc: Vec<Vec<usize>>,
    /// Undirected projection without self-loops. Weight counts the
    /// directed edges (any kind) between the pair.
    pub und: Vec<Vec<(usize, f64)>>,
    pub self_loop: Vec<bool>,
}

impl Adjacency {
    pub fn len(&self) -> usize {
        self.out.len()
    }

    pub fn is_empty(&self) -> bool {
        self.out.is_empty()
    }

    /// Number of distinct directed (source, target) pairs.
    pub fn pair_count(&self) -> usize {
        self.out.iter().map(Vec::len).sum()
    }

    /// Unweighted undirected neighbour lists.
    pub fn undirected_neighbors(&self, v: usize) -> impl Iterator<Item = usize> + '_ {
        self.und[v].iter().map(|&(u, _)| u)
    }

    /// Build directly from dense edges. Used by tests and benches.
    pub fn from_edges(n: usize, edges: &[(usize, usize)]) -> Self {
        let mut adj = Adjacency {
            out: vec![Vec::new(); n],
            inc: vec![Vec::new(); n],
            und: vec![Vec::new(); n],
            self_loop: vec![false; n],
        };
        let mut und: Vec<FxHashMap<usize, f64>> = vec![FxHashMap::default(); n];
        for &(s, t) in edges {
            adj.out[s].push(t);
            adj.inc[t].push(s);
            if s == t {
                adj.self_loop[s] = true;
            } else {
                *und[s].entry(t).or_insert(0.0) += 1.0;
                *und[t].entry(s).or_insert(0.0) += 1.0;
            }
        }
        for v in 0..n {
            adj.out[v].sort_unstable();
            adj.out[v].dedup();
            adj.inc[v].sort_unstable();
            adj.inc[v].dedup();
            let mut row: Vec<(usize, f64)> = und[v].iter().map(|(&u, &w)| (u, w)).collect();
            row.sort_by_key(|&(u, _)| u);
            adj.und[v] = row;
        }
        adj
    }
}

impl SymbolGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from live symbols and resolved edges. Edges whose endpoints
    /// are not among `symbols` are ignored.
    pub fn from_records(symbols: &[IndexedSymbol], edges: &[EdgeRecord]) -> Self {
        let mut ordered: Vec<&IndexedSymbol> = symbols.iter().collect();
        ordered.sort_by_key(|s| s.id);
        let mut g = Self::new();
        for s in ordered {
            g.add_symbol(SymbolNode {
                id: s.id,
                file_id: s.file_id,
                name: s.name.clone(),
                kind: s.kind.clone(),
            });
        }
        let mut sorted: Vec<&EdgeRecord> = edges.iter().collect();
        sorted.sort_by(|a, b| {
            (a.source_id, a.target_id, &a.kind).cmp(&(b.source_id, b.target_id, &b.kind))
        });
        for e in sorted {
            g.add_edge(
                e.source_id,
                e.target_id,
                EdgeData {
                    kind: e.kind.clone(),
                    confidence: e.confidence,
                },
            );
        }
        g
    }

    /// Add a symbol. Re-adding a known id returns the existing node.
    pub fn add_symbol(&mut self, node: SymbolNode) -> NodeIndex {
        if let Some(&idx) = self.index.get(&node.id) {
            return idx;
        }
        let id = node.id;
        let idx = self.graph.add_node(node);
        self.index.insert(id, idx);
        idx
    }

    /// Add an edge between two known symbols. Returns false if either end
    /// is missing.
    pub fn add_edge(&mut self, source_id: i64, target_id: i64, data: EdgeData) -> bool {
        match (self.index.get(&source_id), self.index.get(&target_id)) {
            (Some(&s), Some(&t)) => {
                self.graph.add_edge(s, t, data);
                true
            }
            _ => false,
        }
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn graph(&self) -> &DiGraph<SymbolNode, EdgeData> {
        &self.graph
    }

    pub fn node(&self, v: usize) -> &SymbolNode {
        &self.graph[NodeIndex::new(v)]
    }

    pub fn id_of(&self, v: usize) -> i64 {
        self.node(v).id
    }

    /// Dense index of a symbol id.
    pub fn index_of(&self, id: i64) -> Result<usize, GraphError> {
        self.index
            .get(&id)
            .map(|i| i.index())
            .ok_or(GraphError::SymbolNotFound { id })
    }

    pub fn contains(&self, id: i64) -> bool {
        self.index.contains_key(&id)
    }

    pub fn adjacency(&self) -> Adjacency {
        let edges: Vec<(usize, usize)> = self
            .graph
            .edge_references()
            .map(|e| (e.source().index(), e.target().index()))
            .collect();
        Adjacency::from_edges(self.node_count(), &edges)
    }

    /// Distinct (in, out) neighbour counts of node `v`.
    pub fn degree(&self, v: usize) -> (usize, usize) {
        let idx = NodeIndex::new(v);
        let mut inc: Vec<usize> = self
            .graph
            .neighbors_directed(idx, Direction::Incoming)
            .map(|n| n.index())
            .collect();
        inc.sort_unstable();
        inc.dedup();
        let mut out: Vec<usize> = self
            .graph
            .neighbors_directed(idx, Direction::Outgoing)
            .map(|n| n.index())
            .collect();
        out.sort_unstable();
        out.dedup();
        (inc.len(), out.len())
    }
}

#[cfg(test)]
pub(crate) fn chain_graph(ids: &[i64], edges: &[(i64, i64)]) -> SymbolGraph {
    let mut g = SymbolGraph::new();
    for &id in ids {
        g.add_symbol(SymbolNode {
            id,
            file_id: id,
            name: format!("s{id}"),
            kind: "function".to_string(),
        });
    }
    for &(s, t) in edges {
        g.add_edge(
            s,
            t,
            EdgeData {
                kind: "call".to_string(),
                confidence: 1.0,
            },
        );
    }
    g
}
