//! One full analytics pass over a consistent graph snapshot.

use std::time::Instant;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use strata_core::config::AnalysisConfig;
use strata_core::tracing::metrics;
use strata_storage::queries::metrics::{
    CommunityRecord, LayerViolationRecord, SymbolMetricsRecord,
};

use super::arena::SymbolGraph;
use super::centrality::{betweenness, closeness, eigenvector};
use super::communities::louvain;
use super::cycles::find_cycles;
use super::layers::layers;
use super::pagerank::{adaptive_damping, pagerank};
use super::propagation_cost::propagation_cost;
use super::size_guard::{Precision, SizeGuard, SizeGuardNotice};
use super::spectral::bisect;
use crate::stats::percentile;

/// Graph-level results of one pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsSummary {
    pub nodes: usize,
    pub edges: usize,
    pub tangle_ratio: f64,
    pub cycle_ratio: f64,
    /// Cyclic components, self-loops included.
    pub cycles: usize,
    pub damping: f64,
    pub pagerank_converged: bool,
    pub communities: usize,
    pub modularity: f64,
    pub max_layer: usize,
    pub layer_violations: usize,
    pub spectral_gap: f64,
    pub spectral_modularity: f64,
    pub propagation_cost: f64,
    pub propagation_precision: Precision,
    pub betweenness_precision: Precision,
    pub closeness_precision: Precision,
    pub god_components: usize,
    pub bottlenecks: usize,
    pub notices: Vec<SizeGuardNotice>,
}

impl Default for AnalyticsSummary {
    fn default() -> Self {
        Self {
            nodes: 0,
            edges: 0,
            tangle_ratio: 0.0,
            cycle_ratio: 0.0,
            cycles: 0,
            damping: adaptive_damping(0.0),
            pagerank_converged: true,
            communities: 0,
            modularity: 0.0,
            max_layer: 0,
            layer_violations: 0,
            spectral_gap: 0.0,
            spectral_modularity: 0.0,
            propagation_cost: 0.0,
            propagation_precision: Precision::Exact,
            betweenness_precision: Precision::Exact,
            closeness_precision: Precision::Exact,
            god_components: 0,
            bottlenecks: 0,
            notices: Vec::new(),
        }
    }
}

/// Per-file structural flags consumed by file health.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FileGraphFlags {
    pub in_cycle: bool,
    pub has_god: bool,
}

#[derive(Debug, Clone, Default)]
pub struct AnalyticsOutput {
    pub summary: AnalyticsSummary,
    /// Ordered by symbol id.
    pub metrics: Vec<SymbolMetricsRecord>,
    pub communities: Vec<CommunityRecord>,
    pub violations: Vec<LayerViolationRecord>,
    pub sccs: Vec<Vec<i64>>,
    pub file_flags: FxHashMap<i64, FileGraphFlags>,
}

pub fn analyze(graph: &SymbolGraph, config: &AnalysisConfig) -> AnalyticsOutput {
    let started = Instant::now();
    let n = graph.node_count();
    let span = tracing::info_span!("analytics", graph_nodes = n);
    let _guard = span.enter();
    if n == 0 {
        return AnalyticsOutput::default();
    }

    let adj = graph.adjacency();
    let ids: Vec<i64> = (0..n).map(|v| graph.id_of(v)).collect();
    let guard = SizeGuard::new(config);
    let mut notices = Vec::new();

    let cycles = find_cycles(graph, &adj);
    let damping = config
        .pagerank_damping
        .unwrap_or_else(|| adaptive_damping(cycles.cycle_ratio));
    let rank = pagerank(&adj, damping, None);
    let communities = louvain(&adj, config.effective_louvain_max_passes());
    let layering = layers(&adj);
    let spectral = bisect(&adj, config.effective_spectral_max_iter());

    let (between_plan, notice) = guard.plan("betweenness", &ids);
    notices.extend(notice);
    let between = betweenness(&adj, &between_plan);
    let (close_plan, notice) = guard.plan("closeness", &ids);
    notices.extend(notice);
    let close = closeness(&adj, &close_plan);
    let eigen = eigenvector(&adj);
    let (cost_plan, notice) = guard.plan("propagation_cost", &ids);
    notices.extend(notice);
    let cost = propagation_cost(&adj, &cost_plan);

    let god_threshold = config.effective_god_degree_threshold();
    let p90 = percentile(&between, 90);
    let mut file_flags: FxHashMap<i64, FileGraphFlags> = FxHashMap::default();
    let mut gods = 0;
    let mut bottlenecks = 0;
    let mut metrics_rows = Vec::with_capacity(n);
    for v in 0..n {
        let in_degree = adj.inc[v].len();
        let out_degree = adj.out[v].len();
        let is_god = in_degree + out_degree > god_threshold;
        let is_bottleneck = between[v] > 0.0 && between[v] > p90;
        gods += usize::from(is_god);
        bottlenecks += usize::from(is_bottleneck);
        let scc_id = cycles.scc_of[v];
        let tangled = scc_id.is_some_and(|i| cycles.sccs[i].len() > 1);

        let flags = file_flags.entry(graph.node(v).file_id).or_default();
        flags.in_cycle |= tangled;
        flags.has_god |= is_god;

        metrics_rows.push(SymbolMetricsRecord {
            symbol_id: ids[v],
            in_degree: in_degree as i64,
            out_degree: out_degree as i64,
            pagerank: rank.scores[v],
            betweenness: between[v],
            closeness: close[v],
            eigenvector: eigen[v],
            scc_id: scc_id.map(|i| i as i64),
            community_id: communities.assignment[v] as i64,
            layer: layering.layer[v] as i64,
            partition: spectral.partition[v] as i64,
            is_god,
            is_bottleneck,
        });
    }

    let community_rows = communities
        .communities
        .iter()
        .map(|c| CommunityRecord {
            community_id: c.id as i64,
            size: c.size as i64,
            conductance: c.conductance,
        })
        .collect();
    let violation_rows = layering
        .violations
        .iter()
        .map(|v| LayerViolationRecord {
            source_id: ids[v.source],
            target_id: ids[v.target],
            source_layer: v.source_layer as i64,
            target_layer: v.target_layer as i64,
            severity: v.severity,
        })
        .collect();

    let summary = AnalyticsSummary {
        nodes: n,
        edges: graph.edge_count(),
        tangle_ratio: cycles.tangle_ratio,
        cycle_ratio: cycles.cycle_ratio,
        cycles: cycles.sccs.len(),
        damping,
        pagerank_converged: rank.converged,
        communities: communities.communities.len(),
        modularity: communities.modularity,
        max_layer: layering.max_layer,
        layer_violations: layering.violations.len(),
        spectral_gap: spectral.spectral_gap,
        spectral_modularity: spectral.modularity,
        propagation_cost: cost.value,
        propagation_precision: cost.precision,
        betweenness_precision: between_plan.precision,
        closeness_precision: close_plan.precision,
        god_components: gods,
        bottlenecks,
        notices,
    };
    tracing::info!(
        { metrics::GRAPH_NODES } = n,
        { metrics::ANALYTICS_TIME } = started.elapsed().as_millis() as u64,
        tangle_ratio = summary.tangle_ratio,
        "analytics complete"
    );
    AnalyticsOutput {
        summary,
        metrics: metrics_rows,
        communities: community_rows,
        violations: violation_rows,
        sccs: cycles.sccs,
        file_flags,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::arena::chain_graph;

    #[test]
    fn test_tangle_ratio_three_quarters() {
        let g = chain_graph(&[1, 2, 3, 4], &[(1, 2), (2, 3), (3, 1)]);
        let out = analyze(&g, &AnalysisConfig::default());
        assert!((out.summary.tangle_ratio - 0.75).abs() < 1e-12);
        let d = out.metrics.iter().find(|m| m.symbol_id == 4).unwrap();
        assert_eq!(d.scc_id, None);
        assert!(out.file_flags[&1].in_cycle);
        assert!(!out.file_flags[&4].in_cycle);
        assert_eq!(out.summary.propagation_precision, Precision::Exact);
    }

    #[test]
    fn test_god_component_threshold() {
        let ids: Vec<i64> = (1..=23).collect();
        let edges: Vec<(i64, i64)> = (2..=23).map(|t| (1, t)).collect();
        let g = chain_graph(&ids, &edges);
        let out = analyze(&g, &AnalysisConfig::default());
        assert_eq!(out.summary.god_components, 1);
        assert!(out.metrics[0].is_god);
    }

    #[test]
    fn test_empty_graph() {
        let out = analyze(&SymbolGraph::new(), &AnalysisConfig::default());
        assert_eq!(out.summary.nodes, 0);
        assert!(out.metrics.is_empty());
    }

    #[test]
    fn test_pass_is_deterministic() {
        let g = chain_graph(&[1, 2, 3, 4, 5], &[(1, 2), (2, 3), (3, 1), (4, 5), (5, 1)]);
        let a = analyze(&g, &AnalysisConfig::default());
        let b = analyze(&g, &AnalysisConfig::default());
        assert_eq!(a.metrics, b.metrics);
        assert_eq!(a.summary, b.summary);
    }
}
