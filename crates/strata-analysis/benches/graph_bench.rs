//! Graph analytics benchmarks: exact and sampled passes.
//!
//! Run with: cargo bench -p strata-analysis --bench graph_bench

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use strata_analysis::graph::{analyze, EdgeData, SymbolGraph, SymbolNode};
use strata_core::config::AnalysisConfig;

/// Layered graph: each symbol calls three symbols of the next file, with a
/// back edge every 50 symbols so cycles exist.
fn layered_graph(n: usize) -> SymbolGraph {
    let mut graph = SymbolGraph::new();
    for i in 0..n as i64 {
        graph.add_symbol(SymbolNode {
            id: i,
            file_id: i / 10,
            name: format!("fn_{i}"),
            kind: "function".to_string(),
        });
    }
    let edge = || EdgeData {
        kind: "call".to_string(),
        confidence: 0.9,
    };
    for i in 0..n as i64 {
        for k in 1..=3 {
            graph.add_edge(i, (i + 10 * k) % n as i64, edge());
        }
        if i % 50 == 49 {
            graph.add_edge(i, i - 49, edge());
        }
    }
    graph
}

fn analytics_exact(c: &mut Criterion) {
    let mut group = c.benchmark_group("analytics_exact");
    group.sample_size(10);
    let config = AnalysisConfig::default();
    for size in [100, 250, 500] {
        let graph = layered_graph(size);
        group.bench_with_input(BenchmarkId::new("analyze", size), &graph, |b, g| {
            b.iter(|| analyze(g, &config));
        });
    }
    group.finish();
}

fn analytics_sampled(c: &mut Criterion) {
    let mut group = c.benchmark_group("analytics_sampled");
    group.sample_size(10);
    let config = AnalysisConfig::default();
    for size in [1_000, 5_000] {
        let graph = layered_graph(size);
        group.bench_with_input(BenchmarkId::new("analyze", size), &graph, |b, g| {
            b.iter(|| analyze(g, &config));
        });
    }
    group.finish();
}

criterion_group!(benches, analytics_exact, analytics_sampled);
criterion_main!(benches);
