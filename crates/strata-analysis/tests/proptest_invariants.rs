//! Property-based tests for numeric invariants:
//!   - normalized entropy stays in [0, 1]
//!   - percentiles stay within the sample range
//!   - file health stays in [1, 10] and composite health in [0, 100]
//!   - composite health never rises as structural problems grow

use proptest::prelude::*;

use strata_analysis::health::{composite_score, file_health_scores, FileHealthInput, HealthInputs};
use strata_analysis::stats::{normalized_entropy, percentile};
use strata_core::config::HealthWeights;

fn file_input() -> impl Strategy<Value = FileHealthInput> {
    (
        0.0f64..40.0,
        any::<bool>(),
        any::<bool>(),
        0.0f64..=1.0,
        0.0f64..=1.0,
        0.0f64..=1.0,
        0i64..500,
        0i64..20_000,
        0i64..100,
    )
        .prop_map(
            |(complexity, in_cycle, has_god, dead, entropy, share, commits, churn, max_cc)| {
                FileHealthInput {
                    max_symbol_complexity: max_cc,
                    complexity,
                    in_cycle,
                    has_god,
                    dead_export_ratio: dead,
                    cochange_entropy: entropy,
                    owner_share: share,
                    commit_count: commits,
                    churn,
                }
            },
        )
}

fn health_inputs() -> impl Strategy<Value = HealthInputs> {
    (
        1usize..10_000,
        0.0f64..=1.0,
        0usize..1_000,
        0usize..1_000,
        0usize..1_000,
        proptest::option::of(1.0f64..=10.0),
    )
        .prop_map(|(nodes, tangle, gods, bottlenecks, violations, file)| HealthInputs {
            nodes,
            tangle_ratio: tangle,
            god_components: gods,
            bottlenecks,
            layer_violations: violations,
            mean_file_health: file,
        })
}

proptest! {
    #[test]
    fn prop_entropy_is_normalized(counts in proptest::collection::vec(0.0f64..1_000.0, 0..64)) {
        let h = normalized_entropy(&counts);
        prop_assert!((0.0..=1.0).contains(&h), "entropy {h} out of range");
    }

    #[test]
    fn prop_uniform_counts_have_full_entropy(n in 2usize..50, c in 1.0f64..100.0) {
        let h = normalized_entropy(&vec![c; n]);
        prop_assert!((h - 1.0).abs() < 1e-9, "uniform entropy was {h}");
    }

    #[test]
    fn prop_percentile_within_range(
        values in proptest::collection::vec(-1e6f64..1e6, 1..200),
        p in 0usize..=100,
    ) {
        let v = percentile(&values, p);
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        prop_assert!(v >= min - 1e-9 && v <= max + 1e-9, "{v} outside [{min}, {max}]");
    }

    #[test]
    fn prop_file_health_bounded(files in proptest::collection::vec(file_input(), 1..40)) {
        let scores = file_health_scores(&files);
        prop_assert_eq!(scores.len(), files.len());
        for s in scores {
            prop_assert!((1.0..=10.0).contains(&s), "file health {s} out of range");
        }
    }

    #[test]
    fn prop_composite_bounded(inputs in health_inputs()) {
        let score = composite_score(&inputs, &HealthWeights::default()).score;
        prop_assert!((0.0..=100.0).contains(&score), "composite {score} out of range");
    }

    #[test]
    fn prop_more_gods_never_raise_health(inputs in health_inputs(), extra in 1usize..100) {
        let weights = HealthWeights::default();
        let base = composite_score(&inputs, &weights).score;
        let worse = HealthInputs {
            god_components: inputs.god_components + extra,
            ..inputs.clone()
        };
        prop_assert!(composite_score(&worse, &weights).score <= base + 1e-9);
    }
}
