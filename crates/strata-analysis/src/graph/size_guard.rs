//! Exact-or-sampled planning for super-linear metrics.

use serde::{Deserialize, Serialize};
use strata_core::config::AnalysisConfig;
use strata_core::constants::SAMPLE_SEED;
use xxhash_rust::xxh3::xxh3_64_with_seed;

/// Precision tier reported next to every guarded value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Precision {
    Exact,
    Sampled,
}

impl Precision {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Exact => "exact",
            Self::Sampled => "sampled",
        }
    }
}

/// Emitted once per metric that fell back to sampling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SizeGuardNotice {
    pub metric: String,
    pub nodes: usize,
    pub sample: usize,
}

/// Source nodes to run a metric from.
#[derive(Debug, Clone, PartialEq)]
pub struct SamplePlan {
    pub precision: Precision,
    /// Dense indices, ascending.
    pub sources: Vec<usize>,
    pub nodes: usize,
}

impl SamplePlan {
    /// Factor that lifts a sum over `sources` to a sum over all nodes.
    pub fn scale(&self) -> f64 {
        if self.sources.is_empty() {
            0.0
        } else {
            self.nodes as f64 / self.sources.len() as f64
        }
    }
}

#[derive(Debug, Clone)]
pub struct SizeGuard {
    threshold: usize,
    config: AnalysisConfig,
}

impl SizeGuard {
    pub fn new(config: &AnalysisConfig) -> Self {
        Self {
            threshold: config.effective_size_guard(),
            config: config.clone(),
        }
    }

    pub fn threshold(&self) -> usize {
        self.threshold
    }

    /// Plan `metric` over nodes keyed by `ids` (dense order). Graphs above
    /// the threshold get seeded pivots and a notice.
    pub fn plan(&self, metric: &str, ids: &[i64]) -> (SamplePlan, Option<SizeGuardNotice>) {
        let n = ids.len();
        if n <= self.threshold {
            let plan = SamplePlan {
                precision: Precision::Exact,
                sources: (0..n).collect(),
                nodes: n,
            };
            return (plan, None);
        }
        let k = self.config.effective_sample_size(n);
        let sources = pivots(ids, k);
        tracing::debug!(metric, nodes = n, sample = k, "size guard: sampling");
        let notice = SizeGuardNotice {
            metric: metric.to_string(),
            nodes: n,
            sample: sources.len(),
        };
        let plan = SamplePlan {
            precision: Precision::Sampled,
            sources,
            nodes: n,
        };
        (plan, Some(notice))
    }
}

/// The `k` nodes whose ids hash lowest under the fixed seed, ascending.
pub fn pivots(ids: &[i64], k: usize) -> Vec<usize> {
    let mut keyed: Vec<(u64, usize)> = ids
        .iter()
        .enumerate()
        .map(|(v, id)| (xxh3_64_with_seed(&id.to_le_bytes(), SAMPLE_SEED), v))
        .collect();
    keyed.sort_unstable();
    let mut chosen: Vec<usize> = keyed.into_iter().take(k).map(|(_, v)| v).collect();
    chosen.sort_unstable();
    chosen
}
