//! Graph analytics configuration.

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_GOD_DEGREE, DEFAULT_SIZE_GUARD, MIN_SAMPLE_SIZE};

/// Configuration for the analytics engine.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Node count above which super-linear metrics are sampled. Default: 500.
    pub size_guard: Option<usize>,
    /// Fixed sample size for sampled metrics. Default: max(64, ceil(5 * sqrt(n))).
    pub sample_size: Option<usize>,
    /// PageRank damping. Default: adaptive on cycle ratio.
    pub pagerank_damping: Option<f64>,
    /// Total degree above which a symbol is a god component. Default: 20.
    pub god_degree_threshold: Option<usize>,
    /// Louvain passes over all nodes per level. Default: 20.
    pub louvain_max_passes: Option<usize>,
    /// Power iterations for the Fiedler vector. Default: 500.
    pub spectral_max_iter: Option<usize>,
    /// Decay for context propagation. Default: 0.5.
    pub propagation_decay: Option<f64>,
    /// Depth cap for context propagation. Default: 3.
    pub propagation_max_depth: Option<usize>,
}

impl AnalysisConfig {
    pub fn effective_size_guard(&self) -> usize {
        self.size_guard.unwrap_or(DEFAULT_SIZE_GUARD)
    }

    /// Sample size for a graph of `n` nodes, never larger than `n`.
    pub fn effective_sample_size(&self, n: usize) -> usize {
        let k = self
            .sample_size
            .unwrap_or_else(|| MIN_SAMPLE_SIZE.max((5.0 * (n as f64).sqrt()).ceil() as usize));
        k.min(n)
    }

    pub fn effective_god_degree_threshold(&self) -> usize {
        self.god_degree_threshold.unwrap_or(DEFAULT_GOD_DEGREE)
    }

    pub fn effective_louvain_max_passes(&self) -> usize {
        self.louvain_max_passes.unwrap_or(20)
    }

    pub fn effective_spectral_max_iter(&self) -> usize {
        self.spectral_max_iter.unwrap_or(500)
    }

    pub fn effective_propagation_decay(&self) -> f64 {
        self.propagation_decay.unwrap_or(0.5)
    }

    pub fn effective_propagation_max_depth(&self) -> usize {
        self.propagation_max_depth.unwrap_or(3)
    }
}
