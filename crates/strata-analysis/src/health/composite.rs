//! Composite health: a weighted geometric mean of five structural factors.

use serde::{Deserialize, Serialize};
use strata_core::config::HealthWeights;

/// Floor for a factor before its logarithm is taken.
const FACTOR_FLOOR: f64 = 1e-9;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HealthInputs {
    pub nodes: usize,
    pub tangle_ratio: f64,
    pub god_components: usize,
    pub bottlenecks: usize,
    pub layer_violations: usize,
    /// Mean per-file health on the 1..10 scale, if any file was scored.
    pub mean_file_health: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HealthFactors {
    pub tangle: f64,
    pub god: f64,
    pub bottleneck: f64,
    pub layer: f64,
    pub file_health: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HealthScore {
    /// 0..=100.
    pub score: f64,
    pub factors: HealthFactors,
}

fn hf(value: f64, scale: f64) -> f64 {
    (-value / scale).exp()
}

pub fn composite_score(inputs: &HealthInputs, weights: &HealthWeights) -> HealthScore {
    if inputs.nodes == 0 {
        return HealthScore {
            score: 100.0,
            factors: HealthFactors {
                tangle: 1.0,
                god: 1.0,
                bottleneck: 1.0,
                layer: 1.0,
                file_health: 1.0,
            },
        };
    }
    let factors = HealthFactors {
        tangle: hf(100.0 * inputs.tangle_ratio, 10.0),
        god: hf(3.0 * inputs.god_components as f64, 5.0),
        bottleneck: hf(2.0 * inputs.bottlenecks as f64, 4.0),
        layer: hf(inputs.layer_violations as f64, 5.0),
        file_health: inputs.mean_file_health.map_or(1.0, |m| (m / 10.0).clamp(0.0, 1.0)),
    };
    let log_sum = [
        (factors.tangle, weights.tangle),
        (factors.god, weights.god),
        (factors.bottleneck, weights.bottleneck),
        (factors.layer, weights.layer),
        (factors.file_health, weights.file_health),
    ]
    .iter()
    .map(|&(f, w)| w * f.max(FACTOR_FLOOR).ln())
    .sum::<f64>();
    HealthScore {
        score: (100.0 * log_sum.exp()).clamp(0.0, 100.0),
        factors,
    }
}
