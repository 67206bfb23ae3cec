//! Composite health weights.
//!
//! The composite score is a weighted geometric mean, so each weight is
//! an exponent. Weights are bounded to `[MIN_WEIGHT, MAX_WEIGHT]` and must
//! sum to 1 so that scores stay comparable across repositories and runs.

use serde::{Deserialize, Serialize};

pub const MIN_WEIGHT: f64 = 0.05;
pub const MAX_WEIGHT: f64 = 0.50;

pub const DEFAULT_TANGLE_WEIGHT: f64 = 0.25;
pub const DEFAULT_GOD_WEIGHT: f64 = 0.20;
pub const DEFAULT_BOTTLENECK_WEIGHT: f64 = 0.15;
pub const DEFAULT_LAYER_WEIGHT: f64 = 0.20;
pub const DEFAULT_FILE_HEALTH_WEIGHT: f64 = 0.20;

/// Resolved weights, guaranteed to satisfy the bounds after validation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HealthWeights {
    pub tangle: f64,
    pub god: f64,
    pub bottleneck: f64,
    pub layer: f64,
    pub file_health: f64,
}

impl HealthWeights {
    pub fn as_array(&self) -> [(&'static str, f64); 5] {
        [
            ("tangle", self.tangle),
            ("god", self.god),
            ("bottleneck", self.bottleneck),
            ("layer", self.layer),
            ("file_health", self.file_health),
        ]
    }
}

impl Default for HealthWeights {
    fn default() -> Self {
        Self {
            tangle: DEFAULT_TANGLE_WEIGHT,
            god: DEFAULT_GOD_WEIGHT,
            bottleneck: DEFAULT_BOTTLENECK_WEIGHT,
            layer: DEFAULT_LAYER_WEIGHT,
            file_health: DEFAULT_FILE_HEALTH_WEIGHT,
        }
    }
}

/// Configuration for health scoring.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct HealthConfig {
    pub tangle_weight: Option<f64>,
    pub god_weight: Option<f64>,
    pub bottleneck_weight: Option<f64>,
    pub layer_weight: Option<f64>,
    pub file_health_weight: Option<f64>,
}

impl HealthConfig {
    pub fn effective_weights(&self) -> HealthWeights {
        HealthWeights {
            tangle: self.tangle_weight.unwrap_or(DEFAULT_TANGLE_WEIGHT),
            god: self.god_weight.unwrap_or(DEFAULT_GOD_WEIGHT),
            bottleneck: self.bottleneck_weight.unwrap_or(DEFAULT_BOTTLENECK_WEIGHT),
            layer: self.layer_weight.unwrap_or(DEFAULT_LAYER_WEIGHT),
            file_health: self.file_health_weight.unwrap_or(DEFAULT_FILE_HEALTH_WEIGHT),
        }
    }
}
