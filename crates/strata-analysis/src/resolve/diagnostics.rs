//! Resolution counters reported per run.

use serde::{Deserialize, Serialize};

use super::resolver::Tier;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolutionDiagnostics {
    pub total: usize,
    pub resolved: usize,
    pub ambiguous: usize,
    pub unresolved: usize,
    /// Resolved onto the referencing symbol itself; no edge written.
    pub self_references: usize,
    /// Resolved onto an (source, target, kind) already produced.
    pub duplicates: usize,
    pub same_file: usize,
    pub same_directory: usize,
    pub project_unique: usize,
    pub bridge: usize,
}

impl ResolutionDiagnostics {
    pub fn record_tier(&mut self, tier: Tier) {
        match tier {
            Tier::SameFile => self.same_file += 1,
            Tier::SameDirectory => self.same_directory += 1,
            Tier::ProjectUnique => self.project_unique += 1,
            Tier::Bridge => self.bridge += 1,
        }
    }

    /// Fraction of references that found a target.
    pub fn resolution_rate(&self) -> f64 {
        if self.total == 0 {
            1.0
        } else {
            self.resolved as f64 / self.total as f64
        }
    }
}
