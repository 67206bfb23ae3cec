//! Per-file health and the composite health score.

pub mod composite;
pub mod file_health;

pub use composite::{composite_score, HealthFactors, HealthInputs, HealthScore};
pub use file_health::{file_health_scores, indentation_complexity, FileHealthInput};
