//! Configuration system for Strata.
//! TOML-based, layered resolution: CLI > env > project > user > defaults.

pub mod analysis_config;
pub mod health_config;
pub mod history_config;
pub mod scan_config;
pub mod storage_config;
pub mod strata_config;

pub use analysis_config::AnalysisConfig;
pub use health_config::{HealthConfig, HealthWeights};
pub use history_config::HistoryConfig;
pub use scan_config::{FingerprintMode, ScanConfig};
pub use storage_config::StorageConfig;
pub use strata_config::{CliOverrides, StrataConfig};
