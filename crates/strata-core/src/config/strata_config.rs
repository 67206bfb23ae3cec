//! Top-level Strata configuration with layered resolution.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::health_config::{MAX_WEIGHT, MIN_WEIGHT};
use super::{
    AnalysisConfig, FingerprintMode, HealthConfig, HistoryConfig, ScanConfig, StorageConfig,
};
use crate::constants::PROJECT_CONFIG_FILE;
use crate::errors::ConfigError;

/// Top-level configuration aggregating all sub-configs.
///
/// Resolution order (highest priority first):
/// 1. CLI flags (applied via `apply_cli_overrides`)
/// 2. Environment variables (`STRATA_*`)
/// 3. Project config (`strata.toml` in project root)
/// 4. User config (`~/.strata/config.toml`)
/// 5. Compiled defaults
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct StrataConfig {
    pub scan: ScanConfig,
    pub analysis: AnalysisConfig,
    pub history: HistoryConfig,
    pub health: HealthConfig,
    pub storage: StorageConfig,
}

/// CLI override arguments that can be applied to a config.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub scan_max_file_size: Option<u64>,
    pub scan_threads: Option<usize>,
    pub fingerprint: Option<FingerprintMode>,
    pub no_history: bool,
    pub index_dir: Option<String>,
}

impl StrataConfig {
    /// Load configuration with layered resolution.
    pub fn load(root: &Path, cli_overrides: Option<&CliOverrides>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(user_config_path) = Self::user_config_path() {
            if user_config_path.exists() {
                match Self::merge_toml_file(&mut config, &user_config_path) {
                    Ok(()) => {}
                    Err(e @ ConfigError::ParseError { .. }) => return Err(e),
                    Err(e) => {
                        tracing::warn!(error = %e, "ignoring unreadable user config");
                    }
                }
            }
        }

        let project_config_path = root.join(PROJECT_CONFIG_FILE);
        if project_config_path.exists() {
            Self::merge_toml_file(&mut config, &project_config_path)?;
        }

        Self::apply_env_overrides(&mut config);

        if let Some(cli) = cli_overrides {
            Self::apply_cli_overrides(&mut config, cli);
        }

        Self::validate(&config)?;

        Ok(config)
    }

    /// Load configuration from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        toml::from_str(toml_str).map_err(|e| ConfigError::ParseError {
            path: "<string>".to_string(),
            message: e.to_string(),
        })
    }

    /// Validate the configuration values.
    pub fn validate(config: &StrataConfig) -> Result<(), ConfigError> {
        if let Some(max_file_size) = config.scan.max_file_size {
            if max_file_size == 0 {
                return Err(ConfigError::ValidationFailed {
                    field: "scan.max_file_size".to_string(),
                    message: "must be greater than 0".to_string(),
                });
            }
        }
        if let Some(guard) = config.analysis.size_guard {
            if guard == 0 {
                return Err(ConfigError::ValidationFailed {
                    field: "analysis.size_guard".to_string(),
                    message: "must be greater than 0".to_string(),
                });
            }
        }
        if let Some(sample) = config.analysis.sample_size {
            if sample == 0 {
                return Err(ConfigError::ValidationFailed {
                    field: "analysis.sample_size".to_string(),
                    message: "must be greater than 0".to_string(),
                });
            }
        }
        if let Some(damping) = config.analysis.pagerank_damping {
            if !(0.0..1.0).contains(&damping) || damping == 0.0 {
                return Err(ConfigError::ValidationFailed {
                    field: "analysis.pagerank_damping".to_string(),
                    message: "must be in (0.0, 1.0)".to_string(),
                });
            }
        }
        if let Some(decay) = config.analysis.propagation_decay {
            if !(0.0..=1.0).contains(&decay) {
                return Err(ConfigError::ValidationFailed {
                    field: "analysis.propagation_decay".to_string(),
                    message: "must be between 0.0 and 1.0".to_string(),
                });
            }
        }
        if let Some(max_commits) = config.history.max_commits {
            if max_commits == 0 {
                return Err(ConfigError::ValidationFailed {
                    field: "history.max_commits".to_string(),
                    message: "must be greater than 0".to_string(),
                });
            }
        }
        if let Some(pool) = config.storage.read_pool_size {
            if pool == 0 || pool > 8 {
                return Err(ConfigError::ValidationFailed {
                    field: "storage.read_pool_size".to_string(),
                    message: "must be between 1 and 8".to_string(),
                });
            }
        }

        let weights = config.health.effective_weights();
        for (name, w) in weights.as_array() {
            if !(MIN_WEIGHT..=MAX_WEIGHT).contains(&w) {
                return Err(ConfigError::ValidationFailed {
                    field: format!("health.{name}_weight"),
                    message: format!("must be between {MIN_WEIGHT} and {MAX_WEIGHT}"),
                });
            }
        }
        let sum: f64 = weights.as_array().iter().map(|(_, w)| w).sum();
        if (sum - 1.0).abs() > 1e-6 {
            return Err(ConfigError::ValidationFailed {
                field: "health".to_string(),
                message: format!("weights must sum to 1.0, got {sum:.6}"),
            });
        }
        Ok(())
    }

    /// Returns the user config path: `~/.strata/config.toml`.
    fn user_config_path() -> Option<PathBuf> {
        dirs_path().map(|d| d.join("config.toml"))
    }

    /// Merge a TOML file into the existing config.
    /// Unknown keys are silently ignored (forward-compatible).
    fn merge_toml_file(config: &mut StrataConfig, path: &Path) -> Result<(), ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
            path: path.display().to_string(),
        })?;

        let file_config: StrataConfig =
            toml::from_str(&content).map_err(|e| ConfigError::ParseError {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;

        Self::merge(config, &file_config);
        Ok(())
    }

    /// Merge `other` into `base`, where `other` values override `base` values
    /// only when `other` has a `Some` value.
    pub fn merge(base: &mut StrataConfig, other: &StrataConfig) {
        // Scan
        if other.scan.max_file_size.is_some() {
            base.scan.max_file_size = other.scan.max_file_size;
        }
        if other.scan.threads.is_some() {
            base.scan.threads = other.scan.threads;
        }
        if !other.scan.extra_ignore.is_empty() {
            base.scan.extra_ignore = other.scan.extra_ignore.clone();
        }
        if other.scan.follow_symlinks.is_some() {
            base.scan.follow_symlinks = other.scan.follow_symlinks;
        }
        if other.scan.fingerprint.is_some() {
            base.scan.fingerprint = other.scan.fingerprint;
        }
        if other.scan.ignore_file.is_some() {
            base.scan.ignore_file = other.scan.ignore_file.clone();
        }
        if other.scan.respect_gitignore.is_some() {
            base.scan.respect_gitignore = other.scan.respect_gitignore;
        }

        // Analysis
        if other.analysis.size_guard.is_some() {
            base.analysis.size_guard = other.analysis.size_guard;
        }
        if other.analysis.sample_size.is_some() {
            base.analysis.sample_size = other.analysis.sample_size;
        }
        if other.analysis.pagerank_damping.is_some() {
            base.analysis.pagerank_damping = other.analysis.pagerank_damping;
        }
        if other.analysis.god_degree_threshold.is_some() {
            base.analysis.god_degree_threshold = other.analysis.god_degree_threshold;
        }
        if other.analysis.louvain_max_passes.is_some() {
            base.analysis.louvain_max_passes = other.analysis.louvain_max_passes;
        }
        if other.analysis.spectral_max_iter.is_some() {
            base.analysis.spectral_max_iter = other.analysis.spectral_max_iter;
        }
        if other.analysis.propagation_decay.is_some() {
            base.analysis.propagation_decay = other.analysis.propagation_decay;
        }
        if other.analysis.propagation_max_depth.is_some() {
            base.analysis.propagation_max_depth = other.analysis.propagation_max_depth;
        }

        // History
        if other.history.enabled.is_some() {
            base.history.enabled = other.history.enabled;
        }
        if other.history.max_commits.is_some() {
            base.history.max_commits = other.history.max_commits;
        }
        if other.history.max_files_per_commit.is_some() {
            base.history.max_files_per_commit = other.history.max_files_per_commit;
        }

        // Health
        if other.health.tangle_weight.is_some() {
            base.health.tangle_weight = other.health.tangle_weight;
        }
        if other.health.god_weight.is_some() {
            base.health.god_weight = other.health.god_weight;
        }
        if other.health.bottleneck_weight.is_some() {
            base.health.bottleneck_weight = other.health.bottleneck_weight;
        }
        if other.health.layer_weight.is_some() {
            base.health.layer_weight = other.health.layer_weight;
        }
        if other.health.file_health_weight.is_some() {
            base.health.file_health_weight = other.health.file_health_weight;
        }

        // Storage
        if other.storage.index_dir.is_some() {
            base.storage.index_dir = other.storage.index_dir.clone();
        }
        if other.storage.read_pool_size.is_some() {
            base.storage.read_pool_size = other.storage.read_pool_size;
        }
    }

    /// Apply environment variable overrides.
    /// Pattern: `STRATA_SCAN_MAX_FILE_SIZE`, `STRATA_HISTORY_ENABLED`, etc.
    fn apply_env_overrides(config: &mut StrataConfig) {
        if let Ok(val) = std::env::var("STRATA_SCAN_MAX_FILE_SIZE") {
            if let Ok(v) = val.parse::<u64>() {
                config.scan.max_file_size = Some(v);
            }
        }
        if let Ok(val) = std::env::var("STRATA_SCAN_THREADS") {
            if let Ok(v) = val.parse::<usize>() {
                config.scan.threads = Some(v);
            }
        }
        if let Ok(val) = std::env::var("STRATA_SCAN_FINGERPRINT") {
            if let Some(mode) = FingerprintMode::parse(&val) {
                config.scan.fingerprint = Some(mode);
            }
        }
        if let Ok(val) = std::env::var("STRATA_ANALYSIS_SIZE_GUARD") {
            if let Ok(v) = val.parse::<usize>() {
                config.analysis.size_guard = Some(v);
            }
        }
        if let Ok(val) = std::env::var("STRATA_ANALYSIS_GOD_DEGREE") {
            if let Ok(v) = val.parse::<usize>() {
                config.analysis.god_degree_threshold = Some(v);
            }
        }
        if let Ok(val) = std::env::var("STRATA_HISTORY_ENABLED") {
            if let Ok(v) = val.parse::<bool>() {
                config.history.enabled = Some(v);
            }
        }
        if let Ok(val) = std::env::var("STRATA_HISTORY_MAX_COMMITS") {
            if let Ok(v) = val.parse::<usize>() {
                config.history.max_commits = Some(v);
            }
        }
        if let Ok(val) = std::env::var("STRATA_STORAGE_INDEX_DIR") {
            config.storage.index_dir = Some(val);
        }
    }

    /// Apply CLI overrides (highest priority).
    fn apply_cli_overrides(config: &mut StrataConfig, cli: &CliOverrides) {
        if let Some(v) = cli.scan_max_file_size {
            config.scan.max_file_size = Some(v);
        }
        if let Some(v) = cli.scan_threads {
            config.scan.threads = Some(v);
        }
        if let Some(v) = cli.fingerprint {
            config.scan.fingerprint = Some(v);
        }
        if cli.no_history {
            config.history.enabled = Some(false);
        }
        if let Some(ref v) = cli.index_dir {
            config.storage.index_dir = Some(v.clone());
        }
    }

    /// Serialize the config back to TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ParseError {
            path: "<serialization>".to_string(),
            message: e.to_string(),
        })
    }
}

/// Returns the user-level strata config directory: `~/.strata/`.
fn dirs_path() -> Option<PathBuf> {
    home_dir().map(|h| h.join(".strata"))
}

/// Cross-platform home directory resolution.
fn home_dir() -> Option<PathBuf> {
    std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .map(PathBuf::from)
}
