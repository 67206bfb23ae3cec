//! The explicit context threaded through every run.

use std::path::{Path, PathBuf};

use strata_core::config::CliOverrides;
use strata_core::constants::DB_FILE_NAME;
use strata_core::errors::ConfigError;
use strata_core::StrataConfig;

use crate::extract::ExtractorRegistry;
use crate::resolve::{default_bridges, Bridge};

/// Repository root, resolved configuration, the extractor registry and
/// the resolution bridges. Built once and shared by reference.
pub struct IndexContext {
    pub root: PathBuf,
    pub config: StrataConfig,
    pub registry: ExtractorRegistry,
    pub bridges: Vec<Box<dyn Bridge>>,
}

impl IndexContext {
    pub fn new(root: impl Into<PathBuf>, config: StrataConfig) -> Self {
        Self {
            root: root.into(),
            config,
            registry: ExtractorRegistry::builtin(),
            bridges: default_bridges(),
        }
    }

    /// Load the layered configuration for `root` and build the context.
    pub fn load(root: impl Into<PathBuf>, overrides: Option<&CliOverrides>) -> Result<Self, ConfigError> {
        let root = root.into();
        let config = StrataConfig::load(&root, overrides)?;
        Ok(Self::new(root, config))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Index directory; a relative setting is taken from the root.
    pub fn index_dir(&self) -> PathBuf {
        let configured = Path::new(self.config.storage.effective_index_dir());
        if configured.is_absolute() {
            configured.to_path_buf()
        } else {
            self.root.join(configured)
        }
    }

    pub fn db_path(&self) -> PathBuf {
        self.index_dir().join(DB_FILE_NAME)
    }
}

impl std::fmt::Debug for IndexContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IndexContext")
            .field("root", &self.root)
            .field("registry", &self.registry)
            .field("bridges", &self.bridges.iter().map(|b| b.name()).collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}
