//! Configuration store adapter.
//!
//! The sync protocol never touches configuration files directly; it goes
//! through [`ConfigStore`]. [`FileConfigStore`] is the file-backed store used
//! by the node: candidate paths are tried in order, the first that exists is
//! the one in force, and pushes are written to the first candidate.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use arc_swap::ArcSwap;

use crate::config::loader::{self, ConfigError, Document};
use crate::config::schema::GatewayConfig;

/// Source of the configuration a node is running with.
pub trait ConfigStore: Send + Sync {
    /// Load the configuration fresh from disk, merged over defaults.
    fn load(&self) -> Result<GatewayConfig, ConfigError>;

    /// The configuration the process is currently serving with.
    fn current(&self) -> Arc<GatewayConfig>;

    /// Read the on-disk configuration without applying the schema.
    fn read_document(&self) -> Result<Document, ConfigError>;

    /// Atomically replace the primary configuration file with `rendered`,
    /// TOML produced by [`loader::render_config`].
    fn persist(&self, rendered: &str) -> Result<(), ConfigError>;

    /// File that [`ConfigStore::persist`] writes to.
    fn primary_path(&self) -> &Path;
}

/// File-backed configuration store.
pub struct FileConfigStore {
    paths: Vec<PathBuf>,
    live: ArcSwap<GatewayConfig>,
}

impl FileConfigStore {
    /// Load the configuration from the first existing candidate path.
    pub fn open(paths: Vec<PathBuf>) -> Result<Self, ConfigError> {
        if paths.is_empty() {
            return Err(ConfigError::NotFound(paths));
        }
        let config = loader::load_first(&paths)?;
        Ok(Self::with_config(paths, config))
    }

    /// Create a store around an already loaded configuration.
    pub fn with_config(paths: Vec<PathBuf>, config: GatewayConfig) -> Self {
        Self {
            paths,
            live: ArcSwap::from_pointee(config),
        }
    }

    /// Re-read the configuration from disk and make it the live one.
    ///
    /// On failure the previous configuration stays live.
    pub fn reload_from_disk(&self) -> Result<Arc<GatewayConfig>, ConfigError> {
        let config = Arc::new(self.load()?);
        self.live.store(config.clone());
        Ok(config)
    }

    /// Replace the live configuration.
    pub fn replace(&self, config: GatewayConfig) {
        self.live.store(Arc::new(config));
    }

    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }
}

impl ConfigStore for FileConfigStore {
    fn load(&self) -> Result<GatewayConfig, ConfigError> {
        loader::load_first(&self.paths)
    }

    fn current(&self) -> Arc<GatewayConfig> {
        self.live.load_full()
    }

    fn read_document(&self) -> Result<Document, ConfigError> {
        let path = loader::resolve_path(&self.paths)
            .ok_or_else(|| ConfigError::NotFound(self.paths.clone()))?;
        loader::read_document(path)
    }

    fn persist(&self, rendered: &str) -> Result<(), ConfigError> {
        loader::write_rendered(self.primary_path(), rendered)
    }

    fn primary_path(&self) -> &Path {
        // `open` refuses an empty list; `with_config` callers pass at least one path.
        self.paths.first().map(PathBuf::as_path).unwrap_or(Path::new("gateway.toml"))
    }
}
