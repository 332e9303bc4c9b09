//! Pre-overwrite configuration backups.
//!
//! Each accepted push snapshots the configuration in force to a file named
//! after the local wall-clock time, e.g. `Mon-Jan-2-15-04-05-2006.gateway.conf`.
//! Files accumulate; pruning them is left to the operator's housekeeping.

use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use thiserror::Error;

use crate::config::loader::{render_config, write_durable, ConfigError};
use crate::config::GatewayConfig;

/// Literal suffix marking a file as a gateway configuration backup.
pub const BACKUP_SUFFIX: &str = "gateway.conf";

const BACKUP_TIME_FORMAT: &str = "%a-%b-%-d-%H-%M-%S-%Y";

#[derive(Debug, Error)]
pub enum BackupError {
    #[error("failed to render configuration: {0}")]
    Render(#[from] ConfigError),

    #[error("failed to write backup {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// A backup that has been written and synced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupArtifact {
    pub path: PathBuf,
    pub written_at: DateTime<Local>,
}

/// Writes configuration backups into one directory.
#[derive(Debug, Clone)]
pub struct BackupManager {
    dir: PathBuf,
}

impl BackupManager {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Back up `config` using the current local time. Single attempt.
    pub fn backup(&self, config: &GatewayConfig) -> Result<BackupArtifact, BackupError> {
        self.backup_at(config, Local::now())
    }

    /// Back up `config` under the name derived from `at`.
    ///
    /// A second backup within the same second replaces the first.
    pub fn backup_at(
        &self,
        config: &GatewayConfig,
        at: DateTime<Local>,
    ) -> Result<BackupArtifact, BackupError> {
        let rendered = render_config(config)?;
        let path = self.dir.join(file_name(&at));

        write_durable(&path, rendered.as_bytes()).map_err(|source| BackupError::Io {
            path: path.clone(),
            source,
        })?;

        tracing::info!(path = %path.display(), "Configuration backed up");
        Ok(BackupArtifact {
            path,
            written_at: at,
        })
    }
}

/// Backup file name for a point in time.
pub fn file_name(at: &DateTime<Local>) -> String {
    format!("{}.{}", at.format(BACKUP_TIME_FORMAT), BACKUP_SUFFIX)
}
