//! Configuration loading, merging and writing.
//!
//! Files are TOML. Loading merges the file over the built-in defaults, so a
//! file only needs to name the fields it changes. Remote pushes are merged the
//! same way: the incoming document is laid over the configuration currently in
//! force and every field it leaves out keeps its present value.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde_json::Value;
use thiserror::Error;

use crate::config::schema::GatewayConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Loosely typed configuration document.
pub type Document = serde_json::Map<String, Value>;

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Parse error in {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Document error: {0}")]
    Document(#[from] serde_json::Error),

    #[error("Document must be a table, got {0}")]
    NotATable(&'static str),

    #[error("No configuration file found in {0:?}")]
    NotFound(Vec<PathBuf>),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<GatewayConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let config: GatewayConfig = toml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// First candidate path that exists on disk.
pub fn resolve_path(paths: &[PathBuf]) -> Option<&Path> {
    paths.iter().map(PathBuf::as_path).find(|p| p.is_file())
}

/// Load from the first existing candidate, falling back to validated defaults.
pub fn load_first(paths: &[PathBuf]) -> Result<GatewayConfig, ConfigError> {
    match resolve_path(paths) {
        Some(path) => load_config(path),
        None => {
            tracing::debug!(?paths, "No configuration file found, using defaults");
            let config = GatewayConfig::default();
            validate_config(&config).map_err(ConfigError::Validation)?;
            Ok(config)
        }
    }
}

/// Read a configuration file without applying the schema.
pub fn read_document(path: &Path) -> Result<Document, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Lay `overlay` over `base`.
///
/// Tables merge key by key, every other value replaces what was there. A
/// `null` removes the key so the field falls back to its default.
pub fn merge_documents(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Object(base), Value::Object(overlay)) => {
            for (key, value) in overlay {
                if value.is_null() {
                    base.remove(&key);
                    continue;
                }
                match base.get_mut(&key) {
                    Some(existing) => merge_documents(existing, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (base, overlay) => *base = overlay,
    }
}

/// Merge a document onto `base` and return the validated result.
pub fn apply_document(base: &GatewayConfig, overlay: Value) -> Result<GatewayConfig, ConfigError> {
    if !overlay.is_object() {
        return Err(ConfigError::NotATable(value_kind(&overlay)));
    }

    let mut merged = serde_json::to_value(base)?;
    merge_documents(&mut merged, overlay);
    let config: GatewayConfig = serde_json::from_value(merged)?;

    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "table",
    }
}

/// Render a configuration as indented TOML.
pub fn render_config(config: &GatewayConfig) -> Result<String, ConfigError> {
    Ok(toml::to_string_pretty(config)?)
}

/// Write a configuration to `path`, replacing any existing file.
pub fn write_config(path: &Path, config: &GatewayConfig) -> Result<(), ConfigError> {
    let rendered = render_config(config)?;
    write_rendered(path, &rendered)
}

/// Write TOML produced by [`render_config`] to `path`, replacing any existing file.
pub fn write_rendered(path: &Path, rendered: &str) -> Result<(), ConfigError> {
    write_durable(path, rendered.as_bytes()).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Atomically replace `path` with `contents`, mode 0644.
///
/// The bytes go to a hidden sibling first, are synced, then renamed over
/// `path`. Readers see either the old file or the new one, never a partial.
pub(crate) fn write_durable(path: &Path, contents: &[u8]) -> io::Result<()> {
    let tmp = temp_sibling(path)?;

    let written = (|| {
        let mut options = OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o644);
        }

        let mut file = options.open(&tmp)?;
        file.write_all(contents)?;
        file.sync_all()?;
        fs::rename(&tmp, path)
    })();

    if written.is_err() {
        let _ = fs::remove_file(&tmp);
    }
    written
}

fn temp_sibling(path: &Path) -> io::Result<PathBuf> {
    let name = path.file_name().ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("{} has no file name", path.display()),
        )
    })?;
    let mut tmp_name = std::ffi::OsString::from(".");
    tmp_name.push(name);
    tmp_name.push(format!(".tmp.{}", std::process::id()));
    Ok(path.with_file_name(tmp_name))
}
