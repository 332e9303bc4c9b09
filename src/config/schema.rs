//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for a gateway node.
//! All types derive Serde traits for deserialization from config files.
//!
//! Plain values are declared ahead of nested tables in every struct so the
//! TOML serializer never has to emit a value after a table.

use serde::{Deserialize, Serialize};

use crate::bus::DEFAULT_TOPIC;

/// Root configuration for a gateway node.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct GatewayConfig {
    /// Accept configuration pushed over the cluster bus.
    ///
    /// Off unless the operator opts in.
    pub allow_remote_config: bool,

    /// Shared secret for the gateway's management API.
    ///
    /// Also the bearer token of the admin API, so it never leaves the node.
    pub secret: String,

    /// Secret used when this node talks to a dashboard or control plane.
    pub node_secret: String,

    /// Listener configuration (bind address, TLS).
    pub listener: ListenerConfig,

    /// Cluster membership and sync settings.
    pub cluster: ClusterConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    pub admin: AdminConfig,

    /// Backing key/value store credentials.
    pub storage: StorageConfig,

    /// Settings for nodes that pull policy from an upstream control plane.
    pub slave_options: SlaveOptions,

    pub auth_override: AuthOverrideConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Maximum concurrent connections (backpressure).
    pub max_connections: usize,

    /// Optional TLS configuration.
    pub tls: Option<TlsConfig>,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            max_connections: 10_000,
            tls: None,
        }
    }
}

/// TLS configuration for the listener.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct TlsConfig {
    /// Path to certificate file (PEM).
    pub cert_path: String,

    /// Path to private key file (PEM).
    pub key_path: String,
}

/// Cluster settings for the configuration sync protocol.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ClusterConfig {
    /// Fixed node ID. A random one is generated at startup when unset.
    pub node_id: Option<String>,

    /// Bus topic carrying cluster notifications.
    pub topic: String,

    /// Directory receiving configuration backups.
    pub backup_dir: String,

    /// Reload the live configuration when the file changes on disk.
    pub watch_config: bool,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            node_id: None,
            topic: DEFAULT_TOPIC.to_string(),
            backup_dir: ".".to_string(),
            watch_config: false,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log filter directive (e.g. "info" or "gateway_sync=debug").
    pub log_level: String,

    /// Log output format: "pretty" or "json".
    pub log_format: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: "pretty".to_string(),
            metrics_enabled: true,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Admin API configuration.
///
/// Requests authenticate with `Authorization: Bearer <secret>`, using the
/// root [`GatewayConfig::secret`].
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct AdminConfig {
    /// Enable the admin API.
    pub enabled: bool,

    /// Admin API bind address.
    pub bind_address: String,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            bind_address: "127.0.0.1:8081".to_string(),
        }
    }
}

/// Key/value store connection settings.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct StorageConfig {
    /// Store type, e.g. "redis".
    pub kind: String,
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub database: u32,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            kind: "redis".to_string(),
            host: "localhost".to_string(),
            port: 6379,
            username: String::new(),
            password: String::new(),
            database: 0,
        }
    }
}

/// Upstream control plane connection used by worker gateways.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct SlaveOptions {
    pub use_rpc: bool,
    pub connection_string: String,
    pub rpc_key: String,
    pub api_key: String,
    pub group_id: String,
}

/// Overrides for the auth and session providers.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct AuthOverrideConfig {
    pub force_auth_provider: bool,
    pub auth_provider: String,
    pub force_session_provider: bool,
    pub session_provider: String,
}
