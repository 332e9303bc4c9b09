//! Shared fixtures for sync integration tests.
#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use serde_json::{json, Value};
use tempfile::TempDir;

use gateway_sync::bus::{BusError, Publisher};
use gateway_sync::cluster::NodeIdentity;
use gateway_sync::config::loader::write_config;
use gateway_sync::config::{ConfigStore, FileConfigStore, GatewayConfig};
use gateway_sync::lifecycle::reload::{ReloadError, Reloader};
use gateway_sync::sync::backup::BACKUP_SUFFIX;
use gateway_sync::sync::{BackupManager, SyncCoordinator};

pub const HOSTNAME: &str = "gw-east-1";
pub const NODE_ID: &str = "node-7f3a";
pub const PID: u32 = 31337;
pub const SECRET: &str = "gateway-secret";

/// Records every reload request instead of signalling.
#[derive(Default)]
pub struct RecordingReloader {
    pub pids: Mutex<Vec<u32>>,
}

impl RecordingReloader {
    pub fn calls(&self) -> Vec<u32> {
        self.pids.lock().unwrap().clone()
    }
}

impl Reloader for RecordingReloader {
    fn reload(&self, pid: u32) -> Result<(), ReloadError> {
        self.pids.lock().unwrap().push(pid);
        if pid == 0 {
            return Err(ReloadError::NoPid);
        }
        Ok(())
    }
}

/// Keeps published messages in memory.
#[derive(Default)]
pub struct RecordingPublisher {
    pub sent: Mutex<Vec<(String, String)>>,
}

impl Publisher for RecordingPublisher {
    fn publish(&self, topic: &str, payload: String) -> Result<(), BusError> {
        self.sent.lock().unwrap().push((topic.to_string(), payload));
        Ok(())
    }
}

/// A single node wired to fakes, with its files in a scratch directory.
pub struct TestNode {
    pub dir: TempDir,
    pub config_path: PathBuf,
    pub backup_dir: PathBuf,
    pub store: Arc<FileConfigStore>,
    pub reloader: Arc<RecordingReloader>,
    pub coordinator: Arc<SyncCoordinator>,
}

impl TestNode {
    pub fn start(config: GatewayConfig, publisher: Arc<dyn Publisher>) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let backup_dir = dir.path().join("backups");
        fs::create_dir(&backup_dir).unwrap();
        Self::start_in(dir, backup_dir, config, publisher, |store| {
            store as Arc<dyn ConfigStore>
        })
    }

    /// Like [`TestNode::start`] but lets the caller wrap the store.
    pub fn start_in(
        dir: TempDir,
        backup_dir: PathBuf,
        config: GatewayConfig,
        publisher: Arc<dyn Publisher>,
        wrap: impl FnOnce(Arc<FileConfigStore>) -> Arc<dyn ConfigStore>,
    ) -> Self {
        let config_path = dir.path().join("gateway.toml");
        write_config(&config_path, &config).unwrap();

        let store = Arc::new(FileConfigStore::open(vec![config_path.clone()]).unwrap());
        let reloader = Arc::new(RecordingReloader::default());
        let coordinator = Arc::new(SyncCoordinator::new(
            NodeIdentity::new(HOSTNAME, NODE_ID, PID),
            wrap(store.clone()),
            BackupManager::new(&backup_dir),
            reloader.clone(),
            publisher,
        ));

        Self {
            dir,
            config_path,
            backup_dir,
            store,
            reloader,
            coordinator,
        }
    }

    pub fn config_on_disk(&self) -> String {
        fs::read_to_string(&self.config_path).unwrap()
    }

    pub fn backups(&self) -> Vec<PathBuf> {
        list_backups(&self.backup_dir)
    }
}

pub fn list_backups(dir: &Path) -> Vec<PathBuf> {
    let Ok(entries) = fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut found: Vec<PathBuf> = entries
        .map(|e| e.unwrap().path())
        .filter(|p| {
            p.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.ends_with(BACKUP_SUFFIX))
        })
        .collect();
    found.sort();
    found
}

pub fn remote_enabled() -> GatewayConfig {
    let mut config = GatewayConfig::default();
    config.allow_remote_config = true;
    config.secret = SECRET.into();
    config.storage.password = "redis-pass".into();
    config
}

pub fn push_payload(hostname: &str, node_id: &str, configuration: Value) -> String {
    json!({
        "target_hostname": hostname,
        "target_node_id": node_id,
        "timestamp": 1_700_000_000,
        "configuration": configuration,
    })
    .to_string()
}

pub fn query_payload(hostname: &str, node_id: &str) -> String {
    json!({
        "requester_hostname": hostname,
        "requester_node_id": node_id,
        "timestamp": 1_700_000_000,
    })
    .to_string()
}
