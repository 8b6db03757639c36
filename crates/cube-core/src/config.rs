//! cube.toml configuration parser.
//!
//! Every section is optional; a missing file section falls back to the
//! defaults a single-host development cluster uses.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CubeConfig {
    pub manager: ManagerConfig,
    pub store: StoreConfig,
    pub scheduler: SchedulerConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ManagerConfig {
    /// host:port of the manager API.
    pub address: String,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            address: "localhost:5555".to_string(),
        }
    }
}

/// Which store backend the manager persists tasks and events in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreBackend {
    #[default]
    Memory,
    Durable,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    /// Database file, used by the durable backend only.
    pub path: PathBuf,
    pub task_bucket: String,
    pub event_bucket: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::Memory,
            path: PathBuf::from("cube.redb"),
            task_bucket: "tasks".to_string(),
            event_bucket: "task_events".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchedulerPolicy {
    #[default]
    RoundRobin,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    pub policy: SchedulerPolicy,
}

impl CubeConfig {
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> anyhow::Result<Self> {
        let config: CubeConfig = toml::from_str(content)?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> anyhow::Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_uses_defaults() {
        let config = CubeConfig::from_toml_str("").unwrap();
        assert_eq!(config, CubeConfig::default());
        assert_eq!(config.manager.address, "localhost:5555");
        assert_eq!(config.store.backend, StoreBackend::Memory);
        assert_eq!(config.scheduler.policy, SchedulerPolicy::RoundRobin);
    }

    #[test]
    fn parses_durable_store_section() {
        let toml_str = r#"
[manager]
address = "10.0.0.5:5555"

[store]
backend = "durable"
path = "/var/lib/cube/state.redb"
task_bucket = "task"
"#;
        let config = CubeConfig::from_toml_str(toml_str).unwrap();
        assert_eq!(config.manager.address, "10.0.0.5:5555");
        assert_eq!(config.store.backend, StoreBackend::Durable);
        assert_eq!(config.store.path, PathBuf::from("/var/lib/cube/state.redb"));
        assert_eq!(config.store.task_bucket, "task");
        // Unset keys keep their defaults.
        assert_eq!(config.store.event_bucket, "task_events");
    }

    #[test]
    fn rejects_unknown_backend() {
        let toml_str = r#"
[store]
backend = "etcd"
"#;
        assert!(CubeConfig::from_toml_str(toml_str).is_err());
    }

    #[test]
    fn from_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cube.toml");
        let mut config = CubeConfig::default();
        config.store.backend = StoreBackend::Durable;
        std::fs::write(&path, config.to_toml_string().unwrap()).unwrap();

        assert_eq!(CubeConfig::from_file(&path).unwrap(), config);
    }

    #[test]
    fn from_file_missing_is_error() {
        assert!(CubeConfig::from_file(Path::new("/nonexistent/cube.toml")).is_err());
    }
}
