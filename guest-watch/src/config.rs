//! Configuration file loading
//!
//! Path comes from `GUEST_WATCH_CONFIG`, falling back to `config.yml` in the
//! working directory. Unlike the state file, a missing configuration is fatal.

use crate::error::ConfigError;
use crate::severity::Thresholds;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::warn;

pub const CONFIG_ENV: &str = "GUEST_WATCH_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "config.yml";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchConfig {
    pub threshold: Thresholds,
    pub state_file: PathBuf,
    pub notification_url: String,
    #[serde(default = "default_command")]
    pub command: Vec<String>,
    #[serde(default = "default_command_timeout")]
    pub command_timeout_secs: u64,
    #[serde(default = "default_notification_timeout")]
    pub notification_timeout_secs: u64,
    #[serde(default)]
    pub accept_invalid_certs: bool,
    /// Forget guests not seen running for this many hours; unset keeps them forever
    #[serde(default)]
    pub prune_after_hours: Option<u64>,
}

fn default_command() -> Vec<String> {
    ["/usr/bin/pvesh", "get", "/cluster/resources"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_command_timeout() -> u64 {
    30
}

fn default_notification_timeout() -> u64 {
    10
}

impl WatchConfig {
    /// Resolve the config path from the environment
    pub fn config_file_path() -> PathBuf {
        std::env::var_os(CONFIG_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
    }

    pub async fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::config_file_path()).await
    }

    pub async fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = match tokio::fs::read_to_string(path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ConfigError::Missing(path.to_path_buf()))
            }
            Err(source) => {
                return Err(ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        let config = Self::parse(&content).map_err(|source| ConfigError::Invalid {
            path: path.to_path_buf(),
            source,
        })?;

        if config.command.is_empty() {
            return Err(ConfigError::EmptyCommand);
        }

        if !config.threshold.is_monotonic() {
            warn!(
                "Thresholds are not ordered (warning: {}, critical: {}), classification is ill-defined",
                config.threshold.warning, config.threshold.critical
            );
        }

        Ok(config)
    }

    pub fn parse(content: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(content)
    }

    pub fn command_timeout(&self) -> Duration {
        Duration::from_secs(self.command_timeout_secs)
    }

    pub fn notification_timeout(&self) -> Duration {
        Duration::from_secs(self.notification_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const MINIMAL: &str = "\
threshold:
  warning: 70
  critical: 90
state_file: state.yml
notification_url: https://ntfy.example.org/proxmox
";

    #[test]
    fn test_minimal_config_defaults() {
        let config = WatchConfig::parse(MINIMAL).unwrap();
        assert_eq!(config.threshold, Thresholds::new(70, 90));
        assert_eq!(config.state_file, PathBuf::from("state.yml"));
        assert_eq!(config.command, default_command());
        assert_eq!(config.command_timeout(), Duration::from_secs(30));
        assert_eq!(config.notification_timeout(), Duration::from_secs(10));
        assert!(!config.accept_invalid_certs);
        assert_eq!(config.prune_after_hours, None);
    }

    #[test]
    fn test_full_config() {
        let yaml = format!(
            "{MINIMAL}command: [/bin/cat, /tmp/table.txt]\ncommand_timeout_secs: 5\nprune_after_hours: 48\naccept_invalid_certs: true\n"
        );
        let config = WatchConfig::parse(&yaml).unwrap();
        assert_eq!(config.command, vec!["/bin/cat".to_string(), "/tmp/table.txt".to_string()]);
        assert_eq!(config.command_timeout_secs, 5);
        assert_eq!(config.prune_after_hours, Some(48));
        assert!(config.accept_invalid_certs);
    }

    #[tokio::test]
    async fn test_missing_file() {
        let dir = tempdir().unwrap();
        let err = WatchConfig::load_from(&dir.path().join("config.yml")).await.unwrap_err();
        assert!(matches!(err, ConfigError::Missing(_)));
    }

    #[tokio::test]
    async fn test_invalid_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.yml");
        std::fs::write(&path, "threshold: {warning: high}\n").unwrap();
        let err = WatchConfig::load_from(&path).await.unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));
    }

    #[tokio::test]
    async fn test_empty_command_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.yml");
        std::fs::write(&path, format!("{MINIMAL}command: []\n")).unwrap();
        let err = WatchConfig::load_from(&path).await.unwrap_err();
        assert!(matches!(err, ConfigError::EmptyCommand));
    }

    #[tokio::test]
    async fn test_load_from_disk() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.yml");
        std::fs::write(&path, MINIMAL).unwrap();
        let config = WatchConfig::load_from(&path).await.unwrap();
        assert_eq!(config.notification_url, "https://ntfy.example.org/proxmox");
    }
}
