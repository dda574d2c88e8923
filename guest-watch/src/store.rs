//! YAML persistence of per-guest state between runs
//!
//! The file is read once at startup and written once at the end of a
//! successful poll. Writes go through a temporary file and a rename so an
//! interrupted run never leaves a truncated state file behind.

use crate::error::StoreError;
use crate::models::GuestStates;
use chrono::{DateTime, Duration, Utc};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub struct StateStore {
    path: PathBuf,
}

impl StateStore {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the previous state; a missing or empty file is an empty state
    pub async fn load(&self) -> Result<GuestStates, StoreError> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!("No state file at {}, starting fresh", self.path.display());
                return Ok(GuestStates::new());
            }
            Err(source) => {
                return Err(StoreError::Io {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        if content.trim().is_empty() {
            return Ok(GuestStates::new());
        }

        let states: GuestStates =
            serde_yaml::from_str(&content).map_err(|source| StoreError::Parse {
                path: self.path.clone(),
                source,
            })?;

        debug!("Loaded {} guests from {}", states.len(), self.path.display());
        Ok(states)
    }

    /// Replace the state file with `states`
    pub async fn save(&self, states: &GuestStates) -> Result<(), StoreError> {
        let content = serde_yaml::to_string(states).map_err(StoreError::Serialize)?;
        let io_err = |source| StoreError::Io {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(io_err)?;
        }

        let tmp_path = self.tmp_path();
        tokio::fs::write(&tmp_path, content).await.map_err(io_err)?;
        tokio::fs::rename(&tmp_path, &self.path).await.map_err(io_err)?;

        debug!("State written to {}", self.path.display());
        Ok(())
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

/// Drop guests not seen running for longer than `max_age`. Entries without
/// a `last_seen` timestamp are kept.
pub fn prune_stale(states: &mut GuestStates, max_age: Duration, now: DateTime<Utc>) -> usize {
    let before = states.len();
    states.retain(|id, snapshot| match snapshot.last_seen {
        Some(seen) if now - seen > max_age => {
            info!("Pruning stale guest {} (last seen {})", id, seen);
            false
        }
        _ => true,
    });
    before - states.len()
}
