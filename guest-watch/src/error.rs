//! Error types for every pipeline stage
//!
//! Fatal errors (table, source, store, config) abort the run before the
//! state file is written. `UnrecognizedUnit` is recovered locally by the
//! normalizer and `NotifyError` is only ever logged.

use std::path::PathBuf;
use std::time::Duration;

/// Table layout problems that make field mapping unreliable
#[derive(Debug, thiserror::Error)]
pub enum TableError {
    #[error("header row is missing required column '{0}'")]
    MissingColumn(&'static str),
    #[error("line {line}: row has {found} columns but header declares {expected}")]
    MalformedRow {
        line: usize,
        expected: usize,
        found: usize,
    },
}

/// Capacity string without a GiB/MiB suffix or with an unparsable magnitude
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unable to convert '{0}': unrecognized unit")]
pub struct UnrecognizedUnit(pub String);

/// Failures of the resource table command
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("failed to spawn '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("'{program}' did not finish within {timeout:?}")]
    Timeout { program: String, timeout: Duration },
    #[error("'{program}' exited with {status}: {stderr}")]
    Failed {
        program: String,
        status: std::process::ExitStatus,
        stderr: String,
    },
    #[error("'{program}' produced non UTF-8 output")]
    InvalidUtf8 { program: String },
    #[error("'{program}' produced no output")]
    EmptyOutput { program: String },
}

/// Notification delivery failures (logged, never fatal)
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("sink answered with status {0}")]
    Rejected(reqwest::StatusCode),
}

/// State file load/save failures
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("corrupt state file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("failed to serialize state: {0}")]
    Serialize(#[source] serde_yaml::Error),
}

/// Configuration loading failures
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("configuration file {0} not found, please create it and run again")]
    Missing(PathBuf),
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid configuration in {path}: {source}")]
    Invalid {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("configured table command is empty")]
    EmptyCommand,
}
