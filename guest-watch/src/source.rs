//! Resource table source
//!
//! Runs the configured listing command (by default
//! `/usr/bin/pvesh get /cluster/resources`) with a hard timeout and hands the
//! captured stdout to the parser.

use crate::error::SourceError;
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::process::Command as AsyncCommand;
use tracing::debug;

/// Anything able to produce the raw resource table text
#[allow(async_fn_in_trait)]
pub trait TableSource {
    async fn fetch(&self) -> Result<String, SourceError>;
}

/// Runs an external command and returns its stdout
#[derive(Debug, Clone)]
pub struct CommandSource {
    program: String,
    args: Vec<String>,
    timeout: Duration,
}

impl CommandSource {
    pub fn new(program: impl Into<String>, args: Vec<String>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            args,
            timeout,
        }
    }
}

impl TableSource for CommandSource {
    async fn fetch(&self) -> Result<String, SourceError> {
        let start_time = Instant::now();
        debug!("Executing {} {:?} (timeout: {:?})", self.program, self.args, self.timeout);

        let child = AsyncCommand::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| SourceError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        let output = tokio::time::timeout(self.timeout, child.wait_with_output())
            .await
            .map_err(|_| SourceError::Timeout {
                program: self.program.clone(),
                timeout: self.timeout,
            })?
            .map_err(|source| SourceError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(SourceError::Failed {
                program: self.program.clone(),
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let stdout = String::from_utf8(output.stdout).map_err(|_| SourceError::InvalidUtf8 {
            program: self.program.clone(),
        })?;

        if stdout.trim().is_empty() {
            return Err(SourceError::EmptyOutput {
                program: self.program.clone(),
            });
        }

        debug!(
            "{} returned {} bytes in {}ms",
            self.program,
            stdout.len(),
            start_time.elapsed().as_millis()
        );
        Ok(stdout)
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn sh(script: &str, timeout: Duration) -> CommandSource {
        CommandSource::new("/bin/sh", vec!["-c".into(), script.into()], timeout)
    }

    #[tokio::test]
    async fn test_captures_stdout() {
        let out = sh("printf '│ id │\\n'", Duration::from_secs(5)).fetch().await.unwrap();
        assert_eq!(out, "│ id │\n");
    }

    #[tokio::test]
    async fn test_non_zero_exit() {
        let err = sh("echo boom >&2; exit 3", Duration::from_secs(5))
            .fetch()
            .await
            .unwrap_err();
        match err {
            SourceError::Failed { status, stderr, .. } => {
                assert_eq!(status.code(), Some(3));
                assert_eq!(stderr, "boom");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_empty_output() {
        let err = sh("true", Duration::from_secs(5)).fetch().await.unwrap_err();
        assert!(matches!(err, SourceError::EmptyOutput { .. }));
    }

    #[tokio::test]
    async fn test_timeout() {
        let err = sh("sleep 5", Duration::from_millis(100)).fetch().await.unwrap_err();
        assert!(matches!(err, SourceError::Timeout { .. }));
    }

    #[tokio::test]
    async fn test_missing_program() {
        let source = CommandSource::new("/nonexistent/pvesh", vec![], Duration::from_secs(1));
        assert!(matches!(source.fetch().await.unwrap_err(), SourceError::Spawn { .. }));
    }
}
