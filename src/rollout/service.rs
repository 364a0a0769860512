// ABOUTME: Stop/start control of a local service through two external executables.
// ABOUTME: Executables run with no arguments; exit code 0 means success.

use async_trait::async_trait;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;
use thiserror::Error;
use tokio::process::Command;

#[derive(Debug, Error)]
pub enum ControlError {
    #[error("failed to run {program}: {source}")]
    Spawn {
        program: String,
        source: std::io::Error,
    },

    #[error("{program} exited with {}: {stderr}", describe_exit(.code))]
    ExitStatus {
        program: String,
        code: Option<i32>,
        stderr: String,
    },

    #[error("{program} did not finish within {timeout:?}")]
    Timeout { program: String, timeout: Duration },
}

fn describe_exit(code: &Option<i32>) -> String {
    match code {
        Some(c) => format!("code {}", c),
        None => "a signal".to_string(),
    }
}

/// Starts and stops the service that serves the deploy directory.
#[async_trait]
pub trait ServiceControl: Send + Sync {
    async fn stop(&self) -> Result<(), ControlError>;
    async fn start(&self) -> Result<(), ControlError>;
}

/// Runs configured stop/start executables.
#[derive(Debug, Clone)]
pub struct CommandControl {
    stop: PathBuf,
    start: PathBuf,
    timeout: Duration,
}

impl CommandControl {
    pub fn new(stop: impl Into<PathBuf>, start: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            stop: stop.into(),
            start: start.into(),
            timeout,
        }
    }

    async fn run(&self, program: &PathBuf) -> Result<(), ControlError> {
        let name = program.display().to_string();
        tracing::debug!("running {}", name);

        let child = Command::new(program)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| ControlError::Spawn {
                program: name.clone(),
                source,
            })?;

        let output = match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(result) => result.map_err(|source| ControlError::Spawn {
                program: name.clone(),
                source,
            })?,
            Err(_) => {
                return Err(ControlError::Timeout {
                    program: name,
                    timeout: self.timeout,
                });
            }
        };

        if output.status.success() {
            Ok(())
        } else {
            Err(ControlError::ExitStatus {
                program: name,
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            })
        }
    }
}

#[async_trait]
impl ServiceControl for CommandControl {
    async fn stop(&self) -> Result<(), ControlError> {
        self.run(&self.stop).await
    }

    async fn start(&self) -> Result<(), ControlError> {
        self.run(&self.start).await
    }
}
