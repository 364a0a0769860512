// ABOUTME: Hooks system for rollout lifecycle events.
// ABOUTME: Discovers and executes scripts at pre-rollout, post-rollout, and on-failure points.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;

use crate::config::Config;

/// Hook execution points in the rollout lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookPoint {
    /// Before the run starts (typically the build). Failure aborts the run.
    PreRollout,
    /// After a successful run. Failure logs a warning.
    PostRollout,
    /// After a failed or unhealthy run. Failure logs a warning.
    OnFailure,
}

impl HookPoint {
    /// Get the hook filename for this point.
    pub fn filename(&self) -> &'static str {
        match self {
            HookPoint::PreRollout => "pre-rollout",
            HookPoint::PostRollout => "post-rollout",
            HookPoint::OnFailure => "on-failure",
        }
    }

    /// Whether failure at this hook point should abort the run.
    pub fn is_fatal(&self) -> bool {
        matches!(self, HookPoint::PreRollout)
    }
}

/// Context passed to hooks via environment variables.
#[derive(Debug, Clone)]
pub struct HookContext {
    pub target: String,
    pub artifact: String,
    pub strategy: String,
    pub context: String,
    pub host: String,
}

impl HookContext {
    pub fn new(config: &Config) -> Self {
        Self {
            target: config.target.to_string(),
            artifact: config.artifact.path.display().to_string(),
            strategy: config.strategy.kind().to_string(),
            context: config.context.to_string(),
            host: config.host.to_string(),
        }
    }

    /// Convert context to environment variables.
    pub fn to_env(&self) -> HashMap<String, String> {
        HashMap::from([
            ("WARSHIP_TARGET".to_string(), self.target.clone()),
            ("WARSHIP_ARTIFACT".to_string(), self.artifact.clone()),
            ("WARSHIP_STRATEGY".to_string(), self.strategy.clone()),
            ("WARSHIP_CONTEXT".to_string(), self.context.clone()),
            ("WARSHIP_HOST".to_string(), self.host.clone()),
        ])
    }
}

/// Result of running a hook.
#[derive(Debug)]
pub struct HookResult {
    pub success: bool,
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

/// Discovers and runs hooks from a project directory.
#[derive(Debug)]
pub struct HookRunner {
    project_dir: PathBuf,
    hooks_dir: PathBuf,
}

impl HookRunner {
    /// Look for hooks in `<project_dir>/.warship/hooks`.
    pub fn new(project_dir: &Path) -> Self {
        Self {
            project_dir: project_dir.to_path_buf(),
            hooks_dir: project_dir.join(".warship").join("hooks"),
        }
    }

    /// Check if a hook exists for the given point.
    pub fn hook_exists(&self, point: HookPoint) -> bool {
        self.hook_path(point).is_file()
    }

    fn hook_path(&self, point: HookPoint) -> PathBuf {
        self.hooks_dir.join(point.filename())
    }

    /// Run a hook if it exists.
    ///
    /// Returns None if the hook doesn't exist, or Some(HookResult) if it was run.
    /// Hooks run with the project directory as working directory.
    pub async fn run(&self, point: HookPoint, context: &HookContext) -> Option<HookResult> {
        let hook_path = self.hook_path(point);

        if !hook_path.is_file() {
            return None;
        }

        tracing::info!("Running {} hook: {}", point.filename(), hook_path.display());

        let output = Command::new(&hook_path)
            .current_dir(&self.project_dir)
            .envs(context.to_env())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await;

        match output {
            Ok(output) => {
                let result = HookResult {
                    success: output.status.success(),
                    exit_code: output.status.code(),
                    stdout: String::from_utf8_lossy(&output.stdout).to_string(),
                    stderr: String::from_utf8_lossy(&output.stderr).to_string(),
                };

                if result.success {
                    tracing::info!("{} hook completed successfully", point.filename());
                } else {
                    tracing::warn!(
                        "{} hook failed with exit code {:?}",
                        point.filename(),
                        result.exit_code
                    );
                }

                Some(result)
            }
            Err(e) => {
                tracing::error!("Failed to execute {} hook: {}", point.filename(), e);
                Some(HookResult {
                    success: false,
                    exit_code: None,
                    stdout: String::new(),
                    stderr: e.to_string(),
                })
            }
        }
    }
}
