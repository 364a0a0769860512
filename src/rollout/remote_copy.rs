// ABOUTME: Remote-copy rollout over SSH: stage the upload, stop, replace, start.
// ABOUTME: Stop, move and start failures abort with the service flagged down; removals only warn.

use async_trait::async_trait;

use super::{
    DeployNames, FailureKind, RolloutFailure, RolloutResult, RolloutStrategy, RolloutTarget,
    StrategyKind,
};
use crate::artifact::Artifact;
use crate::credentials::Credentials;
use crate::diagnostics::{Diagnostics, Warning};
use crate::ssh::{self, CommandOutput, Session, SessionConfig};
use crate::types::{RemotePath, TargetId};

/// Commands and uploads on an open remote session.
#[async_trait]
pub trait RemoteShell: Send + Sync {
    async fn exec(&self, command: &str) -> ssh::Result<CommandOutput>;
    async fn upload(&self, data: &[u8], dest: &RemotePath) -> ssh::Result<()>;
}

/// Opens and closes remote sessions.
#[async_trait]
pub trait ShellConnector: Send + Sync {
    type Shell: RemoteShell + 'static;

    async fn connect(&self, credentials: Option<&Credentials>) -> ssh::Result<Self::Shell>;
    async fn disconnect(&self, shell: Self::Shell) -> ssh::Result<()>;
}

#[async_trait]
impl RemoteShell for Session {
    async fn exec(&self, command: &str) -> ssh::Result<CommandOutput> {
        Session::exec(self, command).await
    }

    async fn upload(&self, data: &[u8], dest: &RemotePath) -> ssh::Result<()> {
        Session::upload(self, data, dest).await
    }
}

/// Connects with russh. Key credentials override the configured key path.
#[derive(Debug, Clone)]
pub struct SshConnector {
    config: SessionConfig,
}

impl SshConnector {
    pub fn new(config: SessionConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl ShellConnector for SshConnector {
    type Shell = Session;

    async fn connect(&self, credentials: Option<&Credentials>) -> ssh::Result<Session> {
        let mut config = self.config.clone();
        if let Some(path) = credentials.and_then(Credentials::key_path) {
            config = config.key_path(path.clone());
        }
        tracing::debug!("connecting to {}@{}:{}", config.user, config.host, config.port);
        Session::connect(config).await
    }

    async fn disconnect(&self, shell: Session) -> ssh::Result<()> {
        shell.disconnect().await
    }
}

/// Remote directories the strategy works in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteLayout {
    /// `{service_root}/{deploy_dir}`
    pub deploy_dir: RemotePath,
    /// `{service_root}/{staging_dir}`; should be on the same filesystem as
    /// `deploy_dir` so the final move is a rename.
    pub staging_dir: RemotePath,
}

/// Absolute remote paths for one rollout.
struct RemotePlan {
    staged: RemotePath,
    archive: RemotePath,
    directories: Vec<RemotePath>,
    files: Vec<RemotePath>,
}

impl RemotePlan {
    fn new(layout: &RemoteLayout, names: &DeployNames) -> Result<Self, crate::types::RemotePathError> {
        let staged = layout
            .staging_dir
            .join(&format!("{}.upload", names.archive))?;
        let archive = layout.deploy_dir.join(&names.archive)?;
        let directories = names
            .directories_to_remove()
            .into_iter()
            .map(|d| layout.deploy_dir.join(d))
            .collect::<Result<_, _>>()?;
        let files = names
            .files_to_remove()
            .into_iter()
            .map(|f| layout.deploy_dir.join(f))
            .collect::<Result<_, _>>()?;
        Ok(Self {
            staged,
            archive,
            directories,
            files,
        })
    }
}

/// Uploads the artifact over SSH and swaps it in on the remote host.
#[derive(Debug)]
pub struct RemoteCopyRollout<C = SshConnector> {
    connector: C,
    layout: RemoteLayout,
    stop_command: RemotePath,
    start_command: RemotePath,
}

impl<C: ShellConnector> RemoteCopyRollout<C> {
    pub fn new(
        connector: C,
        layout: RemoteLayout,
        stop_command: RemotePath,
        start_command: RemotePath,
    ) -> Self {
        Self {
            connector,
            layout,
            stop_command,
            start_command,
        }
    }

    /// Run the mandatory steps on an open shell. Cleanup warnings go to `diag`.
    async fn run(
        &self,
        shell: &C::Shell,
        artifact: &Artifact,
        target: &TargetId,
        plan: &RemotePlan,
        diag: &mut Diagnostics,
    ) -> Result<(), RolloutFailure> {
        let data = tokio::fs::read(artifact.path()).await.map_err(|e| {
            RolloutFailure::new(
                FailureKind::ArtifactMissing,
                target,
                format!("failed to read {}: {}", artifact.path().display(), e),
            )
        })?;

        shell.upload(&data, &plan.staged).await.map_err(|e| {
            RolloutFailure::new(
                FailureKind::TransportFailure,
                target,
                format!("upload to {} failed: {}", plan.staged, e),
            )
        })?;

        // Nothing in the deploy directory is touched unless the stop succeeded.
        let stopped = match shell.exec(&self.stop_command.quoted()).await {
            Ok(out) if out.success() => Ok(()),
            Ok(out) => Err((
                FailureKind::PartialFailure,
                format!("exit code {}: {}", out.exit_code, out.stderr.trim()),
            )),
            Err(e) => Err((FailureKind::TransportFailure, e.to_string())),
        };
        if let Err((kind, reason)) = stopped {
            return Err(RolloutFailure::new(
                kind,
                target,
                format!(
                    "artifact staged at {} but {} failed: {}",
                    plan.staged, self.stop_command, reason
                ),
            )
            .service_down());
        }

        for dir in &plan.directories {
            remove(shell, &format!("rm -rf {}", dir.quoted()), dir, diag).await;
        }
        for file in &plan.files {
            remove(shell, &format!("rm -f {}", file.quoted()), file, diag).await;
        }

        let mv = format!("mv -f {} {}", plan.staged.quoted(), plan.archive.quoted());
        let moved = match shell.exec(&mv).await {
            Ok(out) if out.success() => Ok(()),
            Ok(out) => Err(format!(
                "exit code {}: {}",
                out.exit_code,
                out.stderr.trim()
            )),
            Err(e) => Err(e.to_string()),
        };
        if let Err(reason) = moved {
            return Err(RolloutFailure::new(
                FailureKind::TransportFailure,
                target,
                format!("failed to move {} to {}: {}", plan.staged, plan.archive, reason),
            )
            .service_down());
        }

        let started = match shell.exec(&self.start_command.quoted()).await {
            Ok(out) if out.success() => Ok(()),
            Ok(out) => Err(format!(
                "exit code {}: {}",
                out.exit_code,
                out.stderr.trim()
            )),
            Err(e) => Err(e.to_string()),
        };
        if let Err(reason) = started {
            return Err(RolloutFailure::new(
                FailureKind::PartialFailure,
                target,
                format!(
                    "artifact placed at {} but {} failed: {}",
                    plan.archive, self.start_command, reason
                ),
            )
            .service_down());
        }

        Ok(())
    }
}

async fn remove<S: RemoteShell + ?Sized>(
    shell: &S,
    command: &str,
    path: &RemotePath,
    diag: &mut Diagnostics,
) {
    match shell.exec(command).await {
        Ok(out) if out.success() => tracing::debug!("removed {}", path),
        Ok(out) => diag.warn(Warning::removal(format!(
            "failed to remove {}: {}",
            path,
            out.stderr.trim()
        ))),
        Err(e) => diag.warn(Warning::removal(format!("failed to remove {}: {}", path, e))),
    }
}

#[async_trait]
impl<C: ShellConnector> RolloutStrategy for RemoteCopyRollout<C> {
    fn kind(&self) -> StrategyKind {
        StrategyKind::RemoteCopy
    }

    async fn rollout(
        &self,
        artifact: &Artifact,
        target: &RolloutTarget,
        credentials: Option<&Credentials>,
    ) -> RolloutResult {
        let names = DeployNames::new(artifact, &target.context);
        let plan = match RemotePlan::new(&self.layout, &names) {
            Ok(plan) => plan,
            Err(e) => {
                return RolloutFailure::new(
                    FailureKind::TransportFailure,
                    &target.id,
                    format!("cannot build remote path: {}", e),
                )
                .into();
            }
        };

        let shell = match self.connector.connect(credentials).await {
            Ok(shell) => shell,
            Err(e) => {
                let kind = if e.is_auth() {
                    FailureKind::AuthFailure
                } else {
                    FailureKind::TransportFailure
                };
                return RolloutFailure::new(kind, &target.id, format!("SSH connect failed: {}", e))
                    .into();
            }
        };

        let mut diag = Diagnostics::default();
        let outcome = self
            .run(&shell, artifact, &target.id, &plan, &mut diag)
            .await;

        if let Err(e) = self.connector.disconnect(shell).await {
            diag.warn(Warning::ssh_disconnect(format!("SSH disconnect failed: {}", e)));
        }

        match outcome {
            Ok(()) => RolloutResult::from_warnings(&diag.messages()),
            Err(failure) => failure.into(),
        }
    }
}
