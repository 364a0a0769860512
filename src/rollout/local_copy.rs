// ABOUTME: Local-copy rollout: stop, clear old copies, copy the archive in, start.
// ABOUTME: Only a clean non-zero stop exit is tolerated; a failed copy leaves the service stopped.

use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::PathBuf;

use super::{
    CommandControl, ControlError, DeployNames, FailureKind, RolloutFailure, RolloutResult, RolloutStrategy,
    RolloutTarget, ServiceControl, StrategyKind,
};
use crate::artifact::Artifact;
use crate::credentials::Credentials;
use crate::diagnostics::{Diagnostics, Warning};

/// Replaces the archive in a service's deploy directory on this machine.
#[derive(Debug)]
pub struct LocalCopyRollout<C = CommandControl> {
    deploy_dir: PathBuf,
    control: C,
}

impl<C: ServiceControl> LocalCopyRollout<C> {
    /// `deploy_dir` is `{service_root}/{deploy_dir}`; it must already exist.
    pub fn new(deploy_dir: impl Into<PathBuf>, control: C) -> Self {
        Self {
            deploy_dir: deploy_dir.into(),
            control,
        }
    }

    async fn remove_dir(&self, name: &str, diag: &mut Diagnostics) {
        let path = self.deploy_dir.join(name);
        match tokio::fs::remove_dir_all(&path).await {
            Ok(()) => tracing::debug!("removed {}", path.display()),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => diag.warn(Warning::removal(format!(
                "failed to remove {}: {}",
                path.display(),
                e
            ))),
        }
    }

    async fn remove_file(&self, name: &str, diag: &mut Diagnostics) {
        let path = self.deploy_dir.join(name);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => tracing::debug!("removed {}", path.display()),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => diag.warn(Warning::removal(format!(
                "failed to remove {}: {}",
                path.display(),
                e
            ))),
        }
    }
}

#[async_trait]
impl<C: ServiceControl> RolloutStrategy for LocalCopyRollout<C> {
    fn kind(&self) -> StrategyKind {
        StrategyKind::LocalCopy
    }

    async fn rollout(
        &self,
        artifact: &Artifact,
        target: &RolloutTarget,
        _credentials: Option<&Credentials>,
    ) -> RolloutResult {
        let mut diag = Diagnostics::default();
        let names = DeployNames::new(artifact, &target.context);

        match self.control.stop().await {
            Ok(()) => {}
            Err(e @ ControlError::ExitStatus { .. }) => diag.warn(Warning::stop_tolerated(
                format!("stop failed, assuming already stopped: {}", e),
            )),
            Err(e) => {
                // The service may still be running; leave the deploy directory alone.
                let failure = RolloutFailure::new(
                    FailureKind::TransportFailure,
                    &target.id,
                    format!("could not stop service: {}", e),
                );
                let failure = if matches!(e, ControlError::Timeout { .. }) {
                    failure.service_down()
                } else {
                    failure
                };
                return failure.into();
            }
        }

        for dir in names.directories_to_remove() {
            self.remove_dir(dir, &mut diag).await;
        }
        for file in names.files_to_remove() {
            self.remove_file(file, &mut diag).await;
        }

        let dest = self.deploy_dir.join(&names.archive);
        if let Err(e) = tokio::fs::copy(artifact.path(), &dest).await {
            // No start after a failed copy; the service stays down.
            return RolloutFailure::new(
                FailureKind::TransportFailure,
                &target.id,
                format!(
                    "failed to copy {} to {}: {}",
                    artifact.path().display(),
                    dest.display(),
                    e
                ),
            )
            .service_down()
            .into();
        }
        tracing::debug!("copied {} to {}", artifact.file_name(), dest.display());

        if let Err(e) = self.control.start().await {
            return RolloutFailure::new(
                FailureKind::PartialFailure,
                &target.id,
                format!(
                    "artifact placed at {} but service failed to start: {}",
                    dest.display(),
                    e
                ),
            )
            .service_down()
            .into();
        }

        RolloutResult::from_warnings(&diag.messages())
    }
}
