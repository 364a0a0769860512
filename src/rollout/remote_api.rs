// ABOUTME: Remote-API rollout through the container's manager endpoint.
// ABOUTME: Undeploys the current context (best effort), then uploads the archive with update=true.

use async_trait::async_trait;
use bytes::Bytes;

use super::{
    FailureKind, ManagerClient, RolloutFailure, RolloutResult, RolloutStrategy, RolloutTarget,
    StrategyKind,
};
use crate::artifact::Artifact;
use crate::credentials::Credentials;
use crate::diagnostics::{Diagnostics, Warning};

/// Deploys by talking to a manager over HTTP. The service keeps running.
#[derive(Debug, Clone)]
pub struct RemoteApiRollout {
    client: ManagerClient,
}

impl RemoteApiRollout {
    pub fn new(client: ManagerClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &ManagerClient {
        &self.client
    }
}

#[async_trait]
impl RolloutStrategy for RemoteApiRollout {
    fn kind(&self) -> StrategyKind {
        StrategyKind::RemoteApi
    }

    async fn rollout(
        &self,
        artifact: &Artifact,
        target: &RolloutTarget,
        credentials: Option<&Credentials>,
    ) -> RolloutResult {
        let mut diag = Diagnostics::default();

        // Fail before touching the network when there is nothing to authenticate with.
        if credentials.and_then(Credentials::basic_auth_header).is_none() {
            return RolloutFailure::new(
                FailureKind::AuthFailure,
                &target.id,
                "remote-api rollout requires basic credentials",
            )
            .into();
        }

        match self.client.undeploy(&target.context, credentials).await {
            Ok(reply) => tracing::debug!("undeploy {}: {}", target.context, reply.message),
            Err(e) => diag.warn(Warning::undeploy(format!(
                "undeploy of {} failed: {}",
                target.context, e
            ))),
        }

        let archive = match tokio::fs::read(artifact.path()).await {
            Ok(bytes) => Bytes::from(bytes),
            Err(e) => {
                return RolloutFailure::new(
                    FailureKind::ArtifactMissing,
                    &target.id,
                    format!("failed to read {}: {}", artifact.path().display(), e),
                )
                .into();
            }
        };

        match self.client.deploy(&target.context, archive, credentials).await {
            Ok(reply) => {
                tracing::debug!("deploy {}: {}", target.context, reply.message);
                RolloutResult::from_warnings(&diag.messages())
            }
            Err(e) => RolloutFailure::new(
                e.kind(),
                &target.id,
                format!(
                    "deploy of {} to {} failed: {}",
                    artifact.file_name(),
                    self.client.endpoint().authority(),
                    e
                ),
            )
            .into(),
        }
    }
}
