// ABOUTME: Common rollout contract and the strategy tag used in configuration.
// ABOUTME: A strategy is chosen once when the orchestrator is built and never switched mid-run.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::RolloutResult;
use crate::artifact::Artifact;
use crate::credentials::Credentials;
use crate::types::{ContextPath, HostName, TargetId};

/// Strategy tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StrategyKind {
    /// Undeploy and deploy through the container's manager HTTP API.
    RemoteApi,
    /// Stop, replace files in the local deploy directory, start.
    LocalCopy,
    /// Upload over SSH, then stop, replace and start on the remote host.
    RemoteCopy,
}

impl StrategyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StrategyKind::RemoteApi => "remote-api",
            StrategyKind::LocalCopy => "local-copy",
            StrategyKind::RemoteCopy => "remote-copy",
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where an artifact goes. Fixed at configuration time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RolloutTarget {
    pub id: TargetId,
    pub host: HostName,
    pub port: u16,
    pub context: ContextPath,
    pub strategy: StrategyKind,
}

/// Places an artifact into a service.
///
/// Implementations never panic on operational failures and never retry;
/// every outcome is reported through the returned `RolloutResult`.
#[async_trait]
pub trait RolloutStrategy: Send + Sync {
    fn kind(&self) -> StrategyKind;

    async fn rollout(
        &self,
        artifact: &Artifact,
        target: &RolloutTarget,
        credentials: Option<&Credentials>,
    ) -> RolloutResult;
}
