// ABOUTME: Rollout strategies that place an artifact into a running or restartable service.
// ABOUTME: One implementation per strategy, all behind the RolloutStrategy trait.

mod layout;
mod local_copy;
mod manager;
mod remote_api;
mod remote_copy;
mod result;
mod service;
mod strategy;

pub use layout::DeployNames;
pub use local_copy::LocalCopyRollout;
pub use manager::{ManagerClient, ManagerError, ManagerReply};
pub use remote_api::RemoteApiRollout;
pub use remote_copy::{RemoteCopyRollout, RemoteLayout, RemoteShell, ShellConnector, SshConnector};
pub use result::{FailureKind, RolloutFailure, RolloutResult};
pub use service::{CommandControl, ControlError, ServiceControl};
pub use strategy::{RolloutStrategy, RolloutTarget, StrategyKind};
