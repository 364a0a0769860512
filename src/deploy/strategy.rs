// ABOUTME: Builds the rollout strategy named in the configuration.
// ABOUTME: The choice is made once per run; the orchestrator only sees the trait object.

use crate::config::{Config, StrategyConfig};
use crate::error::{Error, Result};
use crate::http::Endpoint;
use crate::rollout::{
    CommandControl, LocalCopyRollout, ManagerClient, RemoteApiRollout, RemoteCopyRollout,
    RolloutStrategy, SshConnector,
};

/// Construct the strategy for `config.strategy`.
pub fn build_strategy(config: &Config) -> Result<Box<dyn RolloutStrategy>> {
    match &config.strategy {
        StrategyConfig::RemoteApi(api) => {
            let client = ManagerClient::new(
                Endpoint::new(config.host.clone(), config.port),
                api.manager_path.clone(),
                api.timeout,
            );
            Ok(Box::new(RemoteApiRollout::new(client)))
        }
        StrategyConfig::LocalCopy(local) => {
            let control =
                CommandControl::new(local.stop_path(), local.start_path(), local.command_timeout);
            Ok(Box::new(LocalCopyRollout::new(local.deploy_path(), control)))
        }
        StrategyConfig::RemoteCopy(remote) => {
            let invalid = |e: crate::types::RemotePathError| Error::InvalidConfig(e.to_string());

            Ok(Box::new(RemoteCopyRollout::new(
                SshConnector::new(remote.session_config()),
                remote.layout().map_err(invalid)?,
                remote.stop_path().map_err(invalid)?,
                remote.start_path().map_err(invalid)?,
            )))
        }
    }
}
