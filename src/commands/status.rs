// ABOUTME: Status command implementation.
// ABOUTME: Prints the resolved configuration without touching the target.

use warship::config::{Config, StrategyConfig};
use warship::error::Result;
use warship::output::Output;

pub fn status(config: &Config, output: Output) -> Result<()> {
    let probe = config.probe_url()?;

    output.progress(&format!("Target:   {}", config.target));
    output.progress(&format!("Artifact: {}", config.artifact.path.display()));
    output.progress(&format!("Service:  {}:{}{}", config.host, config.port, config.context));
    output.progress(&format!("Strategy: {}", config.strategy.kind()));
    match &config.strategy {
        StrategyConfig::RemoteApi(api) => {
            output.progress(&format!("  manager: {}", api.manager_path));
        }
        StrategyConfig::LocalCopy(local) => {
            output.progress(&format!("  deploy dir: {}", local.deploy_path().display()));
        }
        StrategyConfig::RemoteCopy(remote) => {
            output.progress(&format!(
                "  server: {}@{}:{}",
                remote.server.user(),
                remote.server.host,
                remote.server.port
            ));
        }
    }
    output.progress(&format!("Probe:    {}", probe));
    if !config.destinations.is_empty() {
        let mut names: Vec<&str> = config.destinations.keys().map(String::as_str).collect();
        names.sort_unstable();
        output.progress(&format!("Destinations: {}", names.join(", ")));
    }

    output.success(&format!("{} is configured", config.target));
    Ok(())
}
