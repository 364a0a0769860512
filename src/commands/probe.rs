// ABOUTME: Probe command implementation.
// ABOUTME: Runs the bounded health probe against the configured target only.

use warship::config::Config;
use warship::error::{Error, Result};
use warship::output::Output;

pub async fn probe(config: Config, mut output: Output) -> Result<()> {
    output.start_timer();
    let url = config.probe_url()?;
    let verifier = config.health.verifier();

    output.progress(&format!(
        "Probing {} (up to {} attempts)",
        url,
        verifier.max_attempts()
    ));

    let status = verifier.probe(&url).await;
    if status.is_healthy() {
        output.success(&format!("{} is healthy", url));
        Ok(())
    } else {
        Err(Error::Unhealthy {
            url: url.to_string(),
            status: status.to_string(),
        })
    }
}
