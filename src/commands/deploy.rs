// ABOUTME: Deploy command implementation.
// ABOUTME: Runs hooks around one orchestrated run and maps the report to an exit status.

use std::path::Path;
use std::sync::Arc;

use warship::config::Config;
use warship::deploy::{Orchestrator, build_strategy};
use warship::diagnostics::{Diagnostics, Warning};
use warship::error::{Error, Result};
use warship::hooks::{HookContext, HookPoint, HookRunner};
use warship::output::Output;
use warship::rollout::RolloutResult;

/// Roll out the configured artifact to the configured target.
pub async fn deploy(
    config: Config,
    project_dir: &Path,
    force_lock: bool,
    mut output: Output,
) -> Result<()> {
    output.start_timer();
    let hook_runner = HookRunner::new(project_dir);
    let hook_context = HookContext::new(&config);
    let mut diag = Diagnostics::default();

    if let Some(result) = hook_runner.run(HookPoint::PreRollout, &hook_context).await
        && !result.success
    {
        if !result.stderr.is_empty() {
            output.error(result.stderr.trim());
        }
        return Err(Error::Hook {
            hook: HookPoint::PreRollout.filename().to_string(),
            reason: format!("exit code {:?}", result.exit_code),
        });
    }

    output.progress(&format!(
        "Deploying {} to {} ({}:{}{} via {})",
        config.artifact.path.display(),
        config.target,
        config.host,
        config.port,
        config.context,
        config.strategy.kind()
    ));

    let orchestrator = Orchestrator::new(
        config.run_plan(),
        build_strategy(&config)?,
        config.health.verifier(),
        config.probe_url()?,
        Arc::new(config.file_locks(force_lock)?),
    )
    .verify_after_failure(config.verify_after_failure);

    let report = {
        let credentials = config.resolve_credentials()?;
        orchestrator.run(credentials.as_ref()).await
    };

    output.report(&report);
    if let RolloutResult::SucceededWithWarning { reason } = &report.rollout {
        output.warning(reason);
    }

    let point = if report.is_success() {
        HookPoint::PostRollout
    } else {
        HookPoint::OnFailure
    };
    if let Some(result) = hook_runner.run(point, &hook_context).await
        && !result.success
    {
        diag.warn(Warning::hook(format!(
            "{} hook failed with exit code {:?}",
            point.filename(),
            result.exit_code
        )));
    }
    for warning in diag.warnings() {
        output.warning(&warning.message);
    }

    if let Some(failure) = report.failure() {
        return Err(Error::RolloutFailed(Box::new(failure.clone())));
    }
    match report.health {
        Some(health) if !health.is_healthy() => Err(Error::Unhealthy {
            url: orchestrator.probe_url().to_string(),
            status: health.to_string(),
        }),
        _ => {
            output.success(&format!(
                "Deployed {} to {}",
                config.artifact.path.display(),
                config.target
            ));
            Ok(())
        }
    }
}
