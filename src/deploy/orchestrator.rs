// ABOUTME: Drives one run from Idle to Done with a fixed strategy and lock registry.
// ABOUTME: Never logs and never panics on operational failure; everything lands in the RunReport.

use std::sync::Arc;

use crate::credentials::Credentials;
use crate::health::{HealthVerifier, ProbeUrl};
use crate::rollout::RolloutStrategy;

use super::{Run, RunPlan, RunReport, TargetLocks};

pub struct Orchestrator {
    plan: RunPlan,
    strategy: Box<dyn RolloutStrategy>,
    verifier: HealthVerifier,
    probe_url: ProbeUrl,
    locks: Arc<dyn TargetLocks>,
    verify_after_failure: bool,
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("plan", &self.plan)
            .field("strategy", &self.strategy.kind())
            .field("verifier", &self.verifier)
            .field("probe_url", &self.probe_url)
            .field("verify_after_failure", &self.verify_after_failure)
            .finish()
    }
}

impl Orchestrator {
    pub fn new(
        plan: RunPlan,
        strategy: Box<dyn RolloutStrategy>,
        verifier: HealthVerifier,
        probe_url: ProbeUrl,
        locks: Arc<dyn TargetLocks>,
    ) -> Self {
        Self {
            plan,
            strategy,
            verifier,
            probe_url,
            locks,
            verify_after_failure: false,
        }
    }

    /// Probe the service even when the rollout failed.
    pub fn verify_after_failure(mut self, enabled: bool) -> Self {
        self.verify_after_failure = enabled;
        self
    }

    pub fn plan(&self) -> &RunPlan {
        &self.plan
    }

    pub fn probe_url(&self) -> &ProbeUrl {
        &self.probe_url
    }

    /// Execute one run. Credentials are only passed to the strategy call.
    pub async fn run(&self, credentials: Option<&Credentials>) -> RunReport {
        let run = Run::new(self.plan.clone());

        let located = match run.locate() {
            Ok(run) => run,
            Err(done) => return done.into_report(),
        };

        let rolling = match located.begin_rollout(self.locks.as_ref()).await {
            Ok(run) => run,
            Err(done) => return done.into_report(),
        };

        let rolled = rolling.roll_out(self.strategy.as_ref(), credentials).await;

        let done = if rolled.should_verify(self.verify_after_failure) {
            rolled.verify(&self.verifier, &self.probe_url).await
        } else {
            rolled.skip_verification()
        };

        done.into_report()
    }
}
