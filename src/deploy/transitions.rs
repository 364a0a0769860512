// ABOUTME: State transition methods for a run.
// ABOUTME: Each method consumes self; failures short-circuit straight to Done.

use chrono::Utc;

use crate::artifact::{self, Artifact};
use crate::credentials::Credentials;
use crate::health::{HealthStatus, HealthVerifier, ProbeUrl};
use crate::rollout::{RolloutFailure, RolloutResult, RolloutStrategy};

use super::deployment::Run;
use super::state::{Done, Idle, Located, Phase, RolledOut, RollingOut};
use super::{RunReport, TargetLocks};

/// Either the next state or a finished run.
pub type TransitionResult<T> = Result<Run<T>, Run<Done>>;

impl<S> Run<S> {
    fn record(&mut self, phase: Phase) {
        if self.phases.last() != Some(&phase) {
            self.phases.push(phase);
        }
    }

    fn with_state<T>(self, state: T) -> Run<T> {
        Run {
            plan: self.plan,
            phases: self.phases,
            started_at: self.started_at,
            state,
        }
    }

    fn finish(
        mut self,
        artifact: Option<Artifact>,
        result: RolloutResult,
        health: Option<HealthStatus>,
    ) -> Run<Done> {
        self.record(Phase::Done);
        self.with_state(Done {
            artifact,
            result,
            health,
        })
    }
}

// =============================================================================
// Idle -> Located
// =============================================================================

impl Run<Idle> {
    /// Find the artifact and check its marker entry, if one is configured.
    #[must_use = "run state must be used"]
    pub fn locate(mut self) -> TransitionResult<Located> {
        self.record(Phase::Locating);

        let located = artifact::locate(&self.plan.artifact_path).and_then(|found| {
            if let Some(entry) = &self.plan.verify_entry {
                artifact::peek_entry(&found, entry)?;
            }
            Ok(found)
        });

        match located {
            Ok(artifact) => Ok(self.with_state(Located { artifact })),
            Err(e) => {
                let failure = RolloutFailure::new(e.kind(), &self.plan.target.id, e.to_string());
                Err(self.finish(None, failure.into(), None))
            }
        }
    }
}

// =============================================================================
// Located -> RollingOut
// =============================================================================

impl Run<Located> {
    /// Take the per-target lock.
    #[must_use = "run state must be used"]
    pub async fn begin_rollout(mut self, locks: &dyn TargetLocks) -> TransitionResult<RollingOut> {
        self.record(Phase::RollingOut);
        let acquired = locks.acquire(&self.plan.target.id).await;
        let Run {
            plan,
            phases,
            started_at,
            state: Located { artifact },
        } = self;
        let run = Run {
            plan,
            phases,
            started_at,
            state: (),
        };

        match acquired {
            Ok(guard) => Ok(run.with_state(RollingOut { artifact, guard })),
            Err(e) => {
                let failure = RolloutFailure::new(e.kind(), &run.plan.target.id, e.to_string());
                Err(run.finish(Some(artifact), failure.into(), None))
            }
        }
    }
}

// =============================================================================
// RollingOut -> RolledOut
// =============================================================================

impl Run<RollingOut> {
    /// Run the strategy once. The lock is released when this returns.
    #[must_use = "run state must be used"]
    pub async fn roll_out(
        self,
        strategy: &dyn RolloutStrategy,
        credentials: Option<&Credentials>,
    ) -> Run<RolledOut> {
        let result = strategy
            .rollout(&self.state.artifact, &self.plan.target, credentials)
            .await;

        let Run {
            plan,
            phases,
            started_at,
            state: RollingOut { artifact, guard },
        } = self;
        drop(guard);

        Run {
            plan,
            phases,
            started_at,
            state: RolledOut { artifact, result },
        }
    }
}

// =============================================================================
// RolledOut -> Done
// =============================================================================

impl Run<RolledOut> {
    /// Whether the run should probe: always after a non-failed rollout, and
    /// after a failed one only when asked to.
    pub fn should_verify(&self, verify_after_failure: bool) -> bool {
        !self.state.result.is_failed() || verify_after_failure
    }

    /// Probe the service. Health never changes the rollout result.
    pub async fn verify(mut self, verifier: &HealthVerifier, url: &ProbeUrl) -> Run<Done> {
        self.record(Phase::Verifying);
        let health = verifier.probe(url).await;
        let (run, RolledOut { artifact, result }) = self.split();
        run.finish(Some(artifact), result, Some(health))
    }

    pub fn skip_verification(self) -> Run<Done> {
        let (run, RolledOut { artifact, result }) = self.split();
        run.finish(Some(artifact), result, None)
    }

    fn split(self) -> (Run<()>, RolledOut) {
        let Run {
            plan,
            phases,
            started_at,
            state,
        } = self;
        (
            Run {
                plan,
                phases,
                started_at,
                state: (),
            },
            state,
        )
    }
}

// =============================================================================
// Done
// =============================================================================

impl Run<Done> {
    pub fn into_report(self) -> RunReport {
        RunReport {
            target: self.plan.target.id,
            artifact: self.state.artifact,
            rollout: self.state.result,
            health: self.state.health,
            phases: self.phases,
            started_at: self.started_at,
            finished_at: Utc::now(),
        }
    }
}
