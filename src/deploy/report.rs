// ABOUTME: Structured terminal report of one run.
// ABOUTME: Serializable so the CLI can print it as JSON.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::artifact::Artifact;
use crate::health::HealthStatus;
use crate::rollout::{RolloutFailure, RolloutResult};
use crate::types::TargetId;

use super::Phase;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunReport {
    pub target: TargetId,
    /// `None` when the artifact could not be located.
    pub artifact: Option<Artifact>,
    pub rollout: RolloutResult,
    /// `None` when verification was skipped.
    pub health: Option<HealthStatus>,
    pub phases: Vec<Phase>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl RunReport {
    /// Rollout did not fail and the service answered healthy.
    pub fn is_success(&self) -> bool {
        !self.rollout.is_failed() && self.health.is_some_and(|h| h.is_healthy())
    }

    pub fn failure(&self) -> Option<&RolloutFailure> {
        self.rollout.failure()
    }

    /// Rollout succeeded but the probe did not come back healthy.
    pub fn is_unhealthy(&self) -> bool {
        !self.rollout.is_failed() && self.health.is_some_and(|h| !h.is_healthy())
    }

    pub fn duration(&self) -> chrono::Duration {
        self.finished_at - self.started_at
    }
}
