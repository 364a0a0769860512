// ABOUTME: Outcome types for a single rollout attempt.
// ABOUTME: Failures carry kind, target, message and timestamp so callers can alert on them.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

use crate::types::TargetId;

/// Category of a failure, for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Artifact missing, empty or unreadable.
    ArtifactMissing,
    /// Verification marker absent from the artifact.
    EntryNotFound,
    /// Artifact is not a valid archive.
    InvalidArchive,
    /// Could not acquire the per-target lock.
    LockUnavailable,
    /// Network, I/O or remote command failure during the mandatory step.
    TransportFailure,
    /// Credentials missing or refused.
    AuthFailure,
    /// Manager accepted the request but reported a failure.
    Rejected,
    /// Artifact placed, but the service could not be started.
    PartialFailure,
    /// Health probe could not connect.
    HealthUnreachable,
    /// Health probe got a non-2xx status.
    HealthUnexpectedStatus,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FailureKind::ArtifactMissing => "artifact missing",
            FailureKind::EntryNotFound => "entry not found",
            FailureKind::InvalidArchive => "invalid archive",
            FailureKind::LockUnavailable => "lock unavailable",
            FailureKind::TransportFailure => "transport failure",
            FailureKind::AuthFailure => "authentication failure",
            FailureKind::Rejected => "rejected by manager",
            FailureKind::PartialFailure => "partial failure",
            FailureKind::HealthUnreachable => "health unreachable",
            FailureKind::HealthUnexpectedStatus => "unexpected health status",
        };
        f.write_str(s)
    }
}

/// A fatal rollout failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RolloutFailure {
    pub kind: FailureKind,
    pub target: TargetId,
    pub message: String,
    /// The service was stopped and not brought back up.
    pub service_down: bool,
    pub at: DateTime<Utc>,
}

impl RolloutFailure {
    pub fn new(kind: FailureKind, target: &TargetId, message: impl Into<String>) -> Self {
        Self {
            kind,
            target: target.clone(),
            message: message.into(),
            service_down: false,
            at: Utc::now(),
        }
    }

    pub fn service_down(mut self) -> Self {
        self.service_down = true;
        self
    }

    /// Operator attention is needed rather than an automated retry.
    pub fn needs_intervention(&self) -> bool {
        self.service_down || self.kind == FailureKind::PartialFailure
    }
}

impl fmt::Display for RolloutFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} on {}: {}", self.kind, self.target, self.message)?;
        if self.service_down {
            write!(f, " (service is down)")?;
        }
        Ok(())
    }
}

/// Outcome of one rollout attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RolloutResult {
    Succeeded,
    SucceededWithWarning { reason: String },
    Failed(RolloutFailure),
}

impl RolloutResult {
    /// Build a success, downgraded to a warning when any warnings were collected.
    pub fn from_warnings(warnings: &[String]) -> Self {
        if warnings.is_empty() {
            RolloutResult::Succeeded
        } else {
            RolloutResult::SucceededWithWarning {
                reason: warnings.join("; "),
            }
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, RolloutResult::Failed(_))
    }

    pub fn failure(&self) -> Option<&RolloutFailure> {
        match self {
            RolloutResult::Failed(f) => Some(f),
            _ => None,
        }
    }
}

impl From<RolloutFailure> for RolloutResult {
    fn from(failure: RolloutFailure) -> Self {
        RolloutResult::Failed(failure)
    }
}
