// ABOUTME: Run state marker types for the type state pattern.
// ABOUTME: Each state carries the data that is guaranteed to exist at that point.

use serde::Serialize;
use std::fmt;

use crate::artifact::Artifact;
use crate::health::HealthStatus;
use crate::rollout::RolloutResult;

use super::LockGuard;

/// Initial state: nothing checked yet.
/// Available actions: `locate()`
#[derive(Debug, Clone, Copy, Default)]
pub struct Idle;

/// Artifact found (and its marker entry present, if one is configured).
/// Available actions: `begin_rollout()`
#[derive(Debug)]
pub struct Located {
    pub(crate) artifact: Artifact,
}

/// Target lock held.
/// Available actions: `roll_out()`
#[derive(Debug)]
pub struct RollingOut {
    pub(crate) artifact: Artifact,
    pub(crate) guard: LockGuard,
}

/// Strategy returned; lock released.
/// Available actions: `verify()`, `skip_verification()`
#[derive(Debug)]
pub struct RolledOut {
    pub(crate) artifact: Artifact,
    pub(crate) result: RolloutResult,
}

/// Terminal state.
/// Available actions: `into_report()`
#[derive(Debug)]
pub struct Done {
    pub(crate) artifact: Option<Artifact>,
    pub(crate) result: RolloutResult,
    pub(crate) health: Option<HealthStatus>,
}

/// Phase names recorded in the run trail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Idle,
    Locating,
    RollingOut,
    Verifying,
    Done,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Phase::Idle => "idle",
            Phase::Locating => "locating",
            Phase::RollingOut => "rolling out",
            Phase::Verifying => "verifying",
            Phase::Done => "done",
        };
        f.write_str(s)
    }
}
