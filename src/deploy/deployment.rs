// ABOUTME: Generic run struct parameterized by state marker.
// ABOUTME: Holds the fixed plan, the phase trail and the state-specific data.

use chrono::{DateTime, Utc};
use std::path::PathBuf;

use crate::artifact::Artifact;
use crate::rollout::{RolloutTarget, RolloutResult};
use crate::types::TargetId;

use super::state::{Done, Idle, Located, Phase, RolledOut, RollingOut};

/// What a run deploys and where. Fixed before the run starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunPlan {
    pub target: RolloutTarget,
    pub artifact_path: PathBuf,
    /// Entry that must be present in the archive before rolling out.
    pub verify_entry: Option<String>,
}

/// A run in progress, parameterized by its current state.
#[derive(Debug)]
pub struct Run<S> {
    pub(crate) plan: RunPlan,
    pub(crate) phases: Vec<Phase>,
    pub(crate) started_at: DateTime<Utc>,
    pub(crate) state: S,
}

impl Run<Idle> {
    pub fn new(plan: RunPlan) -> Self {
        Run {
            plan,
            phases: vec![Phase::Idle],
            started_at: Utc::now(),
            state: Idle,
        }
    }
}

impl<S> Run<S> {
    pub fn target_id(&self) -> &TargetId {
        &self.plan.target.id
    }

    pub fn plan(&self) -> &RunPlan {
        &self.plan
    }

    /// Phases entered so far, in order.
    pub fn phases(&self) -> &[Phase] {
        &self.phases
    }
}

impl Run<Located> {
    pub fn artifact(&self) -> &Artifact {
        &self.state.artifact
    }
}

impl Run<RollingOut> {
    pub fn artifact(&self) -> &Artifact {
        &self.state.artifact
    }
}

impl Run<RolledOut> {
    pub fn artifact(&self) -> &Artifact {
        &self.state.artifact
    }

    pub fn result(&self) -> &RolloutResult {
        &self.state.result
    }
}

impl Run<Done> {
    pub fn result(&self) -> &RolloutResult {
        &self.state.result
    }
}
