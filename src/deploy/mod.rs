// ABOUTME: Run orchestration using the type state pattern.
// ABOUTME: Locate, lock, roll out and verify, ending in a structured RunReport.

mod deployment;
mod error;
mod lock;
mod orchestrator;
mod report;
mod state;
mod strategy;
mod transitions;

pub use deployment::{Run, RunPlan};
pub use error::LockError;
pub use lock::{
    DEFAULT_STALE_AFTER, FileLockGuard, FileLocks, InProcessLocks, LockGuard, LockInfo,
    TargetLocks,
};
pub use orchestrator::Orchestrator;
pub use report::RunReport;
pub use state::{Done, Idle, Located, Phase, RolledOut, RollingOut};
pub use strategy::build_strategy;
pub use transitions::TransitionResult;
