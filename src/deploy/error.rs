// ABOUTME: Error types for the per-target rollout lock.
// ABOUTME: A held lock reports who holds it so the operator can decide whether to force it.

use std::path::PathBuf;

use crate::rollout::FailureKind;

use super::LockInfo;

/// Errors from acquiring a per-target lock.
#[derive(Debug, thiserror::Error)]
pub enum LockError {
    /// Another run holds the lock and it is neither stale nor forced.
    #[error(
        "target '{}' is locked by {} (pid {}) since {}",
        .0.target, .0.holder, .0.pid, .0.started_at
    )]
    Held(LockInfo),

    /// Another run took the lock between breaking it and retrying.
    #[error("lock for target '{0}' was taken while breaking it")]
    Contended(String),

    #[error("lock file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to serialize lock info: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl LockError {
    /// Failure category for reporting.
    pub fn kind(&self) -> FailureKind {
        FailureKind::LockUnavailable
    }

    /// Holder details when the lock is held by someone else.
    pub fn holder(&self) -> Option<&LockInfo> {
        match self {
            LockError::Held(info) => Some(info),
            _ => None,
        }
    }
}
