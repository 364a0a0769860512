// ABOUTME: Per-target rollout locks, in-process or backed by lock files.
// ABOUTME: File locks use atomic create-new with holder info stored as JSON.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::sync::OwnedMutexGuard;

use crate::types::TargetId;

use super::LockError;

/// Lock file directory under `$HOME` (XDG state dir).
const STATE_DIR: &str = ".local/state/warship";

/// Locks older than this are broken automatically.
pub const DEFAULT_STALE_AFTER: Duration = Duration::from_secs(60 * 60);

/// A break marker older than this belongs to a process that died mid-break.
const ABANDONED_BREAK_AFTER: Duration = Duration::from_secs(30);

/// Information about who holds a target lock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockInfo {
    /// Hostname of the machine that holds the lock.
    pub holder: String,
    /// Process ID of the lock holder.
    pub pid: u32,
    /// When the lock was acquired.
    pub started_at: DateTime<Utc>,
    /// Target being rolled out.
    pub target: String,
}

impl LockInfo {
    /// Lock info for the current process.
    pub fn new(target: &TargetId) -> Self {
        Self {
            holder: gethostname::gethostname().to_string_lossy().into_owned(),
            pid: std::process::id(),
            started_at: Utc::now(),
            target: target.to_string(),
        }
    }

    pub fn is_stale(&self, stale_after: Duration) -> bool {
        let age = Utc::now() - self.started_at;
        age.to_std().map(|age| age >= stale_after).unwrap_or(false)
    }

    /// `{dir}/{target}.lock`
    pub fn lock_path(dir: &Path, target: &TargetId) -> PathBuf {
        dir.join(format!("{}.lock", target))
    }

    /// Default lock directory, `$HOME/.local/state/warship`.
    pub fn default_dir() -> Option<PathBuf> {
        std::env::var_os("HOME").map(|home| PathBuf::from(home).join(STATE_DIR))
    }
}

/// A held lock. Released when dropped.
#[derive(Debug)]
pub enum LockGuard {
    Memory(OwnedMutexGuard<()>),
    File(FileLockGuard),
}

/// Removes its lock file on drop.
#[derive(Debug)]
pub struct FileLockGuard {
    path: PathBuf,
}

impl FileLockGuard {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for FileLockGuard {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_file(&self.path)
            && e.kind() != ErrorKind::NotFound
        {
            tracing::warn!("failed to remove lock file {}: {}", self.path.display(), e);
        }
    }
}

/// Serializes rollouts per target.
#[async_trait]
pub trait TargetLocks: Send + Sync {
    async fn acquire(&self, target: &TargetId) -> Result<LockGuard, LockError>;
}

/// Async mutex per target. A second caller waits for the first to finish.
#[derive(Debug, Default)]
pub struct InProcessLocks {
    locks: Mutex<HashMap<TargetId, Arc<tokio::sync::Mutex<()>>>>,
}

impl InProcessLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of targets with a live lock entry.
    pub fn tracked(&self) -> usize {
        self.locks.lock().len()
    }
}

#[async_trait]
impl TargetLocks for InProcessLocks {
    async fn acquire(&self, target: &TargetId) -> Result<LockGuard, LockError> {
        let lock = {
            let mut locks = self.locks.lock();
            // Entries nobody holds or waits on are dropped.
            locks.retain(|_, lock| Arc::strong_count(lock) > 1);
            Arc::clone(locks.entry(target.clone()).or_default())
        };
        Ok(LockGuard::Memory(lock.lock_owned().await))
    }
}

/// Lock files shared between processes. A held lock fails fast.
#[derive(Debug, Clone)]
pub struct FileLocks {
    dir: PathBuf,
    stale_after: Duration,
    force: bool,
}

impl FileLocks {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            stale_after: DEFAULT_STALE_AFTER,
            force: false,
        }
    }

    pub fn stale_after(mut self, stale_after: Duration) -> Self {
        self.stale_after = stale_after;
        self
    }

    /// Break any existing lock, however fresh.
    pub fn force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Create the lock file if absent. `Ok(false)` when it already exists.
    async fn try_create(&self, path: &Path, json: &[u8]) -> Result<bool, LockError> {
        let io_err = |source| LockError::Io {
            path: path.to_path_buf(),
            source,
        };

        let mut file = match tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(path)
            .await
        {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => return Ok(false),
            Err(e) => return Err(io_err(e)),
        };

        file.write_all(json).await.map_err(io_err)?;
        file.flush().await.map_err(io_err)?;
        Ok(true)
    }

    /// `Ok(())` when an existing lock may be broken (stale, forced, unreadable or gone).
    async fn check_breakable(&self, path: &Path) -> Result<(), LockError> {
        let contents = match tokio::fs::read_to_string(path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(()),
            Err(e) => {
                tracing::warn!("lock file {} unreadable ({}), breaking lock", path.display(), e);
                return Ok(());
            }
        };

        match serde_json::from_str::<LockInfo>(&contents) {
            Ok(existing) if self.force => {
                tracing::warn!(
                    "breaking lock held by {} (pid {}) since {}",
                    existing.holder,
                    existing.pid,
                    existing.started_at
                );
                Ok(())
            }
            Ok(existing) if existing.is_stale(self.stale_after) => {
                tracing::warn!(
                    "auto-breaking stale lock held by {} (pid {}) since {}",
                    existing.holder,
                    existing.pid,
                    existing.started_at
                );
                Ok(())
            }
            Ok(existing) => Err(LockError::Held(existing)),
            Err(_) => {
                tracing::warn!("lock info in {} corrupted, breaking lock", path.display());
                Ok(())
            }
        }
    }

    /// Replace an existing lock. Only the process holding `{lock}.break` may
    /// inspect and remove the lock file, so two breakers never both win.
    async fn break_lock(
        &self,
        path: PathBuf,
        target: &TargetId,
        json: &[u8],
    ) -> Result<LockGuard, LockError> {
        let marker = break_marker_path(&path);
        if !self.try_create(&marker, json).await? {
            clear_abandoned_marker(&marker).await;
            return Err(LockError::Contended(target.to_string()));
        }
        let _marker = FileLockGuard { path: marker };

        self.check_breakable(&path).await?;

        tracing::debug!("removing stale/forced lock at {}", path.display());
        match tokio::fs::remove_file(&path).await {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(source) => return Err(LockError::Io { path, source }),
        }

        if self.try_create(&path, json).await? {
            Ok(LockGuard::File(FileLockGuard { path }))
        } else {
            Err(LockError::Contended(target.to_string()))
        }
    }
}

/// `{dir}/{target}.lock.break`
fn break_marker_path(lock: &Path) -> PathBuf {
    let mut name = lock.as_os_str().to_owned();
    name.push(".break");
    PathBuf::from(name)
}

/// Remove a break marker left behind by a process that died mid-break.
async fn clear_abandoned_marker(marker: &Path) {
    let age = match tokio::fs::metadata(marker).await.and_then(|m| m.modified()) {
        Ok(modified) => modified.elapsed().unwrap_or_default(),
        Err(_) => return,
    };
    if age < ABANDONED_BREAK_AFTER {
        return;
    }
    tracing::warn!("removing abandoned break marker {}", marker.display());
    if let Err(e) = tokio::fs::remove_file(marker).await
        && e.kind() != ErrorKind::NotFound
    {
        tracing::warn!("failed to remove {}: {}", marker.display(), e);
    }
}

#[async_trait]
impl TargetLocks for FileLocks {
    async fn acquire(&self, target: &TargetId) -> Result<LockGuard, LockError> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|source| LockError::Io {
                path: self.dir.clone(),
                source,
            })?;

        let path = LockInfo::lock_path(&self.dir, target);
        let json = serde_json::to_vec(&LockInfo::new(target))?;

        if self.try_create(&path, &json).await? {
            return Ok(LockGuard::File(FileLockGuard { path }));
        }

        self.break_lock(path, target, &json).await
    }
}
