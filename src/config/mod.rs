// ABOUTME: Configuration types and parsing for warship.yml.
// ABOUTME: Handles YAML parsing, env var interpolation, and destination merging.

mod credentials;
mod deserialize;
mod env_value;
mod health;
mod init;
mod server;
mod strategy;

pub use credentials::CredentialsConfig;
pub use env_value::EnvValue;
pub use health::HealthConfig;
pub use init::{generate_template_yaml, init_config};
pub use server::ServerConfig;
pub use strategy::{LocalCopyConfig, RemoteApiConfig, RemoteCopyConfig, StrategyConfig};

use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::credentials::Credentials;
use crate::deploy::{DEFAULT_STALE_AFTER, FileLocks, LockInfo, RunPlan};
use crate::error::{Error, Result};
use crate::health::ProbeUrl;
use crate::rollout::RolloutTarget;
use crate::types::{ContextPath, HostName, TargetId};

pub const CONFIG_FILENAME: &str = "warship.yml";
pub const CONFIG_FILENAME_ALT: &str = "warship.yaml";
pub const CONFIG_FILENAME_DIR: &str = ".warship/config.yml";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Config {
    pub target: TargetId,

    pub artifact: ArtifactConfig,

    pub host: HostName,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default)]
    pub context: ContextPath,

    pub strategy: StrategyConfig,

    #[serde(default)]
    pub credentials: Option<CredentialsConfig>,

    #[serde(default)]
    pub health: HealthConfig,

    /// Probe the service even when the rollout itself failed.
    #[serde(default)]
    pub verify_after_failure: bool,

    #[serde(default)]
    pub lock: LockConfig,

    #[serde(default)]
    pub destinations: HashMap<String, Destination>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ArtifactConfig {
    pub path: PathBuf,
    /// Entry that must exist inside the archive, e.g. `WEB-INF/web.xml`.
    #[serde(default)]
    pub verify_entry: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LockConfig {
    /// Lock file directory. Defaults to `$HOME/.local/state/warship`.
    #[serde(default)]
    pub dir: Option<PathBuf>,
    #[serde(default = "default_stale_after", with = "humantime_serde")]
    pub stale_after: Duration,
    #[serde(default)]
    pub force: bool,
}

impl Default for LockConfig {
    fn default() -> Self {
        Self {
            dir: None,
            stale_after: default_stale_after(),
            force: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Default)]
pub struct Destination {
    #[serde(default)]
    pub host: Option<HostName>,

    #[serde(default)]
    pub port: Option<u16>,

    #[serde(default)]
    pub context: Option<ContextPath>,

    #[serde(default)]
    pub strategy: Option<StrategyConfig>,

    #[serde(default)]
    pub credentials: Option<CredentialsConfig>,

    #[serde(default)]
    pub health: Option<HealthConfig>,
}

fn default_port() -> u16 {
    8080
}

fn default_stale_after() -> Duration {
    DEFAULT_STALE_AFTER
}

impl Config {
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).map_err(Error::from)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    pub fn discover(dir: &Path) -> Result<Self> {
        let candidates = [
            dir.join(CONFIG_FILENAME),
            dir.join(CONFIG_FILENAME_ALT),
            dir.join(CONFIG_FILENAME_DIR),
        ];

        for path in &candidates {
            if path.exists() {
                return Self::load(path);
            }
        }

        Err(Error::ConfigNotFound(dir.to_path_buf()))
    }

    pub fn for_destination(&self, name: &str) -> Result<Config> {
        let dest = self
            .destinations
            .get(name)
            .ok_or_else(|| Error::UnknownDestination(name.to_string()))?;

        let mut merged = self.clone();

        if let Some(host) = &dest.host {
            merged.host = host.clone();
        }
        if let Some(port) = dest.port {
            merged.port = port;
        }
        if let Some(context) = &dest.context {
            merged.context = context.clone();
        }
        // Strategy sections are replaced whole, never merged field by field.
        if let Some(strategy) = &dest.strategy {
            merged.strategy = strategy.clone();
        }
        if dest.credentials.is_some() {
            merged.credentials = dest.credentials.clone();
        }
        if let Some(health) = &dest.health {
            merged.health = health.clone();
        }

        Ok(merged)
    }

    pub fn rollout_target(&self) -> RolloutTarget {
        RolloutTarget {
            id: self.target.clone(),
            host: self.host.clone(),
            port: self.port,
            context: self.context.clone(),
            strategy: self.strategy.kind(),
        }
    }

    pub fn run_plan(&self) -> RunPlan {
        RunPlan {
            target: self.rollout_target(),
            artifact_path: self.artifact.path.clone(),
            verify_entry: self.artifact.verify_entry.clone(),
        }
    }

    pub fn probe_url(&self) -> Result<ProbeUrl> {
        ProbeUrl::new(self.host.clone(), self.port, &self.context, &self.health.index)
            .map_err(|e| Error::InvalidConfig(format!("health.index: {}", e)))
    }

    /// Resolve configured credentials. Call right before a run.
    pub fn resolve_credentials(&self) -> Result<Option<Credentials>> {
        self.credentials
            .as_ref()
            .map(CredentialsConfig::resolve)
            .transpose()
    }

    /// File-backed locks, with `force` from the config or the command line.
    pub fn file_locks(&self, force: bool) -> Result<FileLocks> {
        let dir = match &self.lock.dir {
            Some(dir) => dir.clone(),
            None => LockInfo::default_dir().ok_or_else(|| {
                Error::InvalidConfig("lock.dir is not set and HOME is unavailable".to_string())
            })?,
        };
        Ok(FileLocks::new(dir)
            .stale_after(self.lock.stale_after)
            .force(force || self.lock.force))
    }
}
