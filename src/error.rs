// ABOUTME: Application-wide error types for warship.
// ABOUTME: Uses thiserror; lower layers convert in with From so commands can use `?`.

use std::path::PathBuf;
use thiserror::Error;

use crate::artifact::ArtifactError;
use crate::rollout::RolloutFailure;

#[derive(Debug, Error)]
pub enum Error {
    #[error("file already exists: {0}")]
    AlreadyExists(PathBuf),

    #[error("configuration file not found in {0}")]
    ConfigNotFound(PathBuf),

    #[error("unknown destination: {0}")]
    UnknownDestination(String),

    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Artifact(#[from] ArtifactError),

    #[error("rollout failed: {0}")]
    RolloutFailed(Box<RolloutFailure>),

    #[error("{url} is not healthy: {status}")]
    Unhealthy { url: String, status: String },

    #[error("hook '{hook}' failed: {reason}")]
    Hook { hook: String, reason: String },
}

pub type Result<T> = std::result::Result<T, Error>;
