// ABOUTME: Absolute path on a remote host, safe to embed in a shell command.
// ABOUTME: Validation happens once at construction; quoting is then unconditional.

use serde::{Deserialize, Deserializer};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RemotePathError {
    #[error("remote path must be absolute: {0}")]
    NotAbsolute(String),

    #[error("remote path cannot contain '..' segments: {0}")]
    ParentSegment(String),

    #[error("invalid character in remote path: {0:?}")]
    InvalidChar(char),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RemotePath(String);

impl RemotePath {
    pub fn new(value: &str) -> Result<Self, RemotePathError> {
        if !value.starts_with('/') {
            return Err(RemotePathError::NotAbsolute(value.to_string()));
        }
        Self::check_chars(value)?;
        if value.split('/').any(|s| s == "..") {
            return Err(RemotePathError::ParentSegment(value.to_string()));
        }
        let trimmed = if value.len() > 1 {
            value.trim_end_matches('/')
        } else {
            value
        };
        Ok(Self(trimmed.to_string()))
    }

    fn check_chars(value: &str) -> Result<(), RemotePathError> {
        match value.chars().find(|c| c.is_control() || *c == '\'') {
            Some(c) => Err(RemotePathError::InvalidChar(c)),
            None => Ok(()),
        }
    }

    /// Append a single relative component (may itself contain '/').
    pub fn join(&self, component: &str) -> Result<Self, RemotePathError> {
        let component = component.trim_matches('/');
        if component.is_empty() {
            return Ok(self.clone());
        }
        let joined = if self.0 == "/" {
            format!("/{}", component)
        } else {
            format!("{}/{}", self.0, component)
        };
        Self::new(&joined)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Single-quoted form for a POSIX shell.
    pub fn quoted(&self) -> String {
        format!("'{}'", self.0)
    }
}

impl fmt::Display for RemotePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl<'de> Deserialize<'de> for RemotePath {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        RemotePath::new(&s).map_err(serde::de::Error::custom)
    }
}
