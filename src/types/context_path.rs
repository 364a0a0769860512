// ABOUTME: Validated servlet context path such as "/" or "/shop/api".
// ABOUTME: Maps a context to the deploy name the container expects on disk.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ContextPathError {
    #[error("context path must start with '/': {0}")]
    NotAbsolute(String),

    #[error("context path contains an empty segment: {0}")]
    EmptySegment(String),

    #[error("context path cannot contain '.' or '..' segments: {0}")]
    DotSegment(String),

    #[error("invalid character in context path: '{0}'")]
    InvalidChar(char),
}

/// A context path under which a deployed artifact is reachable.
///
/// The root context is stored as `/`. Every other context is stored without a
/// trailing slash.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContextPath(String);

impl ContextPath {
    pub fn root() -> Self {
        Self("/".to_string())
    }

    pub fn new(value: &str) -> Result<Self, ContextPathError> {
        let value = value.trim();
        if value.is_empty() || value == "/" {
            return Ok(Self::root());
        }

        if !value.starts_with('/') {
            return Err(ContextPathError::NotAbsolute(value.to_string()));
        }

        let trimmed = value.trim_end_matches('/');
        if trimmed.is_empty() {
            return Ok(Self::root());
        }
        for segment in trimmed[1..].split('/') {
            if segment.is_empty() {
                return Err(ContextPathError::EmptySegment(value.to_string()));
            }
            if segment == "." || segment == ".." {
                return Err(ContextPathError::DotSegment(value.to_string()));
            }
            if let Some(c) = segment
                .chars()
                .find(|c| !c.is_ascii_alphanumeric() && !matches!(c, '.' | '_' | '-'))
            {
                return Err(ContextPathError::InvalidChar(c));
            }
        }

        Ok(Self(trimmed.to_string()))
    }

    pub fn is_root(&self) -> bool {
        self.0 == "/"
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Prefix to put in front of a resource when building a URL.
    /// Empty for the root context.
    pub fn url_prefix(&self) -> &str {
        if self.is_root() { "" } else { &self.0 }
    }

    /// Name of the archive (minus extension) and exploded directory that the
    /// container maps to this context: `ROOT` for `/`, `shop#api` for `/shop/api`.
    pub fn deploy_name(&self) -> String {
        if self.is_root() {
            "ROOT".to_string()
        } else {
            self.0[1..].replace('/', "#")
        }
    }
}

impl Default for ContextPath {
    fn default() -> Self {
        Self::root()
    }
}

impl fmt::Display for ContextPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for ContextPath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ContextPath {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        ContextPath::new(&s).map_err(serde::de::Error::custom)
    }
}
