// ABOUTME: Validated host name or IP literal used to build URLs.
// ABOUTME: Rejects anything that could smuggle a path, userinfo or query into a request.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum HostNameError {
    #[error("host name cannot be empty")]
    Empty,

    #[error("host name exceeds maximum length of 253 characters")]
    TooLong,

    #[error("invalid character in host name: '{0}'")]
    InvalidChar(char),

    #[error("malformed IPv6 literal: {0}")]
    BadIpv6(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HostName(String);

impl HostName {
    pub fn new(value: &str) -> Result<Self, HostNameError> {
        let value = value.trim();
        if value.is_empty() {
            return Err(HostNameError::Empty);
        }
        if value.len() > 253 {
            return Err(HostNameError::TooLong);
        }

        // Bracketed IPv6 literal, e.g. [::1]
        if let Some(inner) = value.strip_prefix('[') {
            let inner = inner
                .strip_suffix(']')
                .ok_or_else(|| HostNameError::BadIpv6(value.to_string()))?;
            if inner.is_empty() || !inner.chars().all(|c| c.is_ascii_hexdigit() || c == ':') {
                return Err(HostNameError::BadIpv6(value.to_string()));
            }
            return Ok(Self(value.to_string()));
        }

        if let Some(c) = value
            .chars()
            .find(|c| !c.is_ascii_alphanumeric() && *c != '.' && *c != '-')
        {
            return Err(HostNameError::InvalidChar(c));
        }

        Ok(Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Host as used for socket connection (brackets stripped).
    pub fn connect_host(&self) -> &str {
        self.0
            .strip_prefix('[')
            .and_then(|s| s.strip_suffix(']'))
            .unwrap_or(&self.0)
    }
}

impl fmt::Display for HostName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for HostName {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for HostName {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        HostName::new(&s).map_err(serde::de::Error::custom)
    }
}
