// ABOUTME: Single HEAD probe against a service's index resource.
// ABOUTME: Builds the probe URL from validated host, port and context parts.

use bytes::Bytes;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

use super::HealthStatus;
use crate::http::{self, Endpoint};
use crate::types::{ContextPath, HostName};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProbeUrlError {
    #[error("invalid character in index resource: '{0}'")]
    InvalidChar(char),

    #[error("index resource cannot contain '..'")]
    ParentSegment,
}

/// `http://<host>:<port><context>/<index>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeUrl {
    endpoint: Endpoint,
    path: String,
}

impl ProbeUrl {
    pub fn new(
        host: HostName,
        port: u16,
        context: &ContextPath,
        index: &str,
    ) -> Result<Self, ProbeUrlError> {
        let index = index.trim_start_matches('/');
        if let Some(c) = index
            .chars()
            .find(|c| !c.is_ascii_alphanumeric() && !matches!(c, '.' | '_' | '-' | '~' | '/'))
        {
            return Err(ProbeUrlError::InvalidChar(c));
        }
        if index.split('/').any(|s| s == "..") {
            return Err(ProbeUrlError::ParentSegment);
        }

        Ok(Self {
            endpoint: Endpoint::new(host, port),
            path: format!("{}/{}", context.url_prefix(), index),
        })
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// Path component, always starting with '/'.
    pub fn path(&self) -> &str {
        &self.path
    }
}

impl fmt::Display for ProbeUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.endpoint.url(&self.path))
    }
}

/// Issue one header-only request. Never retries.
pub async fn probe_once(url: &ProbeUrl, timeout: Duration) -> HealthStatus {
    let req = match http::build_request(url.endpoint(), "HEAD", url.path(), &[], Bytes::new()) {
        Ok(req) => req,
        Err(e) => {
            tracing::debug!("could not build probe request for {}: {}", url, e);
            return HealthStatus::Unreachable;
        }
    };

    match http::send(url.endpoint(), req, timeout).await {
        Ok(resp) => HealthStatus::from_status_code(resp.status),
        Err(e) => {
            tracing::debug!("probe of {} failed: {}", url, e);
            HealthStatus::Unreachable
        }
    }
}
