// ABOUTME: Typed client for the servlet container's text manager API.
// ABOUTME: Builds undeploy/deploy requests from validated parts and classifies replies.

use bytes::Bytes;
use std::time::Duration;
use thiserror::Error;

use super::FailureKind;
use crate::credentials::Credentials;
use crate::http::{self, Endpoint, HttpError, HttpResponse};
use crate::types::ContextPath;

#[derive(Debug, Error)]
pub enum ManagerError {
    #[error("no basic credentials for the manager API")]
    MissingCredentials,

    #[error(transparent)]
    Transport(#[from] HttpError),

    #[error("manager refused credentials (HTTP {0})")]
    Unauthorized(u16),

    #[error("manager responded with HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("manager reported failure: {0}")]
    Rejected(String),
}

impl ManagerError {
    pub fn kind(&self) -> FailureKind {
        match self {
            ManagerError::MissingCredentials | ManagerError::Unauthorized(_) => {
                FailureKind::AuthFailure
            }
            ManagerError::Transport(_) | ManagerError::Status { .. } => {
                FailureKind::TransportFailure
            }
            ManagerError::Rejected(_) => FailureKind::Rejected,
        }
    }
}

/// Successful manager reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManagerReply {
    pub status: u16,
    /// First line of the body, e.g. `OK - Deployed application at context path [/shop]`.
    pub message: String,
}

/// Client for `{base}/undeploy` and `{base}/deploy`.
#[derive(Debug, Clone)]
pub struct ManagerClient {
    endpoint: Endpoint,
    base_path: ContextPath,
    timeout: Duration,
}

impl ManagerClient {
    /// `base_path` is the text API root, usually `/manager/text`.
    pub fn new(endpoint: Endpoint, base_path: ContextPath, timeout: Duration) -> Self {
        Self {
            endpoint,
            base_path,
            timeout,
        }
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// `GET {base}/undeploy?path=<context>`
    pub fn undeploy_path(&self, context: &ContextPath) -> String {
        format!(
            "{}/undeploy?path={}",
            self.base_path.url_prefix(),
            urlencoding::encode(context.as_str())
        )
    }

    /// `PUT {base}/deploy?path=<context>&update=true`
    pub fn deploy_path(&self, context: &ContextPath) -> String {
        format!(
            "{}/deploy?path={}&update=true",
            self.base_path.url_prefix(),
            urlencoding::encode(context.as_str())
        )
    }

    pub async fn undeploy(
        &self,
        context: &ContextPath,
        credentials: Option<&Credentials>,
    ) -> Result<ManagerReply, ManagerError> {
        let auth = auth_header(credentials)?;
        let req = http::build_request(
            &self.endpoint,
            "GET",
            &self.undeploy_path(context),
            &[("Authorization", auth)],
            Bytes::new(),
        )?;
        let resp = http::send(&self.endpoint, req, self.timeout).await?;
        classify(resp)
    }

    pub async fn deploy(
        &self,
        context: &ContextPath,
        archive: Bytes,
        credentials: Option<&Credentials>,
    ) -> Result<ManagerReply, ManagerError> {
        let auth = auth_header(credentials)?;
        let req = http::build_request(
            &self.endpoint,
            "PUT",
            &self.deploy_path(context),
            &[
                ("Authorization", auth),
                ("Content-Type", "application/octet-stream".to_string()),
            ],
            archive,
        )?;
        let resp = http::send(&self.endpoint, req, self.timeout).await?;
        classify(resp)
    }
}

fn auth_header(credentials: Option<&Credentials>) -> Result<String, ManagerError> {
    credentials
        .and_then(Credentials::basic_auth_header)
        .ok_or(ManagerError::MissingCredentials)
}

/// 401/403 are auth failures, other non-2xx are transport failures, and a 2xx
/// body starting with `FAIL` is a rejection (the text protocol reports errors
/// with status 200).
fn classify(resp: HttpResponse) -> Result<ManagerReply, ManagerError> {
    let body = resp.body_text();
    let message = body.lines().next().unwrap_or_default().trim().to_string();

    match resp.status {
        401 | 403 => Err(ManagerError::Unauthorized(resp.status)),
        _ if !resp.is_success() => Err(ManagerError::Status {
            status: resp.status,
            body: message,
        }),
        _ if message.starts_with("FAIL") => Err(ManagerError::Rejected(message)),
        status => Ok(ManagerReply { status, message }),
    }
}
