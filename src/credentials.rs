// ABOUTME: Opaque credential bundle borrowed for the duration of one rollout.
// ABOUTME: Never serialized; Debug output redacts secrets.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use std::fmt;
use std::path::PathBuf;

/// Credentials for the manager API (basic) or an SSH transfer (key).
#[derive(Clone, PartialEq, Eq)]
pub enum Credentials {
    Basic { username: String, password: String },
    Key { path: PathBuf },
}

impl Credentials {
    pub fn basic(username: impl Into<String>, password: impl Into<String>) -> Self {
        Credentials::Basic {
            username: username.into(),
            password: password.into(),
        }
    }

    pub fn key(path: impl Into<PathBuf>) -> Self {
        Credentials::Key { path: path.into() }
    }

    /// `Authorization` header value, for basic credentials only.
    pub fn basic_auth_header(&self) -> Option<String> {
        match self {
            Credentials::Basic { username, password } => {
                let token = STANDARD.encode(format!("{}:{}", username, password));
                Some(format!("Basic {}", token))
            }
            Credentials::Key { .. } => None,
        }
    }

    /// Key file path, for key credentials only.
    pub fn key_path(&self) -> Option<&PathBuf> {
        match self {
            Credentials::Key { path } => Some(path),
            Credentials::Basic { .. } => None,
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Credentials::Basic { username, .. } => f
                .debug_struct("Basic")
                .field("username", username)
                .field("password", &"<redacted>")
                .finish(),
            Credentials::Key { path } => f.debug_struct("Key").field("path", path).finish(),
        }
    }
}
