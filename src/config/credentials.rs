// ABOUTME: Credential references in the config, resolved just before a run.
// ABOUTME: Secrets usually come from environment variables rather than the file itself.

use serde::Deserialize;
use std::path::PathBuf;

use super::EnvValue;
use crate::credentials::Credentials;
use crate::error::Result;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CredentialsConfig {
    Basic {
        username: EnvValue,
        password: EnvValue,
    },
    Key {
        path: PathBuf,
    },
}

impl CredentialsConfig {
    pub fn resolve(&self) -> Result<Credentials> {
        match self {
            CredentialsConfig::Basic { username, password } => {
                Ok(Credentials::basic(username.resolve()?, password.resolve()?))
            }
            CredentialsConfig::Key { path } => Ok(Credentials::key(path.clone())),
        }
    }
}
