// ABOUTME: Strategy sections of the config, tagged by `kind`.
// ABOUTME: Relative command paths resolve against the service root.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::ServerConfig;
use super::deserialize::deserialize_server;
use crate::rollout::{RemoteLayout, StrategyKind};
use crate::ssh::SessionConfig;
use crate::types::{ContextPath, RemotePath, RemotePathError};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum StrategyConfig {
    RemoteApi(RemoteApiConfig),
    LocalCopy(LocalCopyConfig),
    RemoteCopy(RemoteCopyConfig),
}

impl StrategyConfig {
    pub fn kind(&self) -> StrategyKind {
        match self {
            StrategyConfig::RemoteApi(_) => StrategyKind::RemoteApi,
            StrategyConfig::LocalCopy(_) => StrategyKind::LocalCopy,
            StrategyConfig::RemoteCopy(_) => StrategyKind::RemoteCopy,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RemoteApiConfig {
    #[serde(default = "default_manager_path")]
    pub manager_path: ContextPath,
    #[serde(default = "default_request_timeout", with = "humantime_serde")]
    pub timeout: Duration,
}

fn default_manager_path() -> ContextPath {
    ContextPath::new("/manager/text").unwrap_or_default()
}

fn default_request_timeout() -> Duration {
    Duration::from_secs(60)
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LocalCopyConfig {
    pub service_root: PathBuf,
    #[serde(default = "default_deploy_dir")]
    pub deploy_dir: String,
    pub stop_command: PathBuf,
    pub start_command: PathBuf,
    #[serde(default = "default_command_timeout", with = "humantime_serde")]
    pub command_timeout: Duration,
}

impl LocalCopyConfig {
    pub fn deploy_path(&self) -> PathBuf {
        self.service_root.join(&self.deploy_dir)
    }

    pub fn stop_path(&self) -> PathBuf {
        resolve_local(&self.service_root, &self.stop_command)
    }

    pub fn start_path(&self) -> PathBuf {
        resolve_local(&self.service_root, &self.start_command)
    }
}

fn resolve_local(root: &Path, command: &Path) -> PathBuf {
    if command.is_absolute() {
        command.to_path_buf()
    } else {
        root.join(command)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RemoteCopyConfig {
    #[serde(deserialize_with = "deserialize_server")]
    pub server: ServerConfig,
    #[serde(default)]
    pub key_path: Option<PathBuf>,
    /// Accept and record an unknown host key (default: false).
    #[serde(default)]
    pub trust_first_connection: bool,
    /// known_hosts file to check against (default: ~/.ssh/known_hosts).
    #[serde(default)]
    pub known_hosts: Option<PathBuf>,
    pub service_root: RemotePath,
    #[serde(default = "default_deploy_dir")]
    pub deploy_dir: String,
    #[serde(default = "default_staging_dir")]
    pub staging_dir: String,
    pub stop_command: String,
    pub start_command: String,
    #[serde(default = "default_command_timeout", with = "humantime_serde")]
    pub command_timeout: Duration,
}

impl RemoteCopyConfig {
    pub fn session_config(&self) -> SessionConfig {
        let mut session = self
            .server
            .ssh_session_config()
            .trust_on_first_use(self.trust_first_connection)
            .command_timeout(self.command_timeout);
        if let Some(key) = &self.key_path {
            session = session.key_path(key.clone());
        }
        if let Some(known_hosts) = &self.known_hosts {
            session = session.known_hosts_path(known_hosts.clone());
        }
        session
    }

    pub fn layout(&self) -> Result<RemoteLayout, RemotePathError> {
        Ok(RemoteLayout {
            deploy_dir: self.service_root.join(&self.deploy_dir)?,
            staging_dir: self.service_root.join(&self.staging_dir)?,
        })
    }

    pub fn stop_path(&self) -> Result<RemotePath, RemotePathError> {
        resolve_remote(&self.service_root, &self.stop_command)
    }

    pub fn start_path(&self) -> Result<RemotePath, RemotePathError> {
        resolve_remote(&self.service_root, &self.start_command)
    }
}

fn resolve_remote(root: &RemotePath, command: &str) -> Result<RemotePath, RemotePathError> {
    if command.starts_with('/') {
        RemotePath::new(command)
    } else {
        root.join(command)
    }
}

fn default_deploy_dir() -> String {
    "webapps".to_string()
}

fn default_staging_dir() -> String {
    "temp".to_string()
}

fn default_command_timeout() -> Duration {
    Duration::from_secs(120)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remote_api_defaults() {
        let strategy: StrategyConfig = serde_yaml::from_str("kind: remote-api").unwrap();
        let StrategyConfig::RemoteApi(api) = strategy else {
            panic!("expected remote-api");
        };
        assert_eq!(api.manager_path.as_str(), "/manager/text");
        assert_eq!(api.timeout, Duration::from_secs(60));
    }

    #[test]
    fn local_copy_resolves_commands_against_root() {
        let yaml = r#"
kind: local-copy
service_root: /opt/tomcat
stop_command: bin/shutdown.sh
start_command: /usr/local/bin/start-tomcat
command_timeout: 30s
"#;
        let strategy: StrategyConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(strategy.kind(), StrategyKind::LocalCopy);
        let StrategyConfig::LocalCopy(local) = strategy else {
            panic!("expected local-copy");
        };
        assert_eq!(local.deploy_path(), PathBuf::from("/opt/tomcat/webapps"));
        assert_eq!(local.stop_path(), PathBuf::from("/opt/tomcat/bin/shutdown.sh"));
        assert_eq!(
            local.start_path(),
            PathBuf::from("/usr/local/bin/start-tomcat")
        );
        assert_eq!(local.command_timeout, Duration::from_secs(30));
    }

    #[test]
    fn remote_copy_session_carries_key_and_known_hosts() {
        let yaml = r#"
kind: remote-copy
server: tomcat@app1.internal
key_path: /home/deploy/.ssh/id_ed25519
known_hosts: /etc/warship/known_hosts
trust_first_connection: true
command_timeout: 45s
service_root: /opt/tomcat
stop_command: bin/shutdown.sh
start_command: bin/startup.sh
"#;
        let strategy: StrategyConfig = serde_yaml::from_str(yaml).unwrap();
        let StrategyConfig::RemoteCopy(remote) = strategy else {
            panic!("expected remote-copy");
        };

        let session = remote.session_config();
        assert_eq!(session.user, "tomcat");
        assert_eq!(
            session.known_hosts_path,
            Some(PathBuf::from("/etc/warship/known_hosts"))
        );
        assert_eq!(
            session.key_path,
            Some(PathBuf::from("/home/deploy/.ssh/id_ed25519"))
        );
        assert!(session.trust_on_first_use);
        assert_eq!(session.command_timeout, Duration::from_secs(45));
    }

    #[test]
    fn remote_copy_layout_and_server_string() {
        let yaml = r#"
kind: remote-copy
server: tomcat@app1.internal:2222
service_root: /opt/tomcat
stop_command: bin/shutdown.sh
start_command: bin/startup.sh
"#;
        let strategy: StrategyConfig = serde_yaml::from_str(yaml).unwrap();
        let StrategyConfig::RemoteCopy(remote) = strategy else {
            panic!("expected remote-copy");
        };
        assert_eq!(remote.server.host, "app1.internal");
        assert_eq!(remote.server.port, 2222);
        assert!(!remote.trust_first_connection);
        assert!(remote.session_config().known_hosts_path.is_none());

        let layout = remote.layout().unwrap();
        assert_eq!(layout.deploy_dir.as_str(), "/opt/tomcat/webapps");
        assert_eq!(layout.staging_dir.as_str(), "/opt/tomcat/temp");
        assert_eq!(
            remote.stop_path().unwrap().as_str(),
            "/opt/tomcat/bin/shutdown.sh"
        );
    }

    #[test]
    fn remote_copy_rejects_unsafe_root() {
        let yaml = r#"
kind: remote-copy
server: app1
service_root: "/opt/tom'cat"
stop_command: bin/shutdown.sh
start_command: bin/startup.sh
"#;
        assert!(serde_yaml::from_str::<StrategyConfig>(yaml).is_err());
    }

    #[test]
    fn unknown_kind_is_rejected() {
        assert!(serde_yaml::from_str::<StrategyConfig>("kind: ftp").is_err());
    }
}
