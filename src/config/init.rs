// ABOUTME: Config scaffolding for new projects.
// ABOUTME: Writes a commented warship.yml template.

use std::path::Path;

use crate::error::{Error, Result};
use crate::types::TargetId;

use super::CONFIG_FILENAME;

const DEFAULT_TARGET: &str = "my-app";
const DEFAULT_ARTIFACT: &str = "target/my-app.war";

pub fn init_config(
    dir: &Path,
    target: Option<&str>,
    artifact: Option<&str>,
    force: bool,
) -> Result<()> {
    let config_path = dir.join(CONFIG_FILENAME);

    if config_path.exists() && !force {
        return Err(Error::AlreadyExists(config_path));
    }

    let target = match target {
        Some(t) => TargetId::new(t).map_err(|e| Error::InvalidConfig(e.to_string()))?,
        None => TargetId::new(DEFAULT_TARGET).map_err(|e| Error::InvalidConfig(e.to_string()))?,
    };
    let artifact = artifact.unwrap_or(DEFAULT_ARTIFACT);
    if artifact.trim().is_empty() {
        return Err(Error::InvalidConfig("artifact path cannot be empty".to_string()));
    }

    std::fs::write(&config_path, generate_template_yaml(&target, artifact))?;

    Ok(())
}

pub fn generate_template_yaml(target: &TargetId, artifact: &str) -> String {
    format!(
        r#"target: {target}
artifact:
  path: {artifact}
  # Fail before rolling out if this entry is missing from the archive
  # verify_entry: WEB-INF/web.xml
host: localhost
port: 8080
context: /
strategy:
  kind: remote-api
  manager_path: /manager/text
  timeout: 60s
  # kind: local-copy
  # service_root: /opt/tomcat
  # stop_command: bin/shutdown.sh
  # start_command: bin/startup.sh
  #
  # kind: remote-copy
  # server: deploy@app1.example.com
  # service_root: /opt/tomcat
  # stop_command: bin/shutdown.sh
  # start_command: bin/startup.sh
  # Accept and record an unknown host key (default: false)
  # trust_first_connection: true
  # known_hosts: /etc/warship/known_hosts
credentials:
  basic:
    username:
      env: WARSHIP_MANAGER_USER
    password:
      env: WARSHIP_MANAGER_PASSWORD
health:
  index: index.html
  timeout: 5s
  attempts: 5
  backoff:
    fixed: 2s
# destinations:
#   staging:
#     host: staging.example.com
"#
    )
}
