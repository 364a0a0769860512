// ABOUTME: Integration tests for the remote-copy command sequence using a scripted shell.
// ABOUTME: Verifies staging, ordering, fatal stop failures and that the session is always closed.

mod support;

use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;
use tempfile::TempDir;
use warship::artifact::locate;
use warship::credentials::Credentials;
use warship::rollout::{
    FailureKind, RemoteCopyRollout, RemoteLayout, RemoteShell, RolloutResult, RolloutStrategy,
    RolloutTarget, ShellConnector, StrategyKind,
};
use warship::ssh::{self, CommandOutput};
use warship::types::{ContextPath, HostName, RemotePath, TargetId};

/// Shared log of everything the fake remote side was asked to do.
#[derive(Default)]
struct Script {
    log: Mutex<Vec<String>>,
    uploaded: Mutex<Vec<u8>>,
    /// Commands containing this text exit non-zero.
    failing: Mutex<Vec<String>>,
    /// Commands containing this text lose the channel.
    broken_channel: Mutex<Vec<String>>,
    fail_upload: bool,
    fail_connect: Option<fn() -> ssh::Error>,
}

struct FakeShell {
    script: Arc<Script>,
}

#[async_trait]
impl RemoteShell for FakeShell {
    async fn exec(&self, command: &str) -> ssh::Result<CommandOutput> {
        self.script.log.lock().push(format!("exec {}", command));
        if self
            .script
            .broken_channel
            .lock()
            .iter()
            .any(|needle| command.contains(needle.as_str()))
        {
            return Err(ssh::Error::ChannelClosed);
        }
        let fails = self
            .script
            .failing
            .lock()
            .iter()
            .any(|needle| command.contains(needle.as_str()));
        Ok(CommandOutput {
            exit_code: if fails { 1 } else { 0 },
            stdout: String::new(),
            stderr: if fails { "denied".to_string() } else { String::new() },
        })
    }

    async fn upload(&self, data: &[u8], dest: &RemotePath) -> ssh::Result<()> {
        self.script.log.lock().push(format!("upload {}", dest));
        if self.script.fail_upload {
            return Err(ssh::Error::UploadFailed("disk full".to_string()));
        }
        *self.script.uploaded.lock() = data.to_vec();
        Ok(())
    }
}

struct FakeConnector {
    script: Arc<Script>,
}

#[async_trait]
impl ShellConnector for FakeConnector {
    type Shell = FakeShell;

    async fn connect(&self, credentials: Option<&Credentials>) -> ssh::Result<FakeShell> {
        let key = credentials
            .and_then(Credentials::key_path)
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "agent".to_string());
        self.script.log.lock().push(format!("connect {}", key));
        if let Some(make_err) = self.script.fail_connect {
            return Err(make_err());
        }
        Ok(FakeShell {
            script: Arc::clone(&self.script),
        })
    }

    async fn disconnect(&self, _shell: FakeShell) -> ssh::Result<()> {
        self.script.log.lock().push("disconnect".to_string());
        Ok(())
    }
}

fn rollout(script: &Arc<Script>) -> RemoteCopyRollout<FakeConnector> {
    RemoteCopyRollout::new(
        FakeConnector {
            script: Arc::clone(script),
        },
        RemoteLayout {
            deploy_dir: RemotePath::new("/opt/tomcat/webapps").unwrap(),
            staging_dir: RemotePath::new("/opt/tomcat/temp").unwrap(),
        },
        RemotePath::new("/opt/tomcat/bin/shutdown.sh").unwrap(),
        RemotePath::new("/opt/tomcat/bin/startup.sh").unwrap(),
    )
}

fn target() -> RolloutTarget {
    RolloutTarget {
        id: TargetId::new("shop-prod").unwrap(),
        host: HostName::new("app1.example.com").unwrap(),
        port: 8080,
        context: ContextPath::new("/shop").unwrap(),
        strategy: StrategyKind::RemoteCopy,
    }
}

fn log(script: &Script) -> Vec<String> {
    script.log.lock().clone()
}

#[tokio::test]
async fn stages_upload_then_swaps_archive_in() {
    support::init_tracing();
    let dir = TempDir::new().unwrap();
    let artifact = locate(support::sample_war(dir.path(), "shop-2.0.war")).unwrap();
    let script = Arc::new(Script::default());
    let creds = Credentials::key("/home/deploy/.ssh/id_ed25519");

    let result = rollout(&script)
        .rollout(&artifact, &target(), Some(&creds))
        .await;

    assert_eq!(result, RolloutResult::Succeeded);
    assert_eq!(
        log(&script),
        vec![
            "connect /home/deploy/.ssh/id_ed25519",
            "upload /opt/tomcat/temp/shop.war.upload",
            "exec '/opt/tomcat/bin/shutdown.sh'",
            "exec rm -rf '/opt/tomcat/webapps/shop'",
            "exec rm -rf '/opt/tomcat/webapps/shop-2.0'",
            "exec rm -f '/opt/tomcat/webapps/shop.war'",
            "exec rm -f '/opt/tomcat/webapps/shop-2.0.war'",
            "exec mv -f '/opt/tomcat/temp/shop.war.upload' '/opt/tomcat/webapps/shop.war'",
            "exec '/opt/tomcat/bin/startup.sh'",
            "disconnect",
        ]
    );
    assert_eq!(
        *script.uploaded.lock(),
        std::fs::read(artifact.path()).unwrap()
    );
}

#[tokio::test]
async fn upload_failure_never_stops_the_service() {
    let dir = TempDir::new().unwrap();
    let artifact = locate(support::sample_war(dir.path(), "shop.war")).unwrap();
    let script = Arc::new(Script {
        fail_upload: true,
        ..Script::default()
    });

    let result = rollout(&script).rollout(&artifact, &target(), None).await;

    let failure = result.failure().expect("upload should fail");
    assert_eq!(failure.kind, FailureKind::TransportFailure);
    assert!(!failure.service_down);
    assert_eq!(
        log(&script),
        vec![
            "connect agent",
            "upload /opt/tomcat/temp/shop.war.upload",
            "disconnect",
        ]
    );
}

#[tokio::test]
async fn removal_failures_are_warnings() {
    let dir = TempDir::new().unwrap();
    let artifact = locate(support::sample_war(dir.path(), "shop.war")).unwrap();
    let script = Arc::new(Script::default());
    script.failing.lock().push("rm -rf".to_string());

    let result = rollout(&script).rollout(&artifact, &target(), None).await;

    match result {
        RolloutResult::SucceededWithWarning { reason } => {
            assert!(reason.contains("failed to remove"), "reason: {reason}");
        }
        other => panic!("expected warning, got {other:?}"),
    }
    assert!(log(&script).iter().any(|l| l.contains("startup.sh")));
}

#[tokio::test]
async fn failed_stop_aborts_before_touching_deploy_dir() {
    let dir = TempDir::new().unwrap();
    let artifact = locate(support::sample_war(dir.path(), "shop.war")).unwrap();
    let script = Arc::new(Script::default());
    script.failing.lock().push("shutdown.sh".to_string());

    let result = rollout(&script).rollout(&artifact, &target(), None).await;

    let failure = result.failure().expect("stop should fail");
    assert_eq!(failure.kind, FailureKind::PartialFailure);
    assert!(failure.service_down);
    assert!(failure.needs_intervention());
    assert!(failure.message.contains("shutdown.sh"), "message: {}", failure.message);
    assert_eq!(
        log(&script),
        vec![
            "connect agent",
            "upload /opt/tomcat/temp/shop.war.upload",
            "exec '/opt/tomcat/bin/shutdown.sh'",
            "disconnect",
        ]
    );
}

#[tokio::test]
async fn stop_transport_error_is_fatal() {
    let dir = TempDir::new().unwrap();
    let artifact = locate(support::sample_war(dir.path(), "shop.war")).unwrap();
    let script = Arc::new(Script::default());
    script.broken_channel.lock().push("shutdown.sh".to_string());

    let result = rollout(&script).rollout(&artifact, &target(), None).await;

    let failure = result.failure().expect("stop should fail");
    assert_eq!(failure.kind, FailureKind::TransportFailure);
    assert!(failure.service_down);
    let log = log(&script);
    assert!(!log.iter().any(|l| l.contains("rm -") || l.contains("mv -f")));
    assert_eq!(log.last().map(String::as_str), Some("disconnect"));
}

#[tokio::test]
async fn failed_move_leaves_service_down_without_start() {
    let dir = TempDir::new().unwrap();
    let artifact = locate(support::sample_war(dir.path(), "shop.war")).unwrap();
    let script = Arc::new(Script::default());
    script.failing.lock().push("mv -f".to_string());

    let result = rollout(&script).rollout(&artifact, &target(), None).await;

    let failure = result.failure().expect("move should fail");
    assert_eq!(failure.kind, FailureKind::TransportFailure);
    assert!(failure.service_down);
    let log = log(&script);
    assert!(!log.iter().any(|l| l.contains("startup.sh")));
    assert_eq!(log.last().map(String::as_str), Some("disconnect"));
}

#[tokio::test]
async fn start_failure_is_partial_and_still_disconnects() {
    let dir = TempDir::new().unwrap();
    let artifact = locate(support::sample_war(dir.path(), "shop.war")).unwrap();
    let script = Arc::new(Script::default());
    script.failing.lock().push("startup.sh".to_string());

    let result = rollout(&script).rollout(&artifact, &target(), None).await;

    let failure = result.failure().expect("start should fail");
    assert_eq!(failure.kind, FailureKind::PartialFailure);
    assert!(failure.service_down);
    assert_eq!(log(&script).last().map(String::as_str), Some("disconnect"));
}

#[tokio::test]
async fn connect_errors_are_classified() {
    let dir = TempDir::new().unwrap();
    let artifact = locate(support::sample_war(dir.path(), "shop.war")).unwrap();

    let script = Arc::new(Script {
        fail_connect: Some(|| ssh::Error::AuthenticationFailed),
        ..Script::default()
    });
    let result = rollout(&script).rollout(&artifact, &target(), None).await;
    assert_eq!(result.failure().map(|f| f.kind), Some(FailureKind::AuthFailure));

    let script = Arc::new(Script {
        fail_connect: Some(|| ssh::Error::Connection("refused".to_string())),
        ..Script::default()
    });
    let result = rollout(&script).rollout(&artifact, &target(), None).await;
    assert_eq!(
        result.failure().map(|f| f.kind),
        Some(FailureKind::TransportFailure)
    );
    assert_eq!(log(&script), vec!["connect agent"]);
}
