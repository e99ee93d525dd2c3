use super::*;
use crate::session::SessionStore;
use crate::shell::Shell;
use crate::shell::ShellType;
use pretty_assertions::assert_eq;

fn registry(cwd: &std::path::Path) -> BackgroundProcessRegistry {
    let runner = CommandRunner::new(cwd, SessionStore::new())
        .with_shell(Shell::new(ShellType::Sh, "/bin/sh"));
    BackgroundProcessRegistry::new(runner)
}

/// Polls until some stdout has arrived, accumulating it.
async fn read_until(registry: &BackgroundProcessRegistry, id: &str, needle: &str) -> String {
    let mut seen = String::new();
    for _ in 0..100 {
        let snapshot = registry.consume_output(id).await.expect("consume");
        seen.push_str(&snapshot.stdout);
        if seen.contains(needle) {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    seen
}

#[cfg(unix)]
#[tokio::test]
async fn test_exit_is_recorded() {
    let dir = tempfile::tempdir().expect("tempdir");
    let registry = registry(dir.path());
    let id = registry
        .start(CommandSpec::new("echo done; exit 4"))
        .await
        .expect("start");
    assert!(id.starts_with("bg-"));

    let status = registry.wait(&id, Duration::from_secs(5)).await.expect("wait");
    assert_eq!(status, ProcessStatus::Exited);

    let snapshot = registry.consume_output(&id).await.expect("consume");
    assert_eq!(snapshot.stdout, "done\n");
    assert_eq!(snapshot.info.exit_code, Some(4));
    assert!(snapshot.info.ended_at.is_some());
}

#[cfg(unix)]
#[tokio::test]
async fn test_consume_output_drains() {
    let dir = tempfile::tempdir().expect("tempdir");
    let registry = registry(dir.path());
    let id = registry
        .start(CommandSpec::new("echo out; echo err >&2"))
        .await
        .expect("start");
    registry.wait(&id, Duration::from_secs(5)).await.expect("wait");

    let first = registry.consume_output(&id).await.expect("consume");
    assert_eq!(first.stdout, "out\n");
    assert_eq!(first.stderr, "err\n");

    let second = registry.consume_output(&id).await.expect("consume");
    assert!(second.stdout.is_empty());
    assert!(second.stderr.is_empty());
    assert_eq!(second.info.status, ProcessStatus::Exited);
}

#[cfg(unix)]
#[tokio::test]
async fn test_kill_marks_killed_and_keeps_output() {
    let dir = tempfile::tempdir().expect("tempdir");
    let registry = registry(dir.path());
    let id = registry
        .start(CommandSpec::new("echo ready; sleep 30"))
        .await
        .expect("start");
    assert_eq!(read_until(&registry, &id, "ready").await, "ready\n");

    let killed = registry.kill(&id).await.expect("kill");
    assert!(!killed.already_exited);
    assert_eq!(killed.status, ProcessStatus::Killed);

    // The close notification must not overwrite Killed.
    let mut info = registry.info(&id).await.expect("info");
    for _ in 0..100 {
        if info.ended_at.is_some() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
        info = registry.info(&id).await.expect("info");
    }
    assert!(info.ended_at.is_some());
    assert_eq!(info.status, ProcessStatus::Killed);
    assert_eq!(info.signal, Some(libc::SIGTERM));
}

#[cfg(unix)]
#[tokio::test]
async fn test_kill_immediately_after_start() {
    let dir = tempfile::tempdir().expect("tempdir");
    let registry = registry(dir.path());
    let id = registry
        .start(CommandSpec::new("echo early; sleep 30"))
        .await
        .expect("start");

    let killed = registry.kill(&id).await.expect("kill");
    assert_eq!(killed.status, ProcessStatus::Killed);

    let snapshot = registry.consume_output(&id).await.expect("consume");
    assert_eq!(snapshot.info.status, ProcessStatus::Killed);
}

#[cfg(unix)]
#[tokio::test]
async fn test_kill_after_exit_is_noop() {
    let dir = tempfile::tempdir().expect("tempdir");
    let registry = registry(dir.path());
    let id = registry.start(CommandSpec::new("true")).await.expect("start");
    registry.wait(&id, Duration::from_secs(5)).await.expect("wait");

    let result = registry.kill(&id).await.expect("kill");
    assert!(result.already_exited);
    assert_eq!(result.status, ProcessStatus::Exited);
}

#[tokio::test]
async fn test_unknown_id_is_not_found() {
    let dir = tempfile::tempdir().expect("tempdir");
    let registry = registry(dir.path());

    let err = registry.consume_output("bg-missing").await.expect_err("missing");
    assert!(matches!(err, ShellError::ProcessNotFound { .. }));
    let err = registry.kill("bg-missing").await.expect_err("missing");
    assert!(matches!(err, ShellError::ProcessNotFound { .. }));
}

#[tokio::test]
async fn test_spawn_failure_registers_error_entry() {
    let dir = tempfile::tempdir().expect("tempdir");
    let registry = registry(dir.path());
    let id = registry
        .start(CommandSpec::new("true").with_cwd(dir.path().join("missing")))
        .await
        .expect("start still returns an id");

    let snapshot = registry.consume_output(&id).await.expect("consume");
    assert_eq!(snapshot.info.status, ProcessStatus::Error);
    assert_eq!(snapshot.info.pid, None);
    let message = snapshot.info.error_message.expect("error message");
    assert!(message.starts_with("Failed to spawn"));
    assert!(snapshot.stderr.contains(&message));

    let killed = registry.kill(&id).await.expect("kill");
    assert!(killed.already_exited);
}

#[tokio::test]
async fn test_empty_command_is_rejected() {
    let dir = tempfile::tempdir().expect("tempdir");
    let registry = registry(dir.path());
    let err = registry.start(CommandSpec::new("")).await.expect_err("empty");
    assert!(matches!(err, ShellError::InvalidCommand { .. }));
    assert!(registry.is_empty().await);
}

#[cfg(unix)]
#[tokio::test]
async fn test_pending_output_is_bounded() {
    let dir = tempfile::tempdir().expect("tempdir");
    let registry = registry(dir.path()).with_max_pending_bytes(64);
    let id = registry
        .start(CommandSpec::new("i=0; while [ $i -lt 50 ]; do echo line-$i; i=$((i+1)); done"))
        .await
        .expect("start");
    registry.wait(&id, Duration::from_secs(5)).await.expect("wait");

    let snapshot = registry.consume_output(&id).await.expect("consume");
    assert!(snapshot.dropped_stdout_bytes > 0);
    assert!(snapshot.stdout.starts_with("[... "));
    assert!(snapshot.stdout.ends_with("line-49\n"));
}

#[cfg(unix)]
#[tokio::test]
async fn test_kill_all_clears_registry() {
    let dir = tempfile::tempdir().expect("tempdir");
    let registry = registry(dir.path());
    let running = registry.start(CommandSpec::new("sleep 30")).await.expect("start");
    let finished = registry.start(CommandSpec::new("true")).await.expect("start");
    registry
        .wait(&finished, Duration::from_secs(5))
        .await
        .expect("wait");
    let pid = registry.info(&running).await.expect("info").pid.expect("pid");

    assert_eq!(registry.list().await.len(), 2);
    assert_eq!(registry.kill_all().await, 1);
    assert!(registry.is_empty().await);

    for _ in 0..50 {
        if !crate::signal::is_process_alive(pid) {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    assert!(!crate::signal::is_process_alive(pid));
}

#[cfg(unix)]
#[tokio::test]
async fn test_wait_times_out_while_running() {
    let dir = tempfile::tempdir().expect("tempdir");
    let registry = registry(dir.path());
    let id = registry.start(CommandSpec::new("sleep 30")).await.expect("start");

    let status = registry
        .wait(&id, Duration::from_millis(50))
        .await
        .expect("wait");
    assert_eq!(status, ProcessStatus::Running);
    registry.kill_all().await;
}

#[cfg(unix)]
#[tokio::test]
async fn test_snapshot_serializes_flat() {
    let dir = tempfile::tempdir().expect("tempdir");
    let registry = registry(dir.path());
    let id = registry
        .start(CommandSpec::new("true").with_session("s1"))
        .await
        .expect("start");
    registry.wait(&id, Duration::from_secs(5)).await.expect("wait");

    let snapshot = registry.consume_output(&id).await.expect("consume");
    let json = serde_json::to_value(&snapshot).expect("json");
    assert_eq!(json["id"], serde_json::json!(id));
    assert_eq!(json["status"], "exited");
    assert_eq!(json["session_id"], "s1");
    assert_eq!(json["dropped_stdout_bytes"], 0);
}
