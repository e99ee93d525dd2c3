use super::*;
use pretty_assertions::assert_eq;
use quill_error::StatusCode;
use quill_shell::ShellType;
use std::fs;

fn engine(root: &Path, config: EngineConfig) -> ToolEngine {
    ToolEngine::new(root, config).with_shell(Shell::new(ShellType::Sh, "/bin/sh"))
}

fn paths(result: &SearchResult) -> Vec<&str> {
    let mut paths: Vec<_> = result
        .matches
        .iter()
        .map(|m| m.relative_path.as_str())
        .collect();
    paths.sort_unstable();
    paths
}

#[tokio::test]
async fn test_glob_applies_config_and_call_excludes() {
    let dir = tempfile::tempdir().expect("tempdir");
    for file in ["src/a.rs", "src/b.snap", "gen/c.rs", "d.rs"] {
        let path = dir.path().join(file);
        fs::create_dir_all(path.parent().expect("parent")).expect("mkdir");
        fs::write(path, "").expect("write");
    }
    let config = EngineConfig {
        extra_excludes: vec!["gen/".to_string()],
        ..EngineConfig::default()
    };
    let engine = engine(dir.path(), config);

    let response = engine
        .glob(GlobParams::new("**/*.rs"), CancellationToken::new())
        .await;
    assert!(response.success);
    assert_eq!(paths(response.payload.as_ref().expect("payload")), vec!["d.rs", "src/a.rs"]);

    let params = GlobParams {
        extra_excludes: vec!["d.rs".to_string()],
        root: Some(PathBuf::from(".")),
        ..GlobParams::new("**/*.rs")
    };
    let response = engine.glob(params, CancellationToken::new()).await;
    assert_eq!(paths(response.payload.as_ref().expect("payload")), vec!["src/a.rs"]);
}

#[tokio::test]
async fn test_glob_uses_default_max_results() {
    let dir = tempfile::tempdir().expect("tempdir");
    for i in 0..4 {
        fs::write(dir.path().join(format!("f{i}.txt")), "").expect("write");
    }
    let config = EngineConfig {
        default_max_results: 3,
        ..EngineConfig::default()
    };
    let response = engine(dir.path(), config)
        .glob(GlobParams::new("*.txt"), CancellationToken::new())
        .await;

    let result = response.payload.expect("payload");
    assert_eq!(result.len(), 3);
    assert!(result.truncated);
    assert!(response.message.expect("message").contains("truncated"));
}

#[tokio::test]
async fn test_glob_failures_are_classified() {
    let dir = tempfile::tempdir().expect("tempdir");
    let engine = engine(dir.path(), EngineConfig::default());

    let missing = engine
        .glob(
            GlobParams {
                root: Some(dir.path().join("missing")),
                ..GlobParams::new("*")
            },
            CancellationToken::new(),
        )
        .await;
    assert!(!missing.success);
    assert_eq!(missing.status, StatusCode::InvalidArguments);

    let cancel = CancellationToken::new();
    cancel.cancel();
    let cancelled = engine.glob(GlobParams::new("*"), cancel).await;
    assert_eq!(cancelled.status, StatusCode::Cancelled);
    assert!(cancelled.payload.is_none());
}

#[cfg(unix)]
#[tokio::test]
async fn test_run_envelopes() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = EngineConfig {
        default_timeout_ms: 200,
        kill_grace_ms: 100,
        ..EngineConfig::default()
    };
    let engine = engine(dir.path(), config);

    let exited = engine.run(CommandInvocation::new("echo hi; exit 3")).await;
    assert!(exited.success);
    assert_eq!(exited.payload.as_ref().and_then(|r| r.exit_code), Some(3));

    let timed_out = engine.run(CommandInvocation::new("echo partial; sleep 5")).await;
    assert_eq!(timed_out.status, StatusCode::Timeout);
    assert_eq!(timed_out.message.as_deref(), Some("Command timed out after 200ms"));
    assert_eq!(timed_out.partial.expect("partial").stdout, "partial\n");

    let invalid = engine.run(CommandInvocation::new("")).await;
    assert_eq!(invalid.status, StatusCode::InvalidArguments);
}

#[tokio::test]
async fn test_spawn_failure_envelope() {
    let dir = tempfile::tempdir().expect("tempdir");
    let engine = ToolEngine::new(dir.path(), EngineConfig::default())
        .with_shell(Shell::new(ShellType::Sh, "/nonexistent/sh"));

    let response = engine.run(CommandInvocation::new("true")).await;
    assert_eq!(response.status, StatusCode::SpawnFailed);
    assert!(response.partial.is_none());
    assert!(response.message.expect("message").contains("Failed to spawn"));
}

#[cfg(unix)]
#[tokio::test]
async fn test_run_rejected_after_shutdown() {
    let dir = tempfile::tempdir().expect("tempdir");
    let engine = engine(dir.path(), EngineConfig::default());
    let marker = dir.path().join("ran");

    engine.shutdown().await;
    let response = engine
        .run(CommandInvocation::new(format!("touch '{}'", marker.display())))
        .await;
    assert!(!response.success);
    assert_eq!(response.status, StatusCode::Cancelled);
    assert!(response.partial.is_none());
    assert!(!marker.exists());
}

#[cfg(unix)]
#[tokio::test]
async fn test_background_lifecycle_and_shutdown() {
    let dir = tempfile::tempdir().expect("tempdir");
    let engine = engine(dir.path(), EngineConfig::default());

    let id = engine
        .start_background(CommandSpec::new("echo bg; sleep 30"))
        .await
        .into_payload()
        .expect("id");
    let listed = engine.list_background().await.into_payload().expect("list");
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, id);

    let status = engine
        .wait(&id, Duration::from_millis(50))
        .await
        .into_payload()
        .expect("status");
    assert_eq!(status, ProcessStatus::Running);

    assert_eq!(engine.shutdown().await, 1);
    assert_eq!(engine.shutdown().await, 0);
    assert!(engine.is_shut_down());

    let gone = engine.consume_output(&id).await;
    assert_eq!(gone.status, StatusCode::NotFound);

    let rejected = engine.start_background(CommandSpec::new("true")).await;
    assert!(!rejected.success);
    assert_eq!(rejected.status, StatusCode::Cancelled);
}

#[cfg(unix)]
#[tokio::test]
async fn test_kill_messages() {
    let dir = tempfile::tempdir().expect("tempdir");
    let engine = engine(dir.path(), EngineConfig::default());
    let id = engine
        .start_background(CommandSpec::new("sleep 30"))
        .await
        .into_payload()
        .expect("id");

    let first = engine.kill(&id).await;
    assert_eq!(first.payload.as_ref().map(|k| k.status), Some(ProcessStatus::Killed));
    assert_eq!(first.message, Some(format!("Sent SIGTERM to process {id}")));

    let second = engine.kill(&id).await;
    assert!(second.payload.expect("payload").already_exited);

    let unknown = engine.kill("bg-nope").await;
    assert_eq!(unknown.status, StatusCode::NotFound);
}

#[cfg(unix)]
#[tokio::test]
async fn test_close_session_resets_context() {
    let dir = tempfile::tempdir().expect("tempdir");
    let other = tempfile::tempdir().expect("tempdir");
    let engine = engine(dir.path(), EngineConfig::default());

    engine
        .run(CommandInvocation::new("true").with_session("s").with_cwd(other.path()))
        .await;
    assert!(engine.sessions().get("s").is_some());
    assert!(engine.close_session("s"));
    assert!(!engine.close_session("s"));

    let response = engine
        .run(CommandInvocation::new("pwd").with_session("s"))
        .await;
    let cwd = PathBuf::from(response.payload.expect("payload").stdout.trim());
    assert_eq!(
        cwd.canonicalize().expect("canonicalize"),
        dir.path().canonicalize().expect("canonicalize")
    );
}
