//! Independent engines over real temp workspaces.

#![cfg(unix)]

use std::fs;
use std::time::Duration;

use pretty_assertions::assert_eq;
use quill_engine::EngineConfig;
use quill_engine::GlobParams;
use quill_engine::ToolEngine;
use quill_shell::CommandInvocation;
use quill_shell::CommandSpec;
use quill_shell::ProcessStatus;
use quill_shell::Shell;
use quill_shell::ShellType;
use tokio_util::sync::CancellationToken;

fn engine(root: &std::path::Path) -> ToolEngine {
    ToolEngine::new(root, EngineConfig::default()).with_shell(Shell::new(ShellType::Sh, "/bin/sh"))
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn engines_do_not_share_state() {
    let first_dir = tempfile::tempdir().expect("tempdir");
    let second_dir = tempfile::tempdir().expect("tempdir");
    let first = engine(first_dir.path());
    let second = engine(second_dir.path());

    first
        .run(CommandInvocation::new("true").with_session("shared-id"))
        .await;
    assert!(first.sessions().get("shared-id").is_some());
    assert!(second.sessions().get("shared-id").is_none());

    let id = first
        .start_background(CommandSpec::new("sleep 30"))
        .await
        .into_payload()
        .expect("id");
    assert!(second.consume_output(&id).await.payload.is_none());
    assert_eq!(first.shutdown().await, 1);
    assert_eq!(second.shutdown().await, 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn generated_files_then_glob_and_background_build() {
    let dir = tempfile::tempdir().expect("tempdir");
    fs::write(dir.path().join(".gitignore"), "out/\n").expect("write");
    let engine = engine(dir.path());

    let id = engine
        .start_background(CommandSpec::new(
            "mkdir -p out src && touch out/skip.txt src/keep.txt && echo built",
        ))
        .await
        .into_payload()
        .expect("id");
    let status = engine
        .wait(&id, Duration::from_secs(5))
        .await
        .into_payload()
        .expect("status");
    assert_eq!(status, ProcessStatus::Exited);

    let snapshot = engine
        .consume_output(&id)
        .await
        .into_payload()
        .expect("snapshot");
    assert_eq!(snapshot.stdout, "built\n");
    assert_eq!(snapshot.info.exit_code, Some(0));

    let response = engine
        .glob(GlobParams::new("**/*.txt"), CancellationToken::new())
        .await;
    let json = serde_json::to_value(&response).expect("json");
    assert_eq!(json["status"], "Success");
    assert_eq!(json["payload"]["truncated"], false);
    assert_eq!(json["payload"]["matches"][0]["relative_path"], "src/keep.txt");
    assert_eq!(
        json["payload"]["matches"].as_array().map(Vec::len),
        Some(1)
    );

    engine.shutdown().await;
}
