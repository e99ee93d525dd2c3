//! Process lifecycle through the public API: timeouts, sessions and
//! background processes running real shells.

#![cfg(unix)]

use std::sync::Arc;
use std::sync::Mutex;
use std::time::Duration;
use std::time::Instant;

use pretty_assertions::assert_eq;
use quill_shell::BackgroundProcessRegistry;
use quill_shell::CommandInvocation;
use quill_shell::CommandOutcome;
use quill_shell::CommandRunner;
use quill_shell::CommandSpec;
use quill_shell::OutputSink;
use quill_shell::OutputStream;
use quill_shell::ProcessStatus;
use quill_shell::SessionStore;
use quill_shell::Shell;
use quill_shell::ShellType;
use quill_shell::is_process_alive;

fn runner(cwd: &std::path::Path) -> CommandRunner {
    CommandRunner::new(cwd, SessionStore::new()).with_shell(Shell::new(ShellType::Sh, "/bin/sh"))
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn sleep_times_out_within_grace_and_leaves_no_process() {
    let dir = tempfile::tempdir().expect("tempdir");
    let started = Instant::now();
    let result = runner(dir.path())
        .run(CommandInvocation::new("sleep 5").with_timeout(Duration::from_millis(100)))
        .await
        .expect("run");

    assert_eq!(result.outcome, CommandOutcome::TimedOut);
    assert!(started.elapsed() < Duration::from_millis(2500));
    assert!(!is_process_alive(result.pid.expect("pid")));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn grandchildren_are_terminated_with_the_group() {
    let dir = tempfile::tempdir().expect("tempdir");
    let pid_file = dir.path().join("child.pid");
    let script = format!("sleep 30 & echo $! > {}; wait", pid_file.display());

    let result = runner(dir.path())
        .run(CommandInvocation::new(script).with_timeout(Duration::from_millis(300)))
        .await
        .expect("run");
    assert_eq!(result.outcome, CommandOutcome::TimedOut);

    let child: u32 = std::fs::read_to_string(&pid_file)
        .expect("pid file")
        .trim()
        .parse()
        .expect("pid");
    for _ in 0..50 {
        if !is_process_alive(child) {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    assert!(!is_process_alive(child));
}

#[tokio::test]
async fn nonzero_exit_is_a_completed_outcome() {
    let dir = tempfile::tempdir().expect("tempdir");
    let result = runner(dir.path())
        .run(CommandInvocation::new("exit 3"))
        .await
        .expect("run");
    assert!(result.is_completed());
    assert_eq!(result.exit_code, Some(3));
}

#[tokio::test]
async fn session_cwd_and_env_are_first_write_wins() {
    let dir = tempfile::tempdir().expect("tempdir");
    let first_dir = tempfile::tempdir().expect("tempdir");
    let second_dir = tempfile::tempdir().expect("tempdir");
    let runner = runner(dir.path());

    runner
        .run(
            CommandInvocation::new("true")
                .with_session("agent-1")
                .with_cwd(first_dir.path())
                .with_env("STAGE", "first"),
        )
        .await
        .expect("run");
    let result = runner
        .run(
            CommandInvocation::new("pwd; printf '%s' \"$STAGE\"")
                .with_session("agent-1")
                .with_cwd(second_dir.path()),
        )
        .await
        .expect("run");

    let mut lines = result.stdout.lines();
    let cwd = std::path::PathBuf::from(lines.next().expect("pwd line"));
    assert_eq!(
        cwd.canonicalize().expect("canonicalize"),
        first_dir.path().canonicalize().expect("canonicalize")
    );
    assert_eq!(lines.next(), Some("first"));

    assert!(runner.sessions().close("agent-1"));
    assert!(runner.sessions().get("agent-1").is_none());
}

struct LineCounter(Mutex<usize>);

impl OutputSink for LineCounter {
    fn on_output(&self, stream: OutputStream, chunk: &str) {
        if stream == OutputStream::Stdout {
            *self.0.lock().expect("lock") += chunk.matches('\n').count();
        }
    }
}

#[tokio::test]
async fn sink_sees_every_line() {
    let dir = tempfile::tempdir().expect("tempdir");
    let sink = Arc::new(LineCounter(Mutex::new(0)));
    let result = runner(dir.path())
        .run(CommandInvocation::new("seq 1 500").with_sink(sink.clone()))
        .await
        .expect("run");

    assert_eq!(result.stdout.lines().count(), 500);
    assert_eq!(*sink.0.lock().expect("lock"), 500);
}

#[tokio::test]
async fn background_start_kill_then_drain() {
    let dir = tempfile::tempdir().expect("tempdir");
    let registry = BackgroundProcessRegistry::new(runner(dir.path()));
    let id = registry
        .start(CommandSpec::new("echo up; sleep 30"))
        .await
        .expect("start");

    let mut stdout = String::new();
    for _ in 0..100 {
        stdout.push_str(&registry.consume_output(&id).await.expect("consume").stdout);
        if !stdout.is_empty() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    assert_eq!(stdout, "up\n");

    let kill = registry.kill(&id).await.expect("kill");
    assert_eq!(kill.status, ProcessStatus::Killed);
    let again = registry.kill(&id).await.expect("kill");
    assert!(again.already_exited);

    let first = registry.consume_output(&id).await.expect("consume");
    let second = registry.consume_output(&id).await.expect("consume");
    assert_eq!(first.info.status, ProcessStatus::Killed);
    assert!(second.stdout.is_empty());
    assert!(second.stderr.is_empty());

    assert_eq!(registry.kill_all().await, 0);
    assert!(registry.list().await.is_empty());
}
