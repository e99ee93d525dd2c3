use super::*;
use crate::shell::ShellType;
use pretty_assertions::assert_eq;
use std::sync::Mutex;
use tokio_util::sync::CancellationToken;

fn runner(cwd: &Path) -> CommandRunner {
    CommandRunner::new(cwd, SessionStore::new()).with_shell(Shell::new(ShellType::Sh, "/bin/sh"))
}

#[derive(Default)]
struct CollectingSink {
    chunks: Mutex<Vec<(OutputStream, String)>>,
}

impl OutputSink for CollectingSink {
    fn on_output(&self, stream: OutputStream, chunk: &str) {
        self.chunks
            .lock()
            .expect("lock")
            .push((stream, chunk.to_string()));
    }
}

#[test]
fn test_prepare_rejects_empty_command() {
    let dir = tempfile::tempdir().expect("tempdir");
    let err = runner(dir.path())
        .prepare(&CommandSpec::new("   "))
        .expect_err("empty");
    assert!(matches!(err, ShellError::InvalidCommand { .. }));
}

#[test]
fn test_prepare_layers_session_then_call_env() {
    let dir = tempfile::tempdir().expect("tempdir");
    let runner = runner(dir.path());
    runner.sessions().get_or_create(
        "s1",
        None,
        &HashMap::from([
            ("A".to_string(), "session".to_string()),
            ("B".to_string(), "session".to_string()),
        ]),
    );

    let prepared = runner
        .prepare(&CommandSpec::new("true").with_session("s1").with_env("B", "call"))
        .expect("prepare");
    assert_eq!(prepared.env.get("A").map(String::as_str), Some("session"));
    assert_eq!(prepared.env.get("B").map(String::as_str), Some("call"));
    assert_eq!(prepared.cwd, dir.path());
    assert_eq!(prepared.program, "/bin/sh");
    assert_eq!(prepared.args, vec!["-c".to_string(), "true".to_string()]);
}

#[test]
fn test_prepare_cwd_precedence() {
    let dir = tempfile::tempdir().expect("tempdir");
    let other = tempfile::tempdir().expect("tempdir");
    let runner = runner(dir.path());

    let plain = runner.prepare(&CommandSpec::new("true")).expect("prepare");
    assert_eq!(plain.cwd, dir.path());

    let call = runner
        .prepare(&CommandSpec::new("true").with_cwd(other.path()))
        .expect("prepare");
    assert_eq!(call.cwd, other.path());

    runner.sessions().get_or_create("s", Some(other.path().to_path_buf()), &HashMap::new());
    let session = runner
        .prepare(&CommandSpec::new("true").with_session("s").with_cwd(dir.path()))
        .expect("prepare");
    assert_eq!(session.cwd, other.path());
}

#[cfg(unix)]
#[tokio::test]
async fn test_run_captures_stdout_and_stderr() {
    let dir = tempfile::tempdir().expect("tempdir");
    let result = runner(dir.path())
        .run(CommandInvocation::new("echo out; echo err >&2"))
        .await
        .expect("run");

    assert!(result.exited_successfully());
    assert_eq!(result.stdout, "out\n");
    assert_eq!(result.stderr, "err\n");
    assert!(result.pid.is_some());
}

#[cfg(unix)]
#[tokio::test]
async fn test_nonzero_exit_is_completed() {
    let dir = tempfile::tempdir().expect("tempdir");
    let result = runner(dir.path())
        .run(CommandInvocation::new("exit 3"))
        .await
        .expect("run");

    assert_eq!(result.outcome, CommandOutcome::Completed);
    assert_eq!(result.exit_code, Some(3));
    assert!(!result.exited_successfully());
}

#[cfg(unix)]
#[tokio::test]
async fn test_arguments_are_quoted() {
    let dir = tempfile::tempdir().expect("tempdir");
    let result = runner(dir.path())
        .run(CommandInvocation::new("printf '%s|'").with_args(vec!["a b".into(), "$HOME".into()]))
        .await
        .expect("run");
    assert_eq!(result.stdout, "a b|$HOME|");
}

#[cfg(unix)]
#[tokio::test]
async fn test_timeout_terminates_process() {
    let dir = tempfile::tempdir().expect("tempdir");
    let started = Instant::now();
    let result = runner(dir.path())
        .run(CommandInvocation::new("echo begin; sleep 5").with_timeout(Duration::from_millis(100)))
        .await
        .expect("run");

    assert_eq!(result.outcome, CommandOutcome::TimedOut);
    assert_eq!(result.stdout, "begin\n");
    assert!(started.elapsed() < Duration::from_secs(3));
    let pid = result.pid.expect("pid");
    assert!(!crate::signal::is_process_alive(pid));
}

#[cfg(unix)]
#[tokio::test]
async fn test_timeout_escalates_to_sigkill() {
    let dir = tempfile::tempdir().expect("tempdir");
    let runner = runner(dir.path()).with_kill_grace(Duration::from_millis(200));
    let started = Instant::now();
    let result = runner
        .run(CommandInvocation::new("trap '' TERM; sleep 5").with_timeout(Duration::from_millis(100)))
        .await
        .expect("run");

    assert_eq!(result.outcome, CommandOutcome::TimedOut);
    assert_eq!(result.signal, Some(libc::SIGKILL));
    assert_eq!(result.exit_code, None);
    let elapsed = started.elapsed();
    assert!(elapsed >= Duration::from_millis(300));
    assert!(elapsed < Duration::from_secs(3));
}

#[cfg(unix)]
#[tokio::test]
async fn test_cancel_keeps_partial_output() {
    let dir = tempfile::tempdir().expect("tempdir");
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(200)).await;
        trigger.cancel();
    });

    let started = Instant::now();
    let result = runner(dir.path())
        .run(CommandInvocation::new("echo started; sleep 5").with_cancel(cancel))
        .await
        .expect("run");

    assert_eq!(result.outcome, CommandOutcome::Cancelled);
    assert_eq!(result.stdout, "started\n");
    assert!(started.elapsed() < Duration::from_secs(3));
}

#[tokio::test]
async fn test_cancel_before_start_spawns_nothing() {
    let dir = tempfile::tempdir().expect("tempdir");
    let cancel = CancellationToken::new();
    cancel.cancel();

    let result = runner(dir.path())
        .run(CommandInvocation::new("echo never").with_cancel(cancel))
        .await
        .expect("run");
    assert_eq!(result.outcome, CommandOutcome::Cancelled);
    assert_eq!(result.pid, None);
    assert!(result.stdout.is_empty());
}

#[tokio::test]
async fn test_missing_shell_is_spawn_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let runner = CommandRunner::new(dir.path(), SessionStore::new())
        .with_shell(Shell::new(ShellType::Sh, "/nonexistent/bin/sh"));

    let err = runner
        .run(CommandInvocation::new("echo hi"))
        .await
        .expect_err("spawn must fail");
    assert!(err.is_spawn_error());
}

#[cfg(unix)]
#[tokio::test]
async fn test_missing_cwd_is_spawn_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let err = runner(dir.path())
        .run(CommandInvocation::new("true").with_cwd(dir.path().join("gone")))
        .await
        .expect_err("spawn must fail");
    assert!(err.is_spawn_error());
}

#[cfg(unix)]
#[tokio::test]
async fn test_session_cwd_sticks_across_calls() {
    let dir = tempfile::tempdir().expect("tempdir");
    let session_dir = tempfile::tempdir().expect("tempdir");
    let runner = runner(dir.path());

    let first = runner
        .run(CommandInvocation::new("pwd").with_session("s").with_cwd(session_dir.path()))
        .await
        .expect("run");
    let second = runner
        .run(CommandInvocation::new("pwd").with_session("s"))
        .await
        .expect("run");

    let expected = session_dir.path().canonicalize().expect("canonicalize");
    let first_cwd = PathBuf::from(first.stdout.trim()).canonicalize().expect("canonicalize");
    let second_cwd = PathBuf::from(second.stdout.trim()).canonicalize().expect("canonicalize");
    assert_eq!(first_cwd, expected);
    assert_eq!(second_cwd, expected);
}

#[cfg(unix)]
#[tokio::test]
async fn test_call_env_reaches_process() {
    let dir = tempfile::tempdir().expect("tempdir");
    let result = runner(dir.path())
        .run(CommandInvocation::new("printf '%s' \"$QUILL_TEST_VAR\"").with_env("QUILL_TEST_VAR", "42"))
        .await
        .expect("run");
    assert_eq!(result.stdout, "42");
}

#[cfg(unix)]
#[tokio::test]
async fn test_sink_receives_output_chunks() {
    let dir = tempfile::tempdir().expect("tempdir");
    let sink = Arc::new(CollectingSink::default());
    let result = runner(dir.path())
        .run(CommandInvocation::new("echo one; echo two >&2").with_sink(sink.clone()))
        .await
        .expect("run");
    assert!(result.exited_successfully());

    let chunks = sink.chunks.lock().expect("lock");
    let stdout: String = chunks
        .iter()
        .filter(|(s, _)| *s == OutputStream::Stdout)
        .map(|(_, c)| c.as_str())
        .collect();
    let stderr: String = chunks
        .iter()
        .filter(|(s, _)| *s == OutputStream::Stderr)
        .map(|(_, c)| c.as_str())
        .collect();
    assert_eq!(stdout, "one\n");
    assert_eq!(stderr, "two\n");
}

#[test]
fn test_failed_wait_keeps_captured_output() {
    let err = finish_result(
        CommandOutcome::TimedOut,
        Err(std::io::Error::other("wait interrupted")),
        Some(4242),
        "half a line".to_string(),
        "warning: slow".to_string(),
        Duration::from_millis(30),
    )
    .expect_err("wait failed");

    assert!(matches!(err, ShellError::Wait { pid: 4242, .. }));
    let partial = err.partial_result().expect("partial output");
    assert_eq!(partial.outcome, CommandOutcome::TimedOut);
    assert_eq!(partial.stdout, "half a line");
    assert_eq!(partial.stderr, "warning: slow");
    assert_eq!(partial.exit_code, None);
    assert_eq!(partial.duration_ms, 30);
}

#[cfg(unix)]
#[test]
fn test_finish_result_reads_exit_status() {
    use std::os::unix::process::ExitStatusExt;

    let result = finish_result(
        CommandOutcome::Completed,
        Ok(ExitStatus::from_raw(3 << 8)),
        Some(1),
        "out".to_string(),
        String::new(),
        Duration::ZERO,
    )
    .expect("exit status");
    assert_eq!(result.exit_code, Some(3));
    assert_eq!(result.signal, None);
    assert_eq!(result.stdout, "out");
}
