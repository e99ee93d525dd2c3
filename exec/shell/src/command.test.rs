use super::*;
use pretty_assertions::assert_eq;

fn result(outcome: CommandOutcome, exit_code: Option<i32>) -> CommandResult {
    CommandResult {
        outcome,
        stdout: "out".to_string(),
        stderr: String::new(),
        exit_code,
        signal: None,
        duration_ms: 12,
        pid: Some(42),
    }
}

#[test]
fn test_nonzero_exit_is_still_completed() {
    let failed = result(CommandOutcome::Completed, Some(3));
    assert!(failed.is_completed());
    assert!(!failed.exited_successfully());
    assert_eq!(failed.outcome.status_code(), StatusCode::Success);

    assert!(result(CommandOutcome::Completed, Some(0)).exited_successfully());
}

#[test]
fn test_timed_out_is_not_success_even_with_exit_zero() {
    let timed_out = result(CommandOutcome::TimedOut, Some(0));
    assert!(!timed_out.exited_successfully());
    assert_eq!(timed_out.outcome.status_code(), StatusCode::Timeout);
    assert_eq!(CommandOutcome::Cancelled.status_code(), StatusCode::Cancelled);
}

#[test]
fn test_outcome_serializes_as_stable_tag() {
    let json = serde_json::to_value(result(CommandOutcome::TimedOut, None)).expect("json");
    assert_eq!(json["outcome"], "timed_out");
    assert_eq!(json["exit_code"], serde_json::Value::Null);
    assert!(json.get("signal").is_none());
}

#[test]
fn test_invocation_builders() {
    let invocation = CommandInvocation::new("ls")
        .with_args(vec!["-la".to_string()])
        .with_cwd("/tmp")
        .with_env("A", "1")
        .with_session("s1")
        .with_timeout(Duration::from_secs(5));

    assert_eq!(invocation.spec.command, "ls");
    assert_eq!(invocation.spec.args, vec!["-la"]);
    assert_eq!(invocation.spec.cwd, Some(PathBuf::from("/tmp")));
    assert_eq!(invocation.spec.env.get("A").map(String::as_str), Some("1"));
    assert_eq!(invocation.spec.session_id.as_deref(), Some("s1"));
    assert_eq!(invocation.timeout, Some(Duration::from_secs(5)));
    assert!(invocation.sink.is_none());
}

#[test]
fn test_cancelled_before_start_has_no_process() {
    let cancelled = CommandResult::cancelled_before_start();
    assert_eq!(cancelled.outcome, CommandOutcome::Cancelled);
    assert_eq!(cancelled.pid, None);
    assert_eq!(cancelled.exit_code, None);
}
