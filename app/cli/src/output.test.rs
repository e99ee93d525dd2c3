use super::*;
use pretty_assertions::assert_eq;
use quill_shell::CommandOutcome;

fn result(exit_code: Option<i32>, signal: Option<i32>) -> CommandResult {
    CommandResult {
        outcome: CommandOutcome::Completed,
        stdout: String::new(),
        stderr: String::new(),
        exit_code,
        signal,
        duration_ms: 0,
        pid: None,
    }
}

#[test]
fn test_command_exit_code_mirrors_child() {
    assert_eq!(command_exit_code(&result(Some(0), None)), 0);
    assert_eq!(command_exit_code(&result(Some(3), None)), 3);
    assert_eq!(command_exit_code(&result(Some(256 + 7), None)), 7);
    assert_eq!(command_exit_code(&result(None, Some(9))), 137);
    assert_eq!(command_exit_code(&result(None, None)), EXIT_FAILURE);
}

#[test]
fn test_failure_exit_codes() {
    assert_eq!(failure_exit_code(StatusCode::Timeout), EXIT_TIMED_OUT);
    assert_eq!(failure_exit_code(StatusCode::Cancelled), EXIT_CANCELLED);
    assert_eq!(failure_exit_code(StatusCode::SpawnFailed), EXIT_FAILURE);
    assert_eq!(failure_exit_code(StatusCode::InvalidArguments), EXIT_FAILURE);
}
