use super::*;
use pretty_assertions::assert_eq;
use crate::error::engine_error;

fn result(outcome: CommandOutcome, exit_code: Option<i32>, signal: Option<i32>) -> CommandResult {
    CommandResult {
        outcome,
        stdout: "partial out".to_string(),
        stderr: String::new(),
        exit_code,
        signal,
        duration_ms: 12,
        pid: Some(42),
    }
}

#[test]
fn test_nonzero_exit_is_success() {
    let response = ToolResponse::from_command(result(CommandOutcome::Completed, Some(3), None), 1000);
    assert!(response.is_success());
    assert_eq!(response.status, StatusCode::Success);
    assert_eq!(response.message.as_deref(), Some("Exit code 3"));
    assert_eq!(response.payload.as_ref().and_then(|r| r.exit_code), Some(3));
    assert!(response.partial.is_none());
}

#[test]
fn test_timeout_keeps_partial_output() {
    let response = ToolResponse::from_command(result(CommandOutcome::TimedOut, None, Some(15)), 1500);
    assert!(!response.is_success());
    assert_eq!(response.status, StatusCode::Timeout);
    assert!(response.payload.is_none());
    assert_eq!(response.message.as_deref(), Some("Command timed out after 1.50s"));
    assert_eq!(
        response.partial.map(|r| r.stdout),
        Some("partial out".to_string())
    );
}

#[test]
fn test_cancel_status() {
    let response = ToolResponse::from_command(result(CommandOutcome::Cancelled, None, Some(15)), 1000);
    assert_eq!(response.status, StatusCode::Cancelled);
    assert!(response.partial.is_some());
}

#[test]
fn test_from_error_uses_status_code() {
    let err = engine_error::InvalidConfigSnafu {
        message: "default_max_results must be > 0",
    }
    .build();
    let response: ToolResponse<()> = ToolResponse::from_error(&err);
    assert!(!response.success);
    assert_eq!(response.status, StatusCode::InvalidConfig);
    assert_eq!(
        response.message.as_deref(),
        Some("Invalid config: default_max_results must be > 0")
    );
    assert!(response.partial.is_none());
}

#[test]
fn test_with_partial_attaches_output() {
    let err = engine_error::ShutDownSnafu.build();
    let response: ToolResponse<CommandResult> = ToolResponse::from_error(&err)
        .with_partial(Some(result(CommandOutcome::Completed, None, None)));
    assert_eq!(response.status, StatusCode::Cancelled);
    assert_eq!(response.partial.expect("partial").stdout, "partial out");
}

#[test]
fn test_serializes_status_by_name() {
    let response = ToolResponse::ok(vec![1, 2]).with_message("done");
    let json = serde_json::to_value(&response).expect("json");
    assert_eq!(
        json,
        serde_json::json!({
            "status": "Success",
            "success": true,
            "payload": [1, 2],
            "message": "done",
        })
    );
}
