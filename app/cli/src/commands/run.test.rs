use super::*;
use pretty_assertions::assert_eq;

#[test]
fn test_parse_env_pair() {
    assert_eq!(
        parse_env_pair("RUST_LOG=info,quill=debug"),
        Ok(("RUST_LOG".to_string(), "info,quill=debug".to_string()))
    );
    assert_eq!(parse_env_pair("EMPTY="), Ok(("EMPTY".to_string(), String::new())));
    assert!(parse_env_pair("NOVALUE").is_err());
    assert!(parse_env_pair("=value").is_err());
}

#[test]
fn test_build_invocation() {
    let args = RunArgs {
        command: "ls".to_string(),
        args: vec!["-la".to_string(), "my dir".to_string()],
        cwd: Some(PathBuf::from("/tmp")),
        timeout_ms: Some(1500),
        env: vec![("A".to_string(), "1".to_string())],
        session: Some("s1".to_string()),
        json: false,
    };
    let cancel = CancellationToken::new();
    let invocation = build_invocation(args, cancel.clone());

    assert_eq!(invocation.spec.command, "ls");
    assert_eq!(invocation.spec.args, vec!["-la".to_string(), "my dir".to_string()]);
    assert_eq!(invocation.spec.cwd, Some(PathBuf::from("/tmp")));
    assert_eq!(invocation.spec.env.get("A").map(String::as_str), Some("1"));
    assert_eq!(invocation.spec.session_id.as_deref(), Some("s1"));
    assert_eq!(invocation.timeout, Some(Duration::from_millis(1500)));

    cancel.cancel();
    assert!(invocation.cancel.is_cancelled());
}
