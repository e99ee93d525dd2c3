use super::*;
use clap::CommandFactory;
use pretty_assertions::assert_eq;

#[test]
fn test_cli_definition_is_consistent() {
    Cli::command().debug_assert();
}

#[test]
fn test_parse_glob() {
    let cli = Cli::try_parse_from([
        "quill", "glob", "**/*.rs", "-n", "5", "--include-dirs", "-x", "target/", "-x", "*.bak",
    ])
    .expect("parse");
    let Command::Glob(args) = cli.command else {
        panic!("expected glob");
    };
    assert_eq!(args.pattern, "**/*.rs");
    assert_eq!(args.max_results, Some(5));
    assert!(args.include_dirs);
    assert!(!args.case_sensitive);
    assert_eq!(args.excludes, vec!["target/".to_string(), "*.bak".to_string()]);
}

#[test]
fn test_parse_run_with_trailing_args() {
    let cli = Cli::try_parse_from([
        "quill", "--workspace", "/repo", "run", "printf", "-e", "A=1", "--timeout-ms", "500", "--",
        "%s\n", "a b",
    ])
    .expect("parse");
    assert_eq!(cli.workspace, Some(PathBuf::from("/repo")));
    let Command::Run(args) = cli.command else {
        panic!("expected run");
    };
    assert_eq!(args.command, "printf");
    assert_eq!(args.args, vec!["%s\n".to_string(), "a b".to_string()]);
    assert_eq!(args.env, vec![("A".to_string(), "1".to_string())]);
    assert_eq!(args.timeout_ms, Some(500));
}

#[test]
fn test_parse_bg_defaults() {
    let cli = Cli::try_parse_from(["quill", "bg", "sleep 10", "-v"]).expect("parse");
    assert!(cli.verbose);
    let Command::Bg(args) = cli.command else {
        panic!("expected bg");
    };
    assert_eq!(args.poll_ms, 200);
    assert_eq!(args.max_polls, 0);
}

#[test]
fn test_rejects_malformed_env() {
    let err = Cli::try_parse_from(["quill", "run", "true", "-e", "NOEQUALS"]).expect_err("invalid");
    assert!(err.to_string().contains("KEY=VALUE"));
}
