use super::*;
use pretty_assertions::assert_eq;
use quill_error::ErrorExt;
use quill_error::StatusCode;

#[test]
fn test_defaults() {
    let config = EngineConfig::default();
    assert_eq!(config.filter_cache_ttl(), Duration::from_secs(30));
    assert_eq!(config.default_timeout(), Duration::from_secs(120));
    assert_eq!(config.kill_grace(), Duration::from_secs(1));
    assert_eq!(config.max_pending_output_bytes, 1024 * 1024);
    assert_eq!(config.default_max_results, 100);
    assert!(config.extra_excludes.is_empty());
}

#[test]
fn test_partial_toml_keeps_other_defaults() {
    let config = EngineConfig::from_toml_str(
        r#"
kill_grace_ms = 250
extra_excludes = ["*.snap"]

[logging]
level = "debug"
"#,
    )
    .expect("parse");

    assert_eq!(config.kill_grace(), Duration::from_millis(250));
    assert_eq!(config.extra_excludes, vec!["*.snap".to_string()]);
    assert_eq!(config.logging.level, "debug");
    assert_eq!(config.default_max_results, 100);
}

#[test]
fn test_malformed_toml_is_invalid_config() {
    let err = EngineConfig::from_toml_str("kill_grace_ms = \"soon\"").expect_err("type error");
    assert!(matches!(err, EngineError::ConfigParse { .. }));
    assert_eq!(err.status_code(), StatusCode::InvalidConfig);
}

#[test]
fn test_zero_limits_are_rejected() {
    let err = EngineConfig::from_toml_str("default_max_results = 0").expect_err("invalid");
    assert!(matches!(err, EngineError::InvalidConfig { .. }));

    let err = EngineConfig::from_toml_str("default_timeout_ms = 0").expect_err("invalid");
    assert_eq!(err.status_code(), StatusCode::InvalidConfig);
}

#[test]
fn test_load_missing_and_empty_files_use_defaults() {
    let dir = tempfile::tempdir().expect("tempdir");

    let missing = EngineConfig::load(&dir.path().join("quill.toml")).expect("load");
    assert_eq!(missing, EngineConfig::default());

    let empty = dir.path().join("empty.toml");
    std::fs::write(&empty, "\n  \n").expect("write");
    assert_eq!(EngineConfig::load(&empty).expect("load"), EngineConfig::default());
}

#[test]
fn test_load_reports_path_of_malformed_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("quill.toml");
    std::fs::write(&path, "filter_cache_ttl_secs = [").expect("write");

    let err = EngineConfig::load(&path).expect_err("malformed");
    assert!(err.to_string().contains("quill.toml"));
}
