use super::*;
use pretty_assertions::assert_eq;

#[test]
fn test_configurable_timer_local() {
    let timer = ConfigurableTimer::new(TimezoneConfig::Local);
    let mut buf = String::new();
    let mut writer = Writer::new(&mut buf);
    timer.format_time(&mut writer).expect("format");
    assert!(!buf.ends_with('Z'));
    assert_eq!(buf.len(), "2024-01-01 00:00:00.000".len());
}

#[test]
fn test_configurable_timer_utc() {
    let timer = ConfigurableTimer::new(TimezoneConfig::Utc);
    let mut buf = String::new();
    let mut writer = Writer::new(&mut buf);
    timer.format_time(&mut writer).expect("format");
    assert!(buf.ends_with('Z'));
}

#[test]
fn test_filter_directives_default_level() {
    let logging = LoggingConfig {
        level: "  ".to_string(),
        ..LoggingConfig::default()
    };
    assert_eq!(filter_directives(&logging, "warn"), "warn");
}

#[test]
fn test_filter_directives_with_modules() {
    let logging = LoggingConfig {
        location: false,
        target: false,
        timezone: TimezoneConfig::Local,
        level: "info".to_string(),
        modules: vec![
            "quill_shell=debug".to_string(),
            String::new(),
            " quill_file_search=trace ".to_string(),
        ],
    };
    assert_eq!(
        filter_directives(&logging, "error"),
        "info,quill_shell=debug,quill_file_search=trace"
    );
}

#[test]
fn test_build_env_filter_invalid_directive_falls_back() {
    let logging = LoggingConfig {
        level: "not a level=[".to_string(),
        ..LoggingConfig::default()
    };
    let filter = build_env_filter(&logging, "error");
    let _ = format!("{filter:?}");
}

#[test]
fn test_logging_config_from_toml() {
    let config: LoggingConfig = toml::from_str(
        r#"
level = "debug"
timezone = "utc"
location = true
"#,
    )
    .expect("parse");
    assert_eq!(config.level, "debug");
    assert_eq!(config.timezone, TimezoneConfig::Utc);
    assert!(config.location);
    assert!(!config.target);
    assert!(config.modules.is_empty());
}
