use super::*;
use strum::IntoEnumIterator;

#[test]
fn test_status_code_values() {
    assert_eq!(StatusCode::Success as i32, 00_000);
    assert_eq!(StatusCode::Unknown as i32, 01_000);
    assert_eq!(StatusCode::InvalidArguments as i32, 02_000);
    assert_eq!(StatusCode::IoError as i32, 03_000);

    assert_eq!(StatusCode::InvalidConfig as i32, 10_000);
    assert_eq!(StatusCode::SpawnFailed as i32, 11_000);
    assert_eq!(StatusCode::Timeout as i32, 12_003);
}

#[test]
fn test_is_success() {
    assert!(StatusCode::is_success(0));
    assert!(!StatusCode::is_success(01_000));
}

#[test]
fn test_nothing_in_the_engine_is_retryable() {
    // Retry policy belongs to callers, so no code advertises itself as retryable.
    for code in StatusCode::iter() {
        assert!(!code.is_retryable(), "{code} should not be retryable");
    }
}

#[test]
fn test_should_log_error() {
    assert!(StatusCode::Unknown.should_log_error());
    assert!(StatusCode::Internal.should_log_error());
    assert!(StatusCode::SpawnFailed.should_log_error());
    assert!(!StatusCode::InvalidArguments.should_log_error());
    assert!(!StatusCode::Cancelled.should_log_error());
}

#[test]
fn test_category() {
    assert_eq!(StatusCode::Cancelled.category(), StatusCategory::Common);
    assert_eq!(StatusCode::InvalidArguments.category(), StatusCategory::Input);
    assert_eq!(StatusCode::SpawnFailed.category(), StatusCategory::Process);
    assert_eq!(StatusCode::Timeout.category(), StatusCategory::Resource);
}

#[test]
fn test_display() {
    assert_eq!(format!("{}", StatusCode::Success), "Success");
    assert_eq!(format!("{}", StatusCode::SpawnFailed), "SpawnFailed");
}

#[test]
fn test_name_matches_as_ref() {
    for code in StatusCode::iter() {
        assert_eq!(code.name(), code.as_ref());
    }
}

#[test]
fn test_from_i32_round_trip() {
    for code in StatusCode::iter() {
        assert_eq!(StatusCode::from_i32(code as i32), Some(code));
    }
    assert_eq!(StatusCode::from_i32(99_999), None);
}
