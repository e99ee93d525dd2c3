use super::*;

#[derive(Debug)]
struct CodedError {
    msg: &'static str,
    code: StatusCode,
}

impl std::fmt::Display for CodedError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.msg)
    }
}

impl std::error::Error for CodedError {}

impl ErrorExt for CodedError {
    fn status_code(&self) -> StatusCode {
        self.code
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

fn coded(msg: &'static str, code: StatusCode) -> CodedError {
    CodedError { msg, code }
}

#[test]
fn test_status_code_drives_retryable() {
    let err = coded("test error", StatusCode::InvalidArguments);
    assert_eq!(err.status_code(), StatusCode::InvalidArguments);
    assert_eq!(err.to_string(), "test error");
    assert!(!err.is_retryable());
}

#[test]
fn test_output_msg_hides_internal() {
    let err = coded("sensitive details", StatusCode::Internal);
    assert_eq!(err.output_msg(), "Internal error: 1001");
}

#[test]
fn test_output_msg_shows_user_errors() {
    let err = coded(
        "Search root is not a directory: /nope",
        StatusCode::InvalidArguments,
    );
    assert_eq!(err.output_msg(), "Search root is not a directory: /nope");
}

#[test]
fn test_downcast_through_as_any() {
    let err = coded("boom", StatusCode::SpawnFailed);
    let any = err.as_any();
    assert!(any.downcast_ref::<CodedError>().is_some());
}
