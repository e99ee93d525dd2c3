//! Extension trait implemented by every crate-level error type.

use std::any::Any;

use crate::StatusCode;

/// Common behaviour shared by all quill errors.
///
/// Callers branch on [`ErrorExt::status_code`]; the `Display` text is for
/// humans only.
pub trait ErrorExt: std::error::Error {
    /// Stable machine-readable classification of this error.
    fn status_code(&self) -> StatusCode;

    /// Returns the error as [`Any`] so callers can downcast.
    fn as_any(&self) -> &dyn Any;

    /// Whether the caller may retry. The engine itself never retries.
    fn is_retryable(&self) -> bool {
        self.status_code().is_retryable()
    }

    /// Message safe to surface to the model or user.
    ///
    /// Internal errors only expose their numeric code.
    fn output_msg(&self) -> String {
        match self.status_code() {
            StatusCode::Unknown | StatusCode::Internal => {
                format!("Internal error: {}", self.status_code() as i32)
            }
            _ => self.to_string(),
        }
    }
}

#[cfg(test)]
#[path = "ext.test.rs"]
mod tests;
