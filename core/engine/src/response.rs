//! Uniform envelope returned by every engine operation.

use quill_error::ErrorExt;
use quill_error::StatusCode;
use quill_shell::CommandOutcome;
use quill_shell::CommandResult;
use quill_utils_common::format_millis;
use serde::Serialize;
use serde::Serializer;

/// Result of one tool call.
///
/// `status` is the machine-readable discriminant; `message` is display text
/// only. A timed-out or cancelled command carries its captured output in
/// `partial`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToolResponse<T> {
    #[serde(serialize_with = "serialize_status")]
    pub status: StatusCode,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub partial: Option<CommandResult>,
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn serialize_status<S: Serializer>(status: &StatusCode, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(status.name())
}

impl<T> ToolResponse<T> {
    pub fn ok(payload: T) -> Self {
        Self {
            status: StatusCode::Success,
            success: true,
            payload: Some(payload),
            message: None,
            partial: None,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// A failed call, classified by the error's status code.
    pub fn from_error(err: &dyn ErrorExt) -> Self {
        Self {
            status: err.status_code(),
            success: false,
            payload: None,
            message: Some(err.output_msg()),
            partial: None,
        }
    }

    /// Attaches output captured before a failure.
    pub fn with_partial(mut self, partial: Option<CommandResult>) -> Self {
        self.partial = partial;
        self
    }

    pub fn is_success(&self) -> bool {
        self.success
    }

    /// The payload of a successful call.
    pub fn into_payload(self) -> Option<T> {
        self.payload
    }
}

impl ToolResponse<CommandResult> {
    /// Maps a foreground result onto the envelope.
    ///
    /// Any process that exited on its own is a success, whatever its exit
    /// code. Timeouts and cancellations fail with the output in `partial`.
    pub fn from_command(result: CommandResult, timeout_ms: u64) -> Self {
        match result.outcome {
            CommandOutcome::Completed => {
                let message = match (result.exit_code, result.signal) {
                    (Some(code), _) => format!("Exit code {code}"),
                    (None, Some(signal)) => format!("Terminated by signal {signal}"),
                    (None, None) => "Process exited".to_string(),
                };
                Self::ok(result).with_message(message)
            }
            CommandOutcome::TimedOut => Self::interrupted(
                result,
                format!("Command timed out after {}", format_millis(timeout_ms)),
            ),
            CommandOutcome::Cancelled => {
                Self::interrupted(result, "Command was cancelled".to_string())
            }
        }
    }

    fn interrupted(result: CommandResult, message: String) -> Self {
        Self {
            status: result.outcome.status_code(),
            success: false,
            payload: None,
            message: Some(message),
            partial: Some(result),
        }
    }
}

#[cfg(test)]
#[path = "response.test.rs"]
mod tests;
