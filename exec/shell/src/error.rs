//! Error types for command execution.

use quill_error::ErrorExt;
use quill_error::Location;
use quill_error::StatusCode;
use snafu::Snafu;

use crate::command::CommandResult;

/// Shell execution errors.
///
/// Timeouts and cancellations are not errors: they are reported through
/// [`crate::CommandOutcome`] together with the output captured so far.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)), module)]
pub enum ShellError {
    /// The command line was empty or could not be assembled.
    #[snafu(display("Invalid command: {message}"))]
    InvalidCommand {
        message: String,
        #[snafu(implicit)]
        location: Location,
    },

    /// The OS refused to create the process.
    #[snafu(display("Failed to spawn `{command}`: {source}"))]
    Spawn {
        command: String,
        source: std::io::Error,
        #[snafu(implicit)]
        location: Location,
    },

    /// Waiting on a spawned process failed. `partial` holds the output
    /// captured before the failure.
    #[snafu(display("Failed to wait for process {pid}: {source}"))]
    Wait {
        pid: u32,
        partial: Box<CommandResult>,
        source: std::io::Error,
        #[snafu(implicit)]
        location: Location,
    },

    /// Delivering a signal to a running process failed.
    #[snafu(display("Failed to signal process {pid}: {source}"))]
    Signal {
        pid: u32,
        source: std::io::Error,
        #[snafu(implicit)]
        location: Location,
    },

    /// No background process is registered under this id.
    #[snafu(display("Background process not found: {id}"))]
    ProcessNotFound {
        id: String,
        #[snafu(implicit)]
        location: Location,
    },
}

impl ShellError {
    /// Whether this is the spawn-failure outcome.
    pub fn is_spawn_error(&self) -> bool {
        matches!(self, ShellError::Spawn { .. })
    }

    /// Output captured before the error, when a process had already run.
    pub fn partial_result(&self) -> Option<&CommandResult> {
        match self {
            ShellError::Wait { partial, .. } => Some(&**partial),
            _ => None,
        }
    }
}

impl ErrorExt for ShellError {
    fn status_code(&self) -> StatusCode {
        match self {
            ShellError::InvalidCommand { .. } => StatusCode::InvalidArguments,
            ShellError::Spawn { .. } => StatusCode::SpawnFailed,
            ShellError::Wait { .. } => StatusCode::IoError,
            ShellError::Signal { .. } => StatusCode::SignalFailed,
            ShellError::ProcessNotFound { .. } => StatusCode::NotFound,
        }
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}
