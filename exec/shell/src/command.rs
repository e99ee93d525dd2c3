//! Command invocation and result types.

use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use quill_error::StatusCode;
use serde::Deserialize;
use serde::Serialize;
use tokio_util::sync::CancellationToken;

/// What to run and where; shared by foreground and background execution.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandSpec {
    /// Shell script, passed to the host shell as-is.
    pub command: String,
    /// Extra arguments, quoted and appended to `command`.
    pub args: Vec<String>,
    pub cwd: Option<PathBuf>,
    /// Per-call environment; wins over session and process environment.
    pub env: HashMap<String, String>,
    /// Session whose first-seen cwd and env this call runs in.
    pub session_id: Option<String>,
}

impl CommandSpec {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            ..Self::default()
        }
    }

    pub fn with_args(mut self, args: Vec<String>) -> Self {
        self.args = args;
        self
    }

    pub fn with_cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = Some(cwd.into());
        self
    }

    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    pub fn with_session(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }
}

/// Which pipe a chunk of output came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputStream {
    Stdout,
    Stderr,
}

/// Receives output chunks as they are read, for live display.
///
/// Chunks arrive in emission order per stream; stdout and stderr are not
/// ordered relative to each other. Chunks never split a UTF-8 sequence.
pub trait OutputSink: Send + Sync {
    fn on_output(&self, stream: OutputStream, chunk: &str);
}

/// A foreground command run.
#[derive(Clone, Default)]
pub struct CommandInvocation {
    pub spec: CommandSpec,
    /// Falls back to the runner default when `None`.
    pub timeout: Option<Duration>,
    pub cancel: CancellationToken,
    pub sink: Option<Arc<dyn OutputSink>>,
}

impl fmt::Debug for CommandInvocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandInvocation")
            .field("spec", &self.spec)
            .field("timeout", &self.timeout)
            .field("cancelled", &self.cancel.is_cancelled())
            .field("sink", &self.sink.is_some())
            .finish()
    }
}

impl CommandInvocation {
    pub fn new(command: impl Into<String>) -> Self {
        Self::from_spec(CommandSpec::new(command))
    }

    pub fn from_spec(spec: CommandSpec) -> Self {
        Self {
            spec,
            ..Self::default()
        }
    }

    pub fn with_args(mut self, args: Vec<String>) -> Self {
        self.spec.args = args;
        self
    }

    pub fn with_cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.spec.cwd = Some(cwd.into());
        self
    }

    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.spec.env.insert(key.into(), value.into());
        self
    }

    pub fn with_session(mut self, session_id: impl Into<String>) -> Self {
        self.spec.session_id = Some(session_id.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_cancel(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn with_sink(mut self, sink: Arc<dyn OutputSink>) -> Self {
        self.sink = Some(sink);
        self
    }
}

/// How a foreground run ended. Exactly one applies per run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandOutcome {
    /// The process exited on its own, with any exit code.
    Completed,
    /// The timeout fired first and the process was terminated.
    TimedOut,
    /// The cancellation token fired first and the process was terminated.
    Cancelled,
}

impl CommandOutcome {
    pub fn status_code(self) -> StatusCode {
        match self {
            CommandOutcome::Completed => StatusCode::Success,
            CommandOutcome::TimedOut => StatusCode::Timeout,
            CommandOutcome::Cancelled => StatusCode::Cancelled,
        }
    }
}

/// Result of a foreground run.
///
/// Output captured before a timeout or cancellation is always kept.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandResult {
    pub outcome: CommandOutcome,
    pub stdout: String,
    pub stderr: String,
    /// `None` when the process was ended by a signal.
    pub exit_code: Option<i32>,
    /// Terminating signal number, Unix only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signal: Option<i32>,
    /// Wall-clock duration in milliseconds.
    pub duration_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pid: Option<u32>,
}

impl CommandResult {
    /// A run cancelled before anything was spawned.
    pub(crate) fn cancelled_before_start() -> Self {
        Self {
            outcome: CommandOutcome::Cancelled,
            stdout: String::new(),
            stderr: String::new(),
            exit_code: None,
            signal: None,
            duration_ms: 0,
            pid: None,
        }
    }

    pub fn is_completed(&self) -> bool {
        self.outcome == CommandOutcome::Completed
    }

    /// Completed with exit code 0.
    pub fn exited_successfully(&self) -> bool {
        self.is_completed() && self.exit_code == Some(0)
    }
}

#[cfg(test)]
#[path = "command.test.rs"]
mod tests;
