//! Shell command execution for the tool engine.
//!
//! This crate provides:
//! - Foreground runs with a timeout, cancellation and SIGTERM/SIGKILL
//!   escalation ([`CommandRunner`])
//! - Session contexts that pin a cwd and environment across calls
//!   ([`SessionStore`])
//! - Background processes with drain-on-read output ([`BackgroundProcessRegistry`])
//!
//! Every child runs in its own process group on Unix, so signals reach the
//! whole pipeline a shell script starts.
//!
//! ```no_run
//! use quill_shell::CommandInvocation;
//! use quill_shell::CommandRunner;
//! use quill_shell::SessionStore;
//! use std::time::Duration;
//!
//! # async fn example() -> Result<(), quill_shell::ShellError> {
//! let runner = CommandRunner::new("/project", SessionStore::new());
//! let result = runner
//!     .run(CommandInvocation::new("cargo --version").with_timeout(Duration::from_secs(10)))
//!     .await?;
//! println!("{:?} exit={:?}", result.outcome, result.exit_code);
//! # Ok(())
//! # }
//! ```

mod background;
mod command;
mod error;
mod executor;
mod output;
mod session;
mod shell;
mod signal;

pub use background::BackgroundProcessRegistry;
pub use background::BackgroundSnapshot;
pub use background::DEFAULT_MAX_PENDING_BYTES;
pub use background::KillResult;
pub use background::ProcessInfo;
pub use background::ProcessStatus;
pub use command::CommandInvocation;
pub use command::CommandOutcome;
pub use command::CommandResult;
pub use command::CommandSpec;
pub use command::OutputSink;
pub use command::OutputStream;
pub use error::ShellError;
pub use executor::CommandRunner;
pub use executor::DEFAULT_KILL_GRACE;
pub use executor::DEFAULT_TIMEOUT;
pub use session::SessionContext;
pub use session::SessionStore;
pub use shell::Shell;
pub use shell::ShellType;
pub use shell::default_user_shell;
pub use shell::detect_shell_type;
pub use shell::join_command;
pub use signal::ProcessSignal;
pub use signal::SignalOutcome;
#[cfg(unix)]
pub use signal::is_process_alive;
#[cfg(unix)]
pub use signal::signal_process_group;
