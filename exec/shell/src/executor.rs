//! Foreground command execution with timeout escalation and cancellation.
//!
//! Each run spawns one process through the host shell, in its own process
//! group. Process exit, the timeout and the cancellation token are raced;
//! whichever fires first decides the [`CommandOutcome`]. On timeout or
//! cancellation the group receives SIGTERM, then SIGKILL if it is still
//! alive after the grace period.

use std::collections::HashMap;
use std::path::Path;
use std::path::PathBuf;
use std::process::ExitStatus;
use std::process::Stdio;
use std::sync::Arc;
use std::sync::Mutex as StdMutex;
use std::sync::PoisonError;
use std::time::Duration;
use std::time::Instant;

use snafu::IntoError;
use snafu::ResultExt;
use snafu::ensure;
use tokio::io::AsyncRead;
use tokio::io::AsyncReadExt;
use tokio::process::Child;
use tokio::process::Command;
use tokio::task::JoinHandle;
use tracing::debug;
use tracing::info;
use tracing::warn;

use crate::command::CommandInvocation;
use crate::command::CommandOutcome;
use crate::command::CommandResult;
use crate::command::CommandSpec;
use crate::command::OutputSink;
use crate::command::OutputStream;
use crate::error::ShellError;
use crate::error::shell_error;
use crate::output::Utf8Decoder;
use crate::session::SessionStore;
use crate::shell::Shell;
use crate::shell::default_user_shell;
use crate::shell::join_command;
use crate::signal::ProcessSignal;
use crate::signal::exit_parts;

/// Timeout applied when an invocation does not set one.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// Time between SIGTERM and SIGKILL.
pub const DEFAULT_KILL_GRACE: Duration = Duration::from_secs(1);

pub(crate) const READ_CHUNK_BYTES: usize = 4096;

/// How long to wait for pipe readers once the process is gone. A detached
/// grandchild can keep a pipe open indefinitely.
pub(crate) const READER_JOIN_TIMEOUT: Duration = Duration::from_millis(500);

/// Runs shell commands to completion, timeout or cancellation.
///
/// Cheap to clone; clones share the session store.
#[derive(Debug, Clone)]
pub struct CommandRunner {
    shell: Shell,
    sessions: SessionStore,
    default_cwd: PathBuf,
    default_timeout: Duration,
    kill_grace: Duration,
}

/// A spec with session, cwd, env and shell already resolved.
#[derive(Debug, Clone)]
pub(crate) struct PreparedCommand {
    pub(crate) script: String,
    pub(crate) program: String,
    pub(crate) args: Vec<String>,
    pub(crate) cwd: PathBuf,
    pub(crate) env: HashMap<String, String>,
}

impl PreparedCommand {
    /// Piped stdout/stderr, null stdin, own process group, killed on drop.
    pub(crate) fn to_command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .current_dir(&self.cwd)
            .envs(&self.env)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        #[cfg(unix)]
        cmd.process_group(0);
        cmd
    }
}

enum Race {
    Exited(std::io::Result<ExitStatus>),
    TimedOut,
    Cancelled,
}

impl CommandRunner {
    /// Creates a runner using the user's default shell.
    pub fn new(default_cwd: impl Into<PathBuf>, sessions: SessionStore) -> Self {
        Self {
            shell: default_user_shell(),
            sessions,
            default_cwd: default_cwd.into(),
            default_timeout: DEFAULT_TIMEOUT,
            kill_grace: DEFAULT_KILL_GRACE,
        }
    }

    pub fn with_shell(mut self, shell: Shell) -> Self {
        self.shell = shell;
        self
    }

    pub fn with_default_timeout(mut self, timeout: Duration) -> Self {
        self.default_timeout = timeout;
        self
    }

    pub fn with_kill_grace(mut self, grace: Duration) -> Self {
        self.kill_grace = grace;
        self
    }

    pub fn shell(&self) -> &Shell {
        &self.shell
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    pub fn default_cwd(&self) -> &Path {
        &self.default_cwd
    }

    pub fn default_timeout(&self) -> Duration {
        self.default_timeout
    }

    pub fn kill_grace(&self) -> Duration {
        self.kill_grace
    }

    /// Runs one command.
    ///
    /// Timeouts, cancellations and nonzero exits are all `Ok`, told apart by
    /// [`CommandResult::outcome`]. `Err` means the command was malformed or
    /// could not be spawned, or, rarely, that waiting on it failed; that last
    /// case keeps the captured output in [`ShellError::partial_result`].
    pub async fn run(&self, invocation: CommandInvocation) -> Result<CommandResult, ShellError> {
        if invocation.cancel.is_cancelled() {
            debug!(command = %invocation.spec.command, "Command cancelled before start");
            return Ok(CommandResult::cancelled_before_start());
        }

        let prepared = self.prepare(&invocation.spec)?;
        let timeout = invocation.timeout.unwrap_or(self.default_timeout);
        let started = Instant::now();

        let mut child = prepared
            .to_command()
            .spawn()
            .context(shell_error::SpawnSnafu {
                command: prepared.script.clone(),
            })?;
        let pid = child.id();
        debug!(
            pid,
            command = %prepared.script,
            cwd = %prepared.cwd.display(),
            timeout_ms = timeout.as_millis() as u64,
            "Spawned command"
        );

        let stdout_buf = Arc::new(StdMutex::new(Vec::new()));
        let stderr_buf = Arc::new(StdMutex::new(Vec::new()));
        let readers: Vec<JoinHandle<()>> = [
            spawn_capture(
                child.stdout.take(),
                OutputStream::Stdout,
                Arc::clone(&stdout_buf),
                invocation.sink.clone(),
            ),
            spawn_capture(
                child.stderr.take(),
                OutputStream::Stderr,
                Arc::clone(&stderr_buf),
                invocation.sink.clone(),
            ),
        ]
        .into_iter()
        .flatten()
        .collect();

        let race = tokio::select! {
            status = child.wait() => Race::Exited(status),
            () = tokio::time::sleep(timeout) => Race::TimedOut,
            () = invocation.cancel.cancelled() => Race::Cancelled,
        };

        let (outcome, status) = match race {
            Race::Exited(status) => (CommandOutcome::Completed, status),
            Race::TimedOut => {
                info!(pid, timeout_ms = timeout.as_millis() as u64, "Command timed out");
                (CommandOutcome::TimedOut, self.terminate(&mut child, pid).await)
            }
            Race::Cancelled => {
                info!(pid, "Command cancelled");
                (CommandOutcome::Cancelled, self.terminate(&mut child, pid).await)
            }
        };

        join_readers(readers).await;
        let result = finish_result(
            outcome,
            status,
            pid,
            take_text(&stdout_buf),
            take_text(&stderr_buf),
            started.elapsed(),
        )?;
        debug!(
            pid,
            outcome = ?result.outcome,
            exit_code = ?result.exit_code,
            duration_ms = result.duration_ms,
            "Command finished"
        );
        Ok(result)
    }

    /// Resolves session, working directory, environment and shell argv.
    ///
    /// Working directory: the session's, else the call's, else the runner
    /// default. Environment: process, then session, then call; later wins.
    pub(crate) fn prepare(&self, spec: &CommandSpec) -> Result<PreparedCommand, ShellError> {
        ensure!(
            !spec.command.trim().is_empty(),
            shell_error::InvalidCommandSnafu {
                message: "command is empty",
            }
        );
        let script = join_command(&spec.command, &spec.args).map_err(|err| {
            shell_error::InvalidCommandSnafu {
                message: err.to_string(),
            }
            .build()
        })?;

        let session = spec
            .session_id
            .as_deref()
            .map(|id| self.sessions.get_or_create(id, spec.cwd.clone(), &spec.env));

        let cwd = session
            .as_ref()
            .and_then(|s| s.cwd.clone())
            .or_else(|| spec.cwd.clone())
            .unwrap_or_else(|| self.default_cwd.clone());
        let mut env = session.map(|s| s.env.clone()).unwrap_or_default();
        env.extend(spec.env.iter().map(|(k, v)| (k.clone(), v.clone())));

        let mut argv = self.shell.derive_exec_args(&script, false).into_iter();
        let program = argv.next().unwrap_or_default();
        Ok(PreparedCommand {
            script,
            program,
            args: argv.collect(),
            cwd,
            env,
        })
    }

    /// SIGTERM, then SIGKILL after the grace period; returns the exit status.
    async fn terminate(&self, child: &mut Child, pid: Option<u32>) -> std::io::Result<ExitStatus> {
        deliver(child, pid, ProcessSignal::Terminate);
        let status = match tokio::time::timeout(self.kill_grace, child.wait()).await {
            Ok(status) => status,
            Err(_) => {
                warn!(pid, "Process still running after grace period, sending SIGKILL");
                deliver(child, pid, ProcessSignal::Kill);
                child.wait().await
            }
        };
        // Sweep group members that outlived the leader.
        #[cfg(unix)]
        if let Some(pid) = pid {
            let _ = crate::signal::signal_process_group(pid, ProcessSignal::Kill);
        }
        status
    }
}

/// Signals the child's process group, falling back to the child itself.
pub(crate) fn deliver(child: &mut Child, pid: Option<u32>, signal: ProcessSignal) {
    #[cfg(unix)]
    if let Some(pid) = pid {
        match crate::signal::signal_process_group(pid, signal) {
            Ok(_) => return,
            Err(err) => warn!(pid, ?signal, "Failed to signal process group: {err}"),
        }
    }
    #[cfg(not(unix))]
    let _ = (pid, signal);
    if let Err(err) = child.start_kill() {
        debug!("start_kill failed: {err}");
    }
}

/// Copies a pipe into `buf`, forwarding decoded text to `sink`.
fn spawn_capture<R>(
    reader: Option<R>,
    stream: OutputStream,
    buf: Arc<StdMutex<Vec<u8>>>,
    sink: Option<Arc<dyn OutputSink>>,
) -> Option<JoinHandle<()>>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    let mut reader = reader?;
    Some(tokio::spawn(async move {
        let mut chunk = vec![0u8; READ_CHUNK_BYTES];
        let mut decoder = Utf8Decoder::default();
        loop {
            match reader.read(&mut chunk).await {
                Ok(0) => break,
                Ok(n) => {
                    buf.lock()
                        .unwrap_or_else(PoisonError::into_inner)
                        .extend_from_slice(&chunk[..n]);
                    if let Some(sink) = &sink {
                        let text = decoder.decode(&chunk[..n]);
                        if !text.is_empty() {
                            sink.on_output(stream, &text);
                        }
                    }
                }
                Err(err) => {
                    debug!(?stream, "Output read failed: {err}");
                    break;
                }
            }
        }
        if let Some(sink) = &sink {
            let rest = decoder.finish();
            if !rest.is_empty() {
                sink.on_output(stream, &rest);
            }
        }
    }))
}

/// Waits briefly for each reader to hit EOF, aborting stragglers.
pub(crate) async fn join_readers(readers: Vec<JoinHandle<()>>) {
    for mut handle in readers {
        if tokio::time::timeout(READER_JOIN_TIMEOUT, &mut handle)
            .await
            .is_err()
        {
            debug!("Output reader still open after process exit, aborting");
            handle.abort();
        }
    }
}

/// Assembles the result once the readers are joined. A failed wait still
/// hands back the captured output inside [`ShellError::Wait`].
pub(crate) fn finish_result(
    outcome: CommandOutcome,
    status: std::io::Result<ExitStatus>,
    pid: Option<u32>,
    stdout: String,
    stderr: String,
    elapsed: Duration,
) -> Result<CommandResult, ShellError> {
    let mut result = CommandResult {
        outcome,
        stdout,
        stderr,
        exit_code: None,
        signal: None,
        duration_ms: elapsed.as_millis() as u64,
        pid,
    };
    match status {
        Ok(status) => {
            (result.exit_code, result.signal) = exit_parts(status);
            Ok(result)
        }
        Err(source) => Err(shell_error::WaitSnafu {
            pid: pid.unwrap_or_default(),
            partial: Box::new(result),
        }
        .into_error(source)),
    }
}

fn take_text(buf: &StdMutex<Vec<u8>>) -> String {
    let bytes = std::mem::take(&mut *buf.lock().unwrap_or_else(PoisonError::into_inner));
    String::from_utf8(bytes).unwrap_or_else(|err| String::from_utf8_lossy(err.as_bytes()).into_owned())
}

#[cfg(test)]
#[path = "executor.test.rs"]
mod tests;
