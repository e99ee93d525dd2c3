//! Background process tracking.
//!
//! A background process outlives the call that started it. Its output
//! accumulates in bounded pending buffers that callers drain by polling
//! [`BackgroundProcessRegistry::consume_output`]. Entries stay registered
//! after the process exits so final output and status remain readable; only
//! [`BackgroundProcessRegistry::kill_all`] removes them.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex as StdMutex;
use std::sync::MutexGuard;
use std::sync::PoisonError;
use std::time::Duration;

use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;
use snafu::IntoError;
use snafu::OptionExt;
use tokio::io::AsyncRead;
use tokio::io::AsyncReadExt;
use tokio::process::Child;
use tokio::sync::Mutex;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use tracing::info;
use tracing::warn;
use uuid::Uuid;

use crate::command::CommandSpec;
use crate::command::OutputStream;
use crate::error::ShellError;
use crate::error::shell_error;
use crate::executor::CommandRunner;
use crate::executor::READ_CHUNK_BYTES;
use crate::executor::join_readers;
use crate::output::PendingBuffer;
use crate::output::Utf8Decoder;
use crate::signal::SignalOutcome;
use crate::signal::exit_parts;

/// Default cap on each pending output stream.
pub const DEFAULT_MAX_PENDING_BYTES: usize = 1024 * 1024;

/// Lifecycle state of a background process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProcessStatus {
    Running,
    /// Exited on its own.
    Exited,
    /// Terminated through [`BackgroundProcessRegistry::kill`]. Never
    /// overwritten by the later exit notification.
    Killed,
    /// Failed to spawn, or waiting on it failed.
    Error,
}

impl ProcessStatus {
    pub fn is_running(self) -> bool {
        self == ProcessStatus::Running
    }
}

/// Metadata of a background process, without its output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessInfo {
    pub id: String,
    pub command: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pid: Option<u32>,
    pub status: ProcessStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exit_code: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signal: Option<i32>,
    pub started_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ended_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

/// Status plus the output produced since the previous drain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackgroundSnapshot {
    #[serde(flatten)]
    pub info: ProcessInfo,
    pub stdout: String,
    pub stderr: String,
    /// Bytes discarded from stdout because the pending cap was exceeded.
    pub dropped_stdout_bytes: u64,
    pub dropped_stderr_bytes: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KillResult {
    pub id: String,
    /// The process was no longer running; nothing was signalled.
    pub already_exited: bool,
    pub status: ProcessStatus,
}

#[derive(Debug)]
struct ProcessState {
    status: ProcessStatus,
    exit_code: Option<i32>,
    signal: Option<i32>,
    ended_at: Option<DateTime<Utc>>,
    error_message: Option<String>,
    stdout: PendingBuffer,
    stderr: PendingBuffer,
}

#[derive(Debug)]
struct ProcessHandle {
    id: String,
    command: String,
    session_id: Option<String>,
    pid: Option<u32>,
    started_at: DateTime<Utc>,
    /// Asks the monitor task to kill the child where process groups are
    /// unavailable.
    kill_token: CancellationToken,
    state: StdMutex<ProcessState>,
    status_tx: watch::Sender<ProcessStatus>,
}

impl ProcessHandle {
    fn new(
        id: String,
        command: String,
        session_id: Option<String>,
        pid: Option<u32>,
        max_pending_bytes: usize,
    ) -> Self {
        let (status_tx, _) = watch::channel(ProcessStatus::Running);
        Self {
            id,
            command,
            session_id,
            pid,
            started_at: Utc::now(),
            kill_token: CancellationToken::new(),
            state: StdMutex::new(ProcessState {
                status: ProcessStatus::Running,
                exit_code: None,
                signal: None,
                ended_at: None,
                error_message: None,
                stdout: PendingBuffer::new(max_pending_bytes),
                stderr: PendingBuffer::new(max_pending_bytes),
            }),
            status_tx,
        }
    }

    fn lock_state(&self) -> MutexGuard<'_, ProcessState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn set_status(&self, state: &mut ProcessState, status: ProcessStatus) {
        state.status = status;
        self.status_tx.send_replace(status);
    }

    fn append(&self, stream: OutputStream, text: &str) {
        let mut state = self.lock_state();
        match stream {
            OutputStream::Stdout => state.stdout.push(text),
            OutputStream::Stderr => state.stderr.push(text),
        }
    }

    /// Records a failure: status `Error`, message also visible on stderr.
    fn fail(&self, message: String) {
        let mut state = self.lock_state();
        state.stderr.push(&message);
        state.stderr.push("\n");
        state.error_message = Some(message);
        state.ended_at = Some(Utc::now());
        if state.status.is_running() {
            self.set_status(&mut state, ProcessStatus::Error);
        }
    }

    fn info_from(&self, state: &ProcessState) -> ProcessInfo {
        ProcessInfo {
            id: self.id.clone(),
            command: self.command.clone(),
            session_id: self.session_id.clone(),
            pid: self.pid,
            status: state.status,
            exit_code: state.exit_code,
            signal: state.signal,
            started_at: self.started_at,
            ended_at: state.ended_at,
            error_message: state.error_message.clone(),
        }
    }

    /// SIGTERM to the process group, or a kill request to the monitor.
    fn terminate(&self) -> std::io::Result<SignalOutcome> {
        #[cfg(unix)]
        if let Some(pid) = self.pid {
            return crate::signal::signal_process_group(
                pid,
                crate::signal::ProcessSignal::Terminate,
            );
        }
        self.kill_token.cancel();
        Ok(SignalOutcome::Delivered)
    }
}

/// Registry of background processes, keyed by generated id.
///
/// Cheap to clone; clones share the same registry.
#[derive(Debug, Clone)]
pub struct BackgroundProcessRegistry {
    runner: CommandRunner,
    processes: Arc<Mutex<HashMap<String, Arc<ProcessHandle>>>>,
    max_pending_bytes: usize,
}

impl BackgroundProcessRegistry {
    /// Creates a registry that resolves sessions, cwd and shell through `runner`.
    pub fn new(runner: CommandRunner) -> Self {
        Self {
            runner,
            processes: Arc::new(Mutex::new(HashMap::new())),
            max_pending_bytes: DEFAULT_MAX_PENDING_BYTES,
        }
    }

    pub fn with_max_pending_bytes(mut self, max_pending_bytes: usize) -> Self {
        self.max_pending_bytes = max_pending_bytes;
        self
    }

    /// Starts `spec` in the background and returns its id.
    ///
    /// A spawn failure still registers an entry, in status `Error` with the
    /// OS message on stderr, so it is observable through polling. Only a
    /// malformed command is rejected outright.
    pub async fn start(&self, spec: CommandSpec) -> Result<String, ShellError> {
        let prepared = self.runner.prepare(&spec)?;
        let id = format!("bg-{}", Uuid::new_v4().simple());

        let handle = match prepared.to_command().spawn() {
            Ok(mut child) => {
                let handle = Arc::new(ProcessHandle::new(
                    id.clone(),
                    prepared.script.clone(),
                    spec.session_id.clone(),
                    child.id(),
                    self.max_pending_bytes,
                ));
                let readers: Vec<JoinHandle<()>> = [
                    child
                        .stdout
                        .take()
                        .map(|r| spawn_pending_reader(r, Arc::clone(&handle), OutputStream::Stdout)),
                    child
                        .stderr
                        .take()
                        .map(|r| spawn_pending_reader(r, Arc::clone(&handle), OutputStream::Stderr)),
                ]
                .into_iter()
                .flatten()
                .collect();
                tokio::spawn(monitor(child, Arc::clone(&handle), readers));
                info!(
                    id = %id,
                    pid = handle.pid,
                    command = %prepared.script,
                    "Started background process"
                );
                handle
            }
            Err(err) => {
                warn!(id = %id, command = %prepared.script, "Background spawn failed: {err}");
                let handle = Arc::new(ProcessHandle::new(
                    id.clone(),
                    prepared.script.clone(),
                    spec.session_id.clone(),
                    None,
                    self.max_pending_bytes,
                ));
                handle.fail(format!("Failed to spawn `{}`: {err}", prepared.script));
                handle
            }
        };

        self.processes.lock().await.insert(id.clone(), handle);
        Ok(id)
    }

    /// Returns status and metadata plus the output pending since the last
    /// call, then clears the pending buffers.
    pub async fn consume_output(&self, id: &str) -> Result<BackgroundSnapshot, ShellError> {
        let handle = self.get(id).await?;
        let mut state = handle.lock_state();
        let (stdout, dropped_stdout_bytes) = state.stdout.take();
        let (stderr, dropped_stderr_bytes) = state.stderr.take();
        Ok(BackgroundSnapshot {
            info: handle.info_from(&state),
            stdout,
            stderr,
            dropped_stdout_bytes,
            dropped_stderr_bytes,
        })
    }

    /// Metadata without draining output.
    pub async fn info(&self, id: &str) -> Result<ProcessInfo, ShellError> {
        let handle = self.get(id).await?;
        let state = handle.lock_state();
        Ok(handle.info_from(&state))
    }

    /// Sends SIGTERM to a running process and marks it `Killed` at once.
    ///
    /// A process that is no longer running yields `already_exited = true`.
    pub async fn kill(&self, id: &str) -> Result<KillResult, ShellError> {
        let handle = self.get(id).await?;
        let mut state = handle.lock_state();
        if !state.status.is_running() {
            return Ok(KillResult {
                id: id.to_string(),
                already_exited: true,
                status: state.status,
            });
        }

        match handle.terminate() {
            Ok(SignalOutcome::Delivered) => {
                handle.set_status(&mut state, ProcessStatus::Killed);
                info!(id, pid = handle.pid, "Killed background process");
                Ok(KillResult {
                    id: id.to_string(),
                    already_exited: false,
                    status: ProcessStatus::Killed,
                })
            }
            Ok(SignalOutcome::NotRunning) => Ok(KillResult {
                id: id.to_string(),
                already_exited: true,
                status: state.status,
            }),
            Err(source) => Err(shell_error::SignalSnafu {
                pid: handle.pid.unwrap_or_default(),
            }
            .into_error(source)),
        }
    }

    /// Best-effort SIGTERM to every running process, then empties the
    /// registry. Returns how many processes were signalled.
    pub async fn kill_all(&self) -> usize {
        let handles: Vec<Arc<ProcessHandle>> = self
            .processes
            .lock()
            .await
            .drain()
            .map(|(_, handle)| handle)
            .collect();

        let mut killed = 0;
        for handle in &handles {
            let mut state = handle.lock_state();
            if !state.status.is_running() {
                continue;
            }
            match handle.terminate() {
                Ok(SignalOutcome::Delivered) => {
                    handle.set_status(&mut state, ProcessStatus::Killed);
                    killed += 1;
                }
                Ok(SignalOutcome::NotRunning) => {}
                Err(err) => warn!(id = %handle.id, "Failed to kill background process: {err}"),
            }
        }
        info!(killed, total = handles.len(), "Cleared background processes");
        killed
    }

    /// Waits until the process leaves `Running` or `timeout` elapses, and
    /// returns the status at that point.
    pub async fn wait(&self, id: &str, timeout: Duration) -> Result<ProcessStatus, ShellError> {
        let handle = self.get(id).await?;
        let mut rx = handle.status_tx.subscribe();
        if tokio::time::timeout(timeout, rx.wait_for(|status| !status.is_running()))
            .await
            .is_err()
        {
            debug!(id, "Wait timed out with process still running");
        }
        let status = handle.lock_state().status;
        Ok(status)
    }

    /// Metadata of every entry, oldest first. Does not drain output.
    pub async fn list(&self) -> Vec<ProcessInfo> {
        let handles: Vec<Arc<ProcessHandle>> =
            self.processes.lock().await.values().cloned().collect();
        let mut infos: Vec<ProcessInfo> = handles
            .iter()
            .map(|handle| handle.info_from(&handle.lock_state()))
            .collect();
        infos.sort_by(|a, b| a.started_at.cmp(&b.started_at).then_with(|| a.id.cmp(&b.id)));
        infos
    }

    pub async fn len(&self) -> usize {
        self.processes.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.processes.lock().await.is_empty()
    }

    async fn get(&self, id: &str) -> Result<Arc<ProcessHandle>, ShellError> {
        self.processes
            .lock()
            .await
            .get(id)
            .cloned()
            .context(shell_error::ProcessNotFoundSnafu { id })
    }
}

/// Waits for the child to exit and records the final state.
async fn monitor(mut child: Child, handle: Arc<ProcessHandle>, readers: Vec<JoinHandle<()>>) {
    let status = tokio::select! {
        status = child.wait() => status,
        () = handle.kill_token.cancelled() => {
            if let Err(err) = child.start_kill() {
                debug!(id = %handle.id, "start_kill failed: {err}");
            }
            child.wait().await
        }
    };
    // Output must be complete before the status leaves Running.
    join_readers(readers).await;

    match status {
        Ok(status) => {
            let (exit_code, signal) = exit_parts(status);
            let mut state = handle.lock_state();
            state.exit_code = exit_code;
            state.signal = signal;
            state.ended_at = Some(Utc::now());
            if state.status.is_running() {
                handle.set_status(&mut state, ProcessStatus::Exited);
            }
            debug!(
                id = %handle.id,
                status = ?state.status,
                exit_code = ?exit_code,
                signal = ?signal,
                "Background process closed"
            );
        }
        Err(err) => {
            warn!(id = %handle.id, "Waiting on background process failed: {err}");
            handle.fail(format!("Failed to wait for process: {err}"));
        }
    }
}

fn spawn_pending_reader<R>(
    mut reader: R,
    handle: Arc<ProcessHandle>,
    stream: OutputStream,
) -> JoinHandle<()>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut chunk = vec![0u8; READ_CHUNK_BYTES];
        let mut decoder = Utf8Decoder::default();
        loop {
            match reader.read(&mut chunk).await {
                Ok(0) => break,
                Ok(n) => {
                    let text = decoder.decode(&chunk[..n]);
                    if !text.is_empty() {
                        handle.append(stream, &text);
                    }
                }
                Err(err) => {
                    debug!(id = %handle.id, ?stream, "Output read failed: {err}");
                    break;
                }
            }
        }
        let rest = decoder.finish();
        if !rest.is_empty() {
            handle.append(stream, &rest);
        }
    })
}

#[cfg(test)]
#[path = "background.test.rs"]
mod tests;
