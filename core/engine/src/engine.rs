//! The long-lived engine instance.
//!
//! One [`ToolEngine`] owns every piece of shared state: the path filter
//! cache, the session store and the background registry. Independent
//! engines share nothing, so tests can build as many as they need.

use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;
use std::time::Duration;

use quill_error::ErrorExt;
use quill_file_ignore::FilterCache;
use quill_file_search::SearchRequest;
use quill_file_search::SearchResult;
use quill_file_search::search;
use quill_shell::BackgroundProcessRegistry;
use quill_shell::BackgroundSnapshot;
use quill_shell::CommandInvocation;
use quill_shell::CommandResult;
use quill_shell::CommandRunner;
use quill_shell::CommandSpec;
use quill_shell::KillResult;
use quill_shell::ProcessInfo;
use quill_shell::ProcessStatus;
use quill_shell::SessionStore;
use quill_shell::Shell;
use snafu::ResultExt;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use tracing::info;
use tracing::warn;

use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::error::engine_error;
use crate::response::ToolResponse;

/// Parameters of a glob call. Unset fields fall back to engine defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GlobParams {
    pub pattern: String,
    /// Search root; relative paths resolve against the workspace root.
    pub root: Option<PathBuf>,
    pub max_results: Option<usize>,
    pub include_directories: bool,
    pub case_sensitive: bool,
    /// Appended after the configured extra excludes.
    pub extra_excludes: Vec<String>,
}

impl GlobParams {
    pub fn new(pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            ..Self::default()
        }
    }
}

#[derive(Debug)]
pub struct ToolEngine {
    workspace_root: PathBuf,
    config: EngineConfig,
    filter_cache: Arc<FilterCache>,
    runner: CommandRunner,
    background: BackgroundProcessRegistry,
    shut_down: AtomicBool,
}

impl ToolEngine {
    pub fn new(workspace_root: impl Into<PathBuf>, config: EngineConfig) -> Self {
        let workspace_root = workspace_root.into();
        let runner = CommandRunner::new(workspace_root.clone(), SessionStore::new())
            .with_default_timeout(config.default_timeout())
            .with_kill_grace(config.kill_grace());
        let background = BackgroundProcessRegistry::new(runner.clone())
            .with_max_pending_bytes(config.max_pending_output_bytes);
        Self {
            workspace_root,
            filter_cache: Arc::new(FilterCache::new(config.filter_cache_ttl())),
            config,
            runner,
            background,
            shut_down: AtomicBool::new(false),
        }
    }

    /// Replaces the host shell. Call before running anything.
    pub fn with_shell(mut self, shell: Shell) -> Self {
        self.runner = self.runner.with_shell(shell);
        self.background = BackgroundProcessRegistry::new(self.runner.clone())
            .with_max_pending_bytes(self.config.max_pending_output_bytes);
        self
    }

    pub fn workspace_root(&self) -> &Path {
        &self.workspace_root
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn sessions(&self) -> &SessionStore {
        self.runner.sessions()
    }

    pub fn filter_cache(&self) -> &Arc<FilterCache> {
        &self.filter_cache
    }

    /// Glob search under the workspace (or `params.root`).
    pub async fn glob(
        &self,
        params: GlobParams,
        cancel: CancellationToken,
    ) -> ToolResponse<SearchResult> {
        let root = match params.root {
            Some(root) if root.is_relative() => self.workspace_root.join(root),
            Some(root) => root,
            None => self.workspace_root.clone(),
        };
        let mut excludes = self.config.extra_excludes.clone();
        excludes.extend(params.extra_excludes);
        let request = SearchRequest::new(root, params.pattern)
            .with_max_results(params.max_results.unwrap_or(self.config.default_max_results))
            .with_directories(params.include_directories)
            .with_case_sensitive(params.case_sensitive)
            .with_excludes(excludes)
            .with_cancel(cancel);

        match search(&request, &self.filter_cache)
            .await
            .context(engine_error::SearchSnafu)
        {
            Ok(result) => {
                let message = result.summary();
                ToolResponse::ok(result).with_message(message)
            }
            Err(err) => failure(&err),
        }
    }

    /// Runs a foreground command. Nonzero exits succeed; timeouts and
    /// cancellations fail with the captured output in `partial`.
    ///
    /// Rejected with `Cancelled` once the engine has shut down.
    pub async fn run(&self, invocation: CommandInvocation) -> ToolResponse<CommandResult> {
        if self.is_shut_down() {
            return failure(&engine_error::ShutDownSnafu.build());
        }
        let timeout = invocation.timeout.unwrap_or(self.runner.default_timeout());
        match self
            .runner
            .run(invocation)
            .await
            .context(engine_error::ShellSnafu)
        {
            Ok(result) => ToolResponse::from_command(result, timeout.as_millis() as u64),
            Err(err) => {
                let partial = err.partial_result().cloned();
                failure(&err).with_partial(partial)
            }
        }
    }

    /// Starts a background process and returns its id.
    pub async fn start_background(&self, spec: CommandSpec) -> ToolResponse<String> {
        if self.is_shut_down() {
            return failure(&engine_error::ShutDownSnafu.build());
        }
        match self
            .background
            .start(spec)
            .await
            .context(engine_error::ShellSnafu)
        {
            Ok(id) => {
                let message = format!("Started background process {id}");
                ToolResponse::ok(id).with_message(message)
            }
            Err(err) => failure(&err),
        }
    }

    /// Drains a background process's pending output.
    pub async fn consume_output(&self, id: &str) -> ToolResponse<BackgroundSnapshot> {
        match self
            .background
            .consume_output(id)
            .await
            .context(engine_error::ShellSnafu)
        {
            Ok(snapshot) => ToolResponse::ok(snapshot),
            Err(err) => failure(&err),
        }
    }

    pub async fn kill(&self, id: &str) -> ToolResponse<KillResult> {
        match self
            .background
            .kill(id)
            .await
            .context(engine_error::ShellSnafu)
        {
            Ok(result) => {
                let message = if result.already_exited {
                    format!("Process {id} was not running")
                } else {
                    format!("Sent SIGTERM to process {id}")
                };
                ToolResponse::ok(result).with_message(message)
            }
            Err(err) => failure(&err),
        }
    }

    /// Waits up to `timeout` for a background process to stop running.
    pub async fn wait(&self, id: &str, timeout: Duration) -> ToolResponse<ProcessStatus> {
        match self
            .background
            .wait(id, timeout)
            .await
            .context(engine_error::ShellSnafu)
        {
            Ok(status) => ToolResponse::ok(status),
            Err(err) => failure(&err),
        }
    }

    pub async fn list_background(&self) -> ToolResponse<Vec<ProcessInfo>> {
        ToolResponse::ok(self.background.list().await)
    }

    /// Forgets a session. Returns whether it existed.
    pub fn close_session(&self, id: &str) -> bool {
        let closed = self.runner.sessions().close(id);
        debug!(session_id = id, closed, "Closed session");
        closed
    }

    /// Terminates every background process and clears the registry.
    ///
    /// Only the first call does anything; later calls return 0.
    pub async fn shutdown(&self) -> usize {
        if self.shut_down.swap(true, Ordering::SeqCst) {
            return 0;
        }
        let killed = self.background.kill_all().await;
        self.filter_cache.clear();
        info!(killed, "Engine shut down");
        killed
    }

    pub fn is_shut_down(&self) -> bool {
        self.shut_down.load(Ordering::SeqCst)
    }
}

fn failure<T>(err: &EngineError) -> ToolResponse<T> {
    let status = err.status_code();
    if status.should_log_error() {
        warn!(%status, "Tool call failed: {err}");
    } else {
        debug!(%status, "Tool call failed: {err}");
    }
    ToolResponse::from_error(err)
}

#[cfg(test)]
#[path = "engine.test.rs"]
mod tests;
