use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::Args;
use quill_engine::ToolEngine;
use quill_shell::CommandInvocation;
use tokio_util::sync::CancellationToken;

use crate::output;

#[derive(Args, Debug)]
pub(crate) struct RunArgs {
    /// Shell command to run
    pub command: String,

    /// Arguments appended to the command, each shell-quoted
    #[arg(last = true)]
    pub args: Vec<String>,

    /// Working directory (default: workspace root)
    #[arg(long)]
    pub cwd: Option<PathBuf>,

    /// Timeout in milliseconds (default from config)
    #[arg(short, long)]
    pub timeout_ms: Option<u64>,

    /// Environment variable as KEY=VALUE; repeatable
    #[arg(short, long = "env", value_parser = parse_env_pair)]
    pub env: Vec<(String, String)>,

    /// Session id whose first cwd and env this run reuses
    #[arg(long)]
    pub session: Option<String>,

    /// Print the full response as JSON instead of streaming output
    #[arg(long)]
    pub json: bool,
}

/// Parses `KEY=VALUE`; the value may itself contain `=`.
pub(crate) fn parse_env_pair(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected KEY=VALUE, got `{raw}`")),
    }
}

pub(crate) fn build_invocation(args: RunArgs, cancel: CancellationToken) -> CommandInvocation {
    let mut invocation = CommandInvocation::new(args.command)
        .with_args(args.args)
        .with_cancel(cancel);
    if let Some(cwd) = args.cwd {
        invocation = invocation.with_cwd(cwd);
    }
    if let Some(timeout_ms) = args.timeout_ms {
        invocation = invocation.with_timeout(Duration::from_millis(timeout_ms));
    }
    if let Some(session) = args.session {
        invocation = invocation.with_session(session);
    }
    for (key, value) in args.env {
        invocation = invocation.with_env(key, value);
    }
    invocation
}

pub(crate) async fn run(
    engine: &ToolEngine,
    args: RunArgs,
    cancel: CancellationToken,
) -> anyhow::Result<ExitCode> {
    let json = args.json;
    let mut invocation = build_invocation(args, cancel);
    if !json {
        invocation = invocation.with_sink(Arc::new(output::TerminalSink));
    }

    let response = engine.run(invocation).await;
    if json {
        output::print_json(&response)?;
    }

    if let Some(result) = &response.payload {
        return Ok(ExitCode::from(output::command_exit_code(result)));
    }
    if json {
        return Ok(ExitCode::from(output::failure_exit_code(response.status)));
    }
    // Partial output was already streamed by the sink.
    Ok(output::report_failure(&response))
}

#[cfg(test)]
#[path = "run.test.rs"]
mod tests;
