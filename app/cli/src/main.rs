//! `quill` - drive the local tool engine from a terminal.
//!
//! ```text
//! quill glob '**/*.rs' --max-results 20
//! quill run 'cargo test' --timeout-ms 60000
//! quill bg 'npm run dev' --poll-ms 500 --max-polls 10
//! ```
//!
//! Ctrl-C cancels the in-flight operation through the engine's
//! cancellation token; the engine is always shut down before exit.

mod commands;
mod output;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use clap::Subcommand;
use quill_engine::EngineConfig;
use quill_engine::ToolEngine;
use quill_utils_common::LoggingConfig;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Config file looked up in the workspace when `--config` is not given.
const DEFAULT_CONFIG_FILE: &str = "quill.toml";

#[derive(Parser, Debug)]
#[command(name = "quill", version)]
#[command(about = "Glob search and shell execution through the local tool engine")]
struct Cli {
    /// Workspace root (default: current directory)
    #[arg(long, global = true)]
    workspace: Option<PathBuf>,

    /// Engine config file (default: {workspace}/quill.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log engine activity to stderr at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Find files matching a glob pattern
    Glob(commands::glob::GlobArgs),

    /// Run a command in the foreground
    Run(commands::run::RunArgs),

    /// Start a command in the background and poll its output
    Bg(commands::bg::BgArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    let workspace = match cli.workspace {
        Some(path) => path,
        None => std::env::current_dir()?,
    };
    let config_path = cli
        .config
        .unwrap_or_else(|| workspace.join(DEFAULT_CONFIG_FILE));
    let config = EngineConfig::load(&config_path)?;

    let logging = if cli.verbose {
        LoggingConfig {
            level: "warn,quill=debug".to_string(),
            ..config.logging.clone()
        }
    } else {
        config.logging.clone()
    };
    quill_utils_common::init_stderr_logging(&logging, "warn")?;
    debug!(workspace = %workspace.display(), config = %config_path.display(), "Starting");

    let engine = ToolEngine::new(workspace, config);
    let cancel = CancellationToken::new();
    let ctrl_c = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            ctrl_c.cancel();
        }
    });

    let result = match cli.command {
        Command::Glob(args) => commands::glob::run(&engine, args, cancel).await,
        Command::Run(args) => commands::run::run(&engine, args, cancel).await,
        Command::Bg(args) => commands::bg::run(&engine, args, cancel).await,
    };
    engine.shutdown().await;
    result
}

#[cfg(test)]
#[path = "main.test.rs"]
mod tests;
