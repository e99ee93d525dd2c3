use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::Args;
use quill_engine::ToolEngine;
use quill_shell::CommandSpec;
use quill_shell::ProcessStatus;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::output;

#[derive(Args, Debug)]
pub(crate) struct BgArgs {
    /// Shell command to start
    pub command: String,

    /// Working directory (default: workspace root)
    #[arg(long)]
    pub cwd: Option<PathBuf>,

    /// Delay between output polls
    #[arg(long, default_value_t = 200)]
    pub poll_ms: u64,

    /// Kill the process after this many polls; 0 polls until it exits
    #[arg(long, default_value_t = 0)]
    pub max_polls: u64,

    /// Print each snapshot as a JSON line
    #[arg(long)]
    pub json: bool,
}

pub(crate) async fn run(
    engine: &ToolEngine,
    args: BgArgs,
    cancel: CancellationToken,
) -> anyhow::Result<ExitCode> {
    let mut spec = CommandSpec::new(args.command);
    if let Some(cwd) = args.cwd {
        spec = spec.with_cwd(cwd);
    }
    let started = engine.start_background(spec).await;
    let Some(id) = started.payload.clone() else {
        return Ok(output::report_failure(&started));
    };
    if !args.json {
        eprintln!("started {id}");
    }

    let poll = Duration::from_millis(args.poll_ms);
    let mut polls = 0u64;
    loop {
        let interrupted = tokio::select! {
            biased;
            () = cancel.cancelled() => true,
            () = tokio::time::sleep(poll) => false,
        };
        polls += 1;
        let out_of_polls = args.max_polls > 0 && polls >= args.max_polls;
        if interrupted || out_of_polls {
            let killed = engine.kill(&id).await;
            info!(id = %id, interrupted, polls, "Stopping background process");
            if let Some(message) = &killed.message
                && !args.json
            {
                eprintln!("{message}");
            }
        }

        let response = engine.consume_output(&id).await;
        let Some(snapshot) = &response.payload else {
            return Ok(output::report_failure(&response));
        };
        if args.json {
            println!("{}", serde_json::to_string(snapshot)?);
        } else {
            print!("{}", snapshot.stdout);
            eprint!("{}", snapshot.stderr);
        }

        match snapshot.info.status {
            ProcessStatus::Running => {}
            ProcessStatus::Exited => {
                let code = output::exit_status_code(snapshot.info.exit_code, snapshot.info.signal);
                return Ok(ExitCode::from(code));
            }
            ProcessStatus::Killed if interrupted => {
                return Ok(ExitCode::from(output::EXIT_CANCELLED));
            }
            ProcessStatus::Killed => return Ok(ExitCode::SUCCESS),
            ProcessStatus::Error => return Ok(ExitCode::from(output::EXIT_FAILURE)),
        }
    }
}
