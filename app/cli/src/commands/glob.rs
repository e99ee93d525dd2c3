use std::path::PathBuf;
use std::process::ExitCode;

use clap::Args;
use quill_engine::GlobParams;
use quill_engine::ToolEngine;
use tokio_util::sync::CancellationToken;

use crate::output;

#[derive(Args, Debug)]
pub(crate) struct GlobArgs {
    /// Glob pattern, e.g. `**/*.rs`. `*` does not cross directories.
    pub pattern: String,

    /// Directory to search (default: workspace root)
    #[arg(long)]
    pub root: Option<PathBuf>,

    /// Stop after this many matches (default from config)
    #[arg(short = 'n', long)]
    pub max_results: Option<usize>,

    /// Also report matching directories
    #[arg(long)]
    pub include_dirs: bool,

    #[arg(long)]
    pub case_sensitive: bool,

    /// Extra gitignore-style exclude line; repeatable
    #[arg(short = 'x', long = "exclude")]
    pub excludes: Vec<String>,

    /// Print the full response as JSON
    #[arg(long)]
    pub json: bool,
}

impl From<GlobArgs> for GlobParams {
    fn from(args: GlobArgs) -> Self {
        GlobParams {
            pattern: args.pattern,
            root: args.root,
            max_results: args.max_results,
            include_directories: args.include_dirs,
            case_sensitive: args.case_sensitive,
            extra_excludes: args.excludes,
        }
    }
}

pub(crate) async fn run(
    engine: &ToolEngine,
    args: GlobArgs,
    cancel: CancellationToken,
) -> anyhow::Result<ExitCode> {
    let json = args.json;
    let response = engine.glob(args.into(), cancel).await;
    if json {
        output::print_json(&response)?;
        return Ok(if response.success {
            ExitCode::SUCCESS
        } else {
            ExitCode::from(output::failure_exit_code(response.status))
        });
    }

    let Some(result) = &response.payload else {
        return Ok(output::report_failure(&response));
    };
    for found in &result.matches {
        if found.is_directory {
            println!("{}/", found.relative_path);
        } else {
            println!("{}", found.relative_path);
        }
    }
    eprintln!("{}", result.summary());
    Ok(ExitCode::SUCCESS)
}
