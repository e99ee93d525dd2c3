//! Terminal rendering shared by the subcommands.

use std::io::Write;
use std::process::ExitCode;

use quill_engine::ToolResponse;
use quill_error::StatusCode;
use quill_shell::CommandResult;
use quill_shell::OutputSink;
use quill_shell::OutputStream;
use serde::Serialize;

/// Exit status for a timed-out command, as coreutils `timeout` uses.
pub(crate) const EXIT_TIMED_OUT: u8 = 124;
/// Exit status after Ctrl-C.
pub(crate) const EXIT_CANCELLED: u8 = 130;
pub(crate) const EXIT_FAILURE: u8 = 1;

pub(crate) fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub(crate) fn failure_exit_code(status: StatusCode) -> u8 {
    match status {
        StatusCode::Timeout => EXIT_TIMED_OUT,
        StatusCode::Cancelled => EXIT_CANCELLED,
        _ => EXIT_FAILURE,
    }
}

/// Exit status mirroring the child: its exit code, or 128 + signal.
pub(crate) fn command_exit_code(result: &CommandResult) -> u8 {
    exit_status_code(result.exit_code, result.signal)
}

pub(crate) fn exit_status_code(exit_code: Option<i32>, signal: Option<i32>) -> u8 {
    match (exit_code, signal) {
        (Some(code), _) => (code & 0xff) as u8,
        (None, Some(signal)) => (128 + signal).clamp(0, 255) as u8,
        (None, None) => EXIT_FAILURE,
    }
}

/// Prints the failure message and returns the matching exit status.
pub(crate) fn report_failure<T>(response: &ToolResponse<T>) -> ExitCode {
    match &response.message {
        Some(message) => eprintln!("error: {message}"),
        None => eprintln!("error: {}", response.status),
    }
    ExitCode::from(failure_exit_code(response.status))
}

/// Streams command output straight to the terminal as it arrives.
pub(crate) struct TerminalSink;

impl OutputSink for TerminalSink {
    fn on_output(&self, stream: OutputStream, chunk: &str) {
        // A closed terminal is not worth failing the command over.
        let _ = match stream {
            OutputStream::Stdout => write_flush(&mut std::io::stdout().lock(), chunk),
            OutputStream::Stderr => write_flush(&mut std::io::stderr().lock(), chunk),
        };
    }
}

fn write_flush(out: &mut impl Write, chunk: &str) -> std::io::Result<()> {
    out.write_all(chunk.as_bytes())?;
    out.flush()
}

#[cfg(test)]
#[path = "output.test.rs"]
mod tests;
