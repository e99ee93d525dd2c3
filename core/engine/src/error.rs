//! Engine-level errors.

use std::path::PathBuf;

use quill_error::ErrorExt;
use quill_error::Location;
use quill_error::StatusCode;
use quill_file_search::SearchError;
use quill_shell::CommandResult;
use quill_shell::ShellError;
use snafu::Snafu;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)), module)]
pub enum EngineError {
    #[snafu(display("Failed to read config {}: {source}", path.display()))]
    ConfigRead {
        path: PathBuf,
        source: std::io::Error,
        #[snafu(implicit)]
        location: Location,
    },

    #[snafu(display("Malformed config {origin}: {source}"))]
    ConfigParse {
        origin: String,
        source: toml::de::Error,
        #[snafu(implicit)]
        location: Location,
    },

    #[snafu(display("Invalid config: {message}"))]
    InvalidConfig {
        message: String,
        #[snafu(implicit)]
        location: Location,
    },

    #[snafu(display("{source}"))]
    Search {
        source: SearchError,
        #[snafu(implicit)]
        location: Location,
    },

    #[snafu(display("{source}"))]
    Shell {
        source: ShellError,
        #[snafu(implicit)]
        location: Location,
    },

    /// The engine has been shut down and no longer starts processes.
    #[snafu(display("Engine is shut down"))]
    ShutDown {
        #[snafu(implicit)]
        location: Location,
    },
}

impl EngineError {
    /// Command output captured before a shell failure, if any.
    pub fn partial_result(&self) -> Option<&CommandResult> {
        match self {
            EngineError::Shell { source, .. } => source.partial_result(),
            _ => None,
        }
    }
}

impl ErrorExt for EngineError {
    fn status_code(&self) -> StatusCode {
        match self {
            EngineError::ConfigRead { .. } => StatusCode::ConfigFileError,
            EngineError::ConfigParse { .. } | EngineError::InvalidConfig { .. } => {
                StatusCode::InvalidConfig
            }
            EngineError::Search { source, .. } => source.status_code(),
            EngineError::Shell { source, .. } => source.status_code(),
            EngineError::ShutDown { .. } => StatusCode::Cancelled,
        }
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}
