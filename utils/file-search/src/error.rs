//! Error types for glob search.

use std::path::PathBuf;

use quill_error::ErrorExt;
use quill_error::Location;
use quill_error::StatusCode;
use snafu::Snafu;

/// Search errors.
///
/// `InvalidRoot` and `InvalidPattern` are configuration errors: they are
/// raised before any directory is opened.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)), module)]
pub enum SearchError {
    /// Search root is missing or not a directory.
    #[snafu(display("Search root is not a directory: {}", path.display()))]
    InvalidRoot {
        path: PathBuf,
        #[snafu(implicit)]
        location: Location,
    },

    /// Glob pattern failed to compile.
    #[snafu(display("Invalid glob pattern {pattern:?}: {source}"))]
    InvalidPattern {
        pattern: String,
        source: globset::Error,
        #[snafu(implicit)]
        location: Location,
    },

    /// Glob pattern was empty.
    #[snafu(display("Glob pattern must not be empty"))]
    EmptyPattern {
        #[snafu(implicit)]
        location: Location,
    },

    /// Search was cancelled through its token.
    #[snafu(display("Search cancelled"))]
    Cancelled {
        #[snafu(implicit)]
        location: Location,
    },

    /// A blocking search task panicked or was aborted.
    #[snafu(display("Search task failed: {source}"))]
    Join {
        source: tokio::task::JoinError,
        #[snafu(implicit)]
        location: Location,
    },
}

impl SearchError {
    /// Whether the caller's request was malformed and nothing was attempted.
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            SearchError::InvalidRoot { .. }
                | SearchError::InvalidPattern { .. }
                | SearchError::EmptyPattern { .. }
        )
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, SearchError::Cancelled { .. })
    }
}

impl ErrorExt for SearchError {
    fn status_code(&self) -> StatusCode {
        match self {
            SearchError::InvalidRoot { .. } => StatusCode::InvalidArguments,
            SearchError::InvalidPattern { .. } | SearchError::EmptyPattern { .. } => {
                StatusCode::InvalidArguments
            }
            SearchError::Cancelled { .. } => StatusCode::Cancelled,
            SearchError::Join { .. } => StatusCode::Internal,
        }
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}
