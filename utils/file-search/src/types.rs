//! Search request and result types.

use std::path::PathBuf;

use chrono::DateTime;
use chrono::Utc;
use serde::Serialize;
use tokio_util::sync::CancellationToken;

/// Result limit used when the caller does not pick one.
pub const DEFAULT_MAX_RESULTS: usize = 100;

/// A glob search over one directory tree.
#[derive(Debug, Clone)]
pub struct SearchRequest {
    pub root: PathBuf,
    /// Glob matched against the root-relative, forward-slash path. `*` does
    /// not cross `/`; use `**/` to search recursively.
    pub pattern: String,
    pub max_results: usize,
    pub include_directories: bool,
    pub case_sensitive: bool,
    /// Extra gitignore-style lines appended after all other ignore rules.
    pub extra_excludes: Vec<String>,
    pub cancel: CancellationToken,
}

impl SearchRequest {
    pub fn new(root: impl Into<PathBuf>, pattern: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            pattern: pattern.into(),
            max_results: DEFAULT_MAX_RESULTS,
            include_directories: false,
            case_sensitive: false,
            extra_excludes: Vec::new(),
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results;
        self
    }

    pub fn with_directories(mut self, include: bool) -> Self {
        self.include_directories = include;
        self
    }

    pub fn with_case_sensitive(mut self, case_sensitive: bool) -> Self {
        self.case_sensitive = case_sensitive;
        self
    }

    pub fn with_excludes(mut self, excludes: Vec<String>) -> Self {
        self.extra_excludes = excludes;
        self
    }

    pub fn with_cancel(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }
}

/// One matched entry.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct FileMatch {
    pub absolute_path: PathBuf,
    /// Root-relative path with `/` separators.
    pub relative_path: String,
    pub is_directory: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified_time: Option<DateTime<Utc>>,
}

/// Sorted matches of a finished search.
///
/// `truncated` means more than `matches.len()` entries matched; the real
/// total is unknown.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct SearchResult {
    pub matches: Vec<FileMatch>,
    pub truncated: bool,
    /// Walker entries examined, matching or not.
    pub scanned_entries: usize,
    pub elapsed_ms: u64,
}

impl SearchResult {
    pub fn len(&self) -> usize {
        self.matches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    /// One-line count for display. Never claims an exact total when truncated.
    pub fn summary(&self) -> String {
        let count = self.matches.len();
        let noun = if count == 1 && !self.truncated {
            "match"
        } else {
            "matches"
        };
        if self.truncated {
            format!("Showing first {count} {noun} (more exist, results truncated)")
        } else {
            format!("Found {count} {noun}")
        }
    }
}
