//! Streaming glob search.
//!
//! The directory walk runs on a blocking thread and feeds glob-matching
//! entries through a bounded channel. The async side applies the
//! [`PathFilter`], enforces the result limit and watches the cancellation
//! token. Dropping the receiver stops the walker at its next entry.

use std::cmp::Ordering;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use std::time::SystemTime;

use chrono::DateTime;
use chrono::Utc;
use globset::GlobBuilder;
use globset::GlobMatcher;
use quill_file_ignore::FilterCache;
use quill_file_ignore::IgnoreConfig;
use quill_file_ignore::IgnoreService;
use quill_file_ignore::PathFilter;
use snafu::ResultExt;
use snafu::ensure;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::error::SearchError;
use crate::error::search_error;
use crate::types::FileMatch;
use crate::types::SearchRequest;
use crate::types::SearchResult;

const WALK_CHANNEL_CAPACITY: usize = 256;

/// Runs `request` to completion.
///
/// Fails with [`SearchError::Cancelled`] if the token fires at any point
/// before the result is returned; partial matches are discarded.
pub async fn search(
    request: &SearchRequest,
    cache: &Arc<FilterCache>,
) -> Result<SearchResult, SearchError> {
    search_streaming(request, cache, |_| {}).await
}

/// Like [`search`], calling `on_match` for every accepted match as it
/// arrives, in discovery order and before the final sort.
pub async fn search_streaming<F>(
    request: &SearchRequest,
    cache: &Arc<FilterCache>,
    mut on_match: F,
) -> Result<SearchResult, SearchError>
where
    F: FnMut(&FileMatch),
{
    let started = Instant::now();

    let root = validate_root(&request.root)?;
    let matcher = compile_pattern(&request.pattern, request.case_sensitive)?;
    ensure!(!request.cancel.is_cancelled(), search_error::CancelledSnafu);

    let filter = build_filter(cache, &root, &request.extra_excludes, &request.cancel).await?;

    let (tx, mut rx) = mpsc::channel(WALK_CHANNEL_CAPACITY);
    let walker = {
        let walk = WalkTask {
            root: root.clone(),
            matcher,
            filter: Arc::clone(&filter),
            include_directories: request.include_directories,
            cancel: request.cancel.clone(),
        };
        tokio::task::spawn_blocking(move || walk.run(tx))
    };

    let mut matches = Vec::new();
    let mut truncated = false;
    loop {
        let step = tokio::select! {
            biased;
            () = request.cancel.cancelled() => Step::Cancelled,
            next = rx.recv() => Step::Next(next),
        };
        let candidate = match step {
            Step::Cancelled => {
                drop(rx);
                let _ = walker.await;
                debug!(root = %root.display(), "Search cancelled mid-walk");
                return search_error::CancelledSnafu.fail();
            }
            Step::Next(None) => break,
            Step::Next(Some(candidate)) => candidate,
        };

        let ignored = if candidate.is_dir {
            filter.should_ignore_directory(&candidate.relative_path)
        } else {
            filter.should_ignore(&candidate.relative_path)
        };
        if ignored {
            continue;
        }
        if matches.len() >= request.max_results {
            truncated = true;
            break;
        }

        let file_match = candidate.into_match(&root);
        on_match(&file_match);
        matches.push(file_match);
    }

    drop(rx);
    let scanned_entries = walker.await.context(search_error::JoinSnafu)?;
    ensure!(!request.cancel.is_cancelled(), search_error::CancelledSnafu);

    sort_matches(&mut matches);
    let elapsed_ms = started.elapsed().as_millis() as u64;
    debug!(
        root = %root.display(),
        pattern = %request.pattern,
        matches = matches.len(),
        truncated,
        scanned_entries,
        elapsed_ms,
        "Search finished"
    );
    Ok(SearchResult {
        matches,
        truncated,
        scanned_entries,
        elapsed_ms,
    })
}

/// Fetches or builds the root's filter on a blocking thread.
///
/// Cancellation returns at once; an abandoned build still finishes and
/// lands in the cache.
pub(crate) async fn build_filter(
    cache: &Arc<FilterCache>,
    root: &Path,
    excludes: &[String],
    cancel: &CancellationToken,
) -> Result<Arc<PathFilter>, SearchError> {
    let build = {
        let cache = Arc::clone(cache);
        let root = root.to_path_buf();
        let excludes = excludes.to_vec();
        tokio::task::spawn_blocking(move || cache.get_or_build(&root, &excludes))
    };
    tokio::select! {
        biased;
        () = cancel.cancelled() => {
            debug!(root = %root.display(), "Search cancelled while building ignore rules");
            search_error::CancelledSnafu.fail()
        }
        built = build => built.context(search_error::JoinSnafu),
    }
}

enum Step {
    Cancelled,
    Next(Option<Candidate>),
}

/// A glob-matching entry produced by the walker, not yet filtered.
#[derive(Debug)]
struct Candidate {
    relative_path: String,
    is_dir: bool,
    size: Option<u64>,
    modified: Option<SystemTime>,
}

impl Candidate {
    fn into_match(self, root: &Path) -> FileMatch {
        FileMatch {
            absolute_path: root.join(&self.relative_path),
            relative_path: self.relative_path,
            is_directory: self.is_dir,
            size: self.size,
            modified_time: self.modified.map(DateTime::<Utc>::from),
        }
    }
}

struct WalkTask {
    root: PathBuf,
    matcher: GlobMatcher,
    filter: Arc<PathFilter>,
    include_directories: bool,
    cancel: CancellationToken,
}

impl WalkTask {
    /// Walks the tree, sending glob matches. Returns the number of entries seen.
    fn run(self, tx: mpsc::Sender<Candidate>) -> usize {
        let service = IgnoreService::new(IgnoreConfig::default());
        let walker = service
            .create_filtered_walk_builder(&self.root, self.filter)
            .build();

        let mut scanned = 0;
        for entry in walker {
            if tx.is_closed() || self.cancel.is_cancelled() {
                break;
            }
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    debug!("Skipping unreadable entry: {err}");
                    continue;
                }
            };
            if entry.depth() == 0 {
                continue;
            }
            scanned += 1;

            let is_dir = entry.file_type().is_some_and(|ft| ft.is_dir());
            if is_dir && !self.include_directories {
                continue;
            }
            let Some(relative_path) = relative_slash_path(&self.root, entry.path()) else {
                continue;
            };
            if !self.matcher.is_match(&relative_path) {
                continue;
            }

            let metadata = entry.metadata().ok();
            let candidate = Candidate {
                relative_path,
                is_dir,
                size: metadata
                    .as_ref()
                    .filter(|m| m.is_file())
                    .map(std::fs::Metadata::len),
                modified: metadata.and_then(|m| m.modified().ok()),
            };
            if tx.blocking_send(candidate).is_err() {
                break;
            }
        }
        scanned
    }
}

fn validate_root(root: &Path) -> Result<PathBuf, SearchError> {
    let canonical = std::fs::canonicalize(root).ok().filter(|p| p.is_dir());
    canonical.ok_or_else(|| {
        search_error::InvalidRootSnafu {
            path: root.to_path_buf(),
        }
        .build()
    })
}

fn compile_pattern(pattern: &str, case_sensitive: bool) -> Result<GlobMatcher, SearchError> {
    let trimmed = pattern.trim();
    let trimmed = trimmed.strip_prefix("./").unwrap_or(trimmed);
    ensure!(!trimmed.is_empty(), search_error::EmptyPatternSnafu);
    let glob = GlobBuilder::new(trimmed)
        .literal_separator(true)
        .case_insensitive(!case_sensitive)
        .build()
        .context(search_error::InvalidPatternSnafu { pattern })?;
    Ok(glob.compile_matcher())
}

fn relative_slash_path(root: &Path, path: &Path) -> Option<String> {
    let rel = path.strip_prefix(root).ok()?;
    let joined = rel
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/");
    (!joined.is_empty()).then_some(joined)
}

/// Files before directories, then newest first, then by path.
pub fn sort_matches(matches: &mut [FileMatch]) {
    matches.sort_by(compare_matches);
}

fn compare_matches(a: &FileMatch, b: &FileMatch) -> Ordering {
    a.is_directory
        .cmp(&b.is_directory)
        .then_with(|| match (a.modified_time, b.modified_time) {
            (Some(a), Some(b)) => b.cmp(&a),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        })
        .then_with(|| a.relative_path.cmp(&b.relative_path))
}

#[cfg(test)]
#[path = "search.test.rs"]
mod tests;
