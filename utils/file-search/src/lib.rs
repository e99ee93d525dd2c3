//! Bounded, cancellable glob search.
//!
//! Entries are produced by a gitignore-unaware walker and then filtered by a
//! cached [`quill_file_ignore::PathFilter`], so negation rules keep their
//! gitignore precedence. Results are sorted files first, newest first, then
//! by path.

mod error;
mod search;
mod types;

pub use error::SearchError;
pub use search::search;
pub use search::search_streaming;
pub use search::sort_matches;
pub use types::DEFAULT_MAX_RESULTS;
pub use types::FileMatch;
pub use types::SearchRequest;
pub use types::SearchResult;
