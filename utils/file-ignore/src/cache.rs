//! Short-lived cache of [`PathFilter`]s keyed by root and extra excludes.
//!
//! Building a filter walks the whole tree and reads every `.gitignore`, while
//! ignore content rarely changes within a session.

use std::collections::HashMap;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;
use std::sync::PoisonError;
use std::time::Duration;
use std::time::Instant;

use tracing::debug;

use crate::config::IgnoreConfig;
use crate::filter::PathFilter;

/// Default time-to-live for cached filters.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct FilterCacheKey {
    root: PathBuf,
    extra_excludes: Vec<String>,
}

#[derive(Debug)]
struct CachedFilter {
    filter: Arc<PathFilter>,
    built_at: Instant,
}

/// TTL cache of filters, keyed by the exact `(root, extra_excludes)` pair.
#[derive(Debug)]
pub struct FilterCache {
    ttl: Duration,
    entries: Mutex<HashMap<FilterCacheKey, CachedFilter>>,
}

impl FilterCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Returns a fresh cached filter or builds one.
    ///
    /// This may read the filesystem; call it off the async executor.
    pub fn get_or_build(&self, root: &Path, extra_excludes: &[String]) -> Arc<PathFilter> {
        let key = FilterCacheKey {
            root: root.to_path_buf(),
            extra_excludes: extra_excludes.to_vec(),
        };

        if let Some(entry) = self.lock().get(&key)
            && entry.built_at.elapsed() < self.ttl
        {
            debug!(root = %root.display(), "Path filter cache hit");
            return Arc::clone(&entry.filter);
        }

        let config = IgnoreConfig::default().with_excludes(key.extra_excludes.clone());
        let filter = Arc::new(PathFilter::build(root, &config));

        let now = Instant::now();
        let mut entries = self.lock();
        entries.retain(|_, entry| now.duration_since(entry.built_at) < self.ttl);
        entries.insert(
            key,
            CachedFilter {
                filter: Arc::clone(&filter),
                built_at: now,
            },
        );
        filter
    }

    /// Drops every entry for `root`, whatever its excludes. Returns the count removed.
    pub fn invalidate(&self, root: &Path) -> usize {
        let mut entries = self.lock();
        let before = entries.len();
        entries.retain(|key, _| key.root != root);
        before - entries.len()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<FilterCacheKey, CachedFilter>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for FilterCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_TTL)
    }
}

#[cfg(test)]
#[path = "cache.test.rs"]
mod tests;
