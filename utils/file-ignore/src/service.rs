//! Directory walking and ignore-file discovery.

use ignore::WalkBuilder;
use std::ffi::OsStr;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;
use walkdir::DirEntry;
use walkdir::WalkDir;

use crate::config::IgnoreConfig;
use crate::filter::PathFilter;
use crate::patterns::default_excluded_dir_names;

/// Name of the per-directory ignore file.
pub const GITIGNORE_FILE: &str = ".gitignore";

/// Builds directory walkers for a given [`IgnoreConfig`].
///
/// The walkers do no gitignore filtering of their own: ignore decisions
/// belong to [`crate::PathFilter`], so the `ignore` crate's built-in
/// `.gitignore`, `.ignore`, global and parent-directory handling is switched
/// off. With `use_default_excludes`, default-excluded directories such as
/// `node_modules` are pruned before the walker descends into them.
///
/// # Example
///
/// ```rust,no_run
/// use quill_file_ignore::IgnoreService;
/// use std::path::Path;
///
/// let service = IgnoreService::with_defaults();
/// for entry in service.create_walk_builder(Path::new(".")).build() {
///     match entry {
///         Ok(e) => println!("{}", e.path().display()),
///         Err(e) => eprintln!("Error: {e}"),
///     }
/// }
/// ```
#[derive(Debug, Clone)]
pub struct IgnoreService {
    config: IgnoreConfig,
}

impl IgnoreService {
    pub fn new(config: IgnoreConfig) -> Self {
        Self { config }
    }

    pub fn with_defaults() -> Self {
        Self::new(IgnoreConfig::default())
    }

    /// Creates a walker rooted at `root`.
    ///
    /// Hidden entries are yielded unless `include_hidden` is off; symlinks
    /// are followed only when `follow_links` is on.
    pub fn create_walk_builder(&self, root: &Path) -> WalkBuilder {
        self.configure(root, None)
    }

    /// Like [`Self::create_walk_builder`], additionally pruning directories
    /// that `filter` ignores.
    ///
    /// Pruning only happens when the filter has no negation rules; otherwise
    /// every directory is entered so a later `!pattern` can still re-include
    /// paths below an ignored one.
    pub fn create_filtered_walk_builder(&self, root: &Path, filter: Arc<PathFilter>) -> WalkBuilder {
        self.configure(root, Some(filter))
    }

    fn configure(&self, root: &Path, filter: Option<Arc<PathFilter>>) -> WalkBuilder {
        let mut builder = WalkBuilder::new(root);
        builder
            .standard_filters(false)
            .hidden(!self.config.include_hidden)
            .follow_links(self.config.follow_links);

        let prune_defaults = self.config.use_default_excludes;
        let filter = filter.filter(|f| !f.rules().has_negations());
        if prune_defaults || filter.is_some() {
            builder.filter_entry(move |entry| {
                let is_dir = entry.file_type().is_some_and(|ft| ft.is_dir());
                if entry.depth() == 0 || !is_dir {
                    return true;
                }
                if prune_defaults && is_default_excluded_name(entry.file_name()) {
                    return false;
                }
                !filter
                    .as_ref()
                    .is_some_and(|f| f.should_ignore_directory(entry.path()))
            });
        }
        builder
    }

    pub fn config(&self) -> &IgnoreConfig {
        &self.config
    }
}

impl Default for IgnoreService {
    fn default() -> Self {
        Self::with_defaults()
    }
}

/// Finds every `.gitignore` under `root`, shallowest first.
///
/// Files at the same depth come in file-name order. Default-excluded
/// directories such as `node_modules` or `.git` are not descended into, and
/// unreadable directories are skipped.
pub fn find_gitignore_files(root: &Path) -> Vec<PathBuf> {
    if !root.is_dir() {
        return Vec::new();
    }

    let mut found: Vec<(usize, PathBuf)> = WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| !is_pruned_dir(entry))
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file() && entry.file_name() == GITIGNORE_FILE)
        .map(|entry| (entry.depth(), entry.into_path()))
        .collect();

    // Stable: keeps walk order within one depth.
    found.sort_by_key(|(depth, _)| *depth);
    found.into_iter().map(|(_, path)| path).collect()
}

fn is_pruned_dir(entry: &DirEntry) -> bool {
    entry.depth() > 0 && entry.file_type().is_dir() && is_default_excluded_name(entry.file_name())
}

fn is_default_excluded_name(name: &OsStr) -> bool {
    let name = name.to_string_lossy();
    default_excluded_dir_names().any(|excluded| excluded == name)
}

#[cfg(test)]
#[path = "service.test.rs"]
mod tests;
