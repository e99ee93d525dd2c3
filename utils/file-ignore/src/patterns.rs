//! Built-in exclusions applied before any `.gitignore` content.
//!
//! Entries use gitignore line syntax and go through the same parser as
//! user-authored ignore files.

/// Version control metadata directories.
pub const VCS_DIRECTORY_EXCLUDES: &[&str] = &[".git/", ".svn/", ".hg/", ".jj/", ".bzr/"];

/// Dependency, build output and tool cache directories.
pub const COMMON_DIRECTORY_EXCLUDES: &[&str] = &[
    "node_modules/",
    "bower_components/",
    ".venv/",
    "__pycache__/",
    ".pytest_cache/",
    ".mypy_cache/",
    ".ruff_cache/",
    ".tox/",
    ".gradle/",
    ".cache/",
    ".next/",
    ".nuxt/",
    ".turbo/",
    ".parcel-cache/",
    "dist/",
    "build/",
    "coverage/",
    ".idea/",
    ".vscode/",
];

/// Dependency lockfiles.
pub const LOCKFILE_EXCLUDES: &[&str] = &[
    "package-lock.json",
    "yarn.lock",
    "pnpm-lock.yaml",
    "bun.lockb",
    "Cargo.lock",
    "poetry.lock",
    "Gemfile.lock",
    "composer.lock",
];

/// OS and editor junk files.
pub const SYSTEM_FILE_EXCLUDES: &[&str] = &[
    ".DS_Store",
    "Thumbs.db",
    "desktop.ini",
    "*.swp",
    "*.swo",
    "*.pyc",
    "*.pyo",
];

/// All default exclusion lines, directories first.
pub fn get_all_default_excludes() -> Vec<&'static str> {
    let mut lines = Vec::with_capacity(
        VCS_DIRECTORY_EXCLUDES.len()
            + COMMON_DIRECTORY_EXCLUDES.len()
            + LOCKFILE_EXCLUDES.len()
            + SYSTEM_FILE_EXCLUDES.len(),
    );
    lines.extend(VCS_DIRECTORY_EXCLUDES);
    lines.extend(COMMON_DIRECTORY_EXCLUDES);
    lines.extend(LOCKFILE_EXCLUDES);
    lines.extend(SYSTEM_FILE_EXCLUDES);
    lines
}

/// Bare names of the default-excluded directories.
///
/// The directory walker prunes these before descending.
pub fn default_excluded_dir_names() -> impl Iterator<Item = &'static str> {
    VCS_DIRECTORY_EXCLUDES
        .iter()
        .chain(COMMON_DIRECTORY_EXCLUDES)
        .filter_map(|line| line.strip_suffix('/'))
}

#[cfg(test)]
#[path = "patterns.test.rs"]
mod tests;
