//! Configuration for ignore rule construction and directory walking.

/// Options controlling which rules a [`crate::IgnoreRuleSet`] contains and
/// how [`crate::IgnoreService`] walks a tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IgnoreConfig {
    /// Read `.gitignore` files found under the root.
    pub respect_gitignore: bool,
    /// Prepend the built-in exclusions (VCS, build, cache, lockfiles, junk).
    pub use_default_excludes: bool,
    /// Yield dot-files and dot-directories during walks.
    pub include_hidden: bool,
    /// Follow symbolic links during walks.
    pub follow_links: bool,
    /// Extra gitignore-style lines appended after all other rules.
    pub custom_excludes: Vec<String>,
}

impl Default for IgnoreConfig {
    fn default() -> Self {
        Self {
            respect_gitignore: true,
            use_default_excludes: true,
            include_hidden: true,
            follow_links: false,
            custom_excludes: Vec::new(),
        }
    }
}

impl IgnoreConfig {
    /// Config that reads nothing from disk and adds no defaults.
    pub fn ignoring_none() -> Self {
        Self {
            respect_gitignore: false,
            use_default_excludes: false,
            include_hidden: true,
            follow_links: false,
            custom_excludes: Vec::new(),
        }
    }

    pub fn with_gitignore(mut self, respect: bool) -> Self {
        self.respect_gitignore = respect;
        self
    }

    pub fn with_default_excludes(mut self, enabled: bool) -> Self {
        self.use_default_excludes = enabled;
        self
    }

    pub fn with_hidden(mut self, include: bool) -> Self {
        self.include_hidden = include;
        self
    }

    pub fn with_follow_links(mut self, follow: bool) -> Self {
        self.follow_links = follow;
        self
    }

    pub fn with_excludes(mut self, excludes: Vec<String>) -> Self {
        self.custom_excludes = excludes;
        self
    }
}

#[cfg(test)]
#[path = "config.test.rs"]
mod tests;
