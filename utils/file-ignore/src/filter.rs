//! Immutable path filter applying last-match-wins precedence.

use std::path::Path;
use std::path::PathBuf;

use globset::GlobSet;
use globset::GlobSetBuilder;
use tracing::warn;

use crate::config::IgnoreConfig;
use crate::rule::IgnoreRuleSet;
use crate::rule::RuleKind;

/// Answers "is this path ignored?" for one scan root.
///
/// Among all rules matching a path, the one declared last decides: an
/// `Ignore` rule ignores it, a `Negate` rule un-ignores it. A path matched by
/// no rule is not ignored. Both checks are pure functions of the rule set and
/// the path, with no I/O.
#[derive(Debug)]
pub struct PathFilter {
    root: PathBuf,
    root_prefix: String,
    rules: IgnoreRuleSet,
    glob_set: Option<GlobSet>,
}

impl PathFilter {
    pub fn new(root: impl Into<PathBuf>, rules: IgnoreRuleSet) -> Self {
        let root = root.into();
        let root_prefix = format!(
            "{}/",
            root.to_string_lossy().replace('\\', "/").trim_end_matches('/')
        );
        let glob_set = compile_glob_set(&rules);
        Self {
            root,
            root_prefix,
            rules,
            glob_set,
        }
    }

    /// Reads every `.gitignore` under `root` and builds a filter from it.
    pub fn build(root: &Path, config: &IgnoreConfig) -> Self {
        Self::new(root, IgnoreRuleSet::build(root, config))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn rules(&self) -> &IgnoreRuleSet {
        &self.rules
    }

    /// Whether `path` (relative to the root, or absolute under it) is ignored.
    pub fn should_ignore(&self, path: impl AsRef<Path>) -> bool {
        let normalized = self.normalize(path.as_ref());
        self.decide(&normalized)
    }

    /// Like [`Self::should_ignore`], also testing the path with a trailing
    /// slash so directory-shaped patterns apply.
    pub fn should_ignore_directory(&self, path: impl AsRef<Path>) -> bool {
        let normalized = self.normalize(path.as_ref());
        if self.decide(&normalized) {
            return true;
        }
        if normalized.is_empty() || normalized.ends_with('/') {
            return false;
        }
        self.decide(&format!("{normalized}/"))
    }

    fn decide(&self, path: &str) -> bool {
        if path.is_empty() {
            return false;
        }
        let rules = self.rules.rules();
        let winner = match &self.glob_set {
            Some(set) => set.matches(path).into_iter().max(),
            None => rules.iter().rposition(|rule| rule.is_match(path)),
        };
        winner.is_some_and(|idx| rules[idx].kind() == RuleKind::Ignore)
    }

    fn normalize(&self, path: &Path) -> String {
        let raw = path.to_string_lossy().replace('\\', "/");
        let mut relative = if raw.trim_end_matches('/') == self.root_prefix.trim_end_matches('/') {
            ""
        } else {
            raw.strip_prefix(self.root_prefix.as_str())
                .unwrap_or(raw.as_str())
        };
        while let Some(rest) = relative.strip_prefix("./") {
            relative = rest;
        }
        relative.trim_start_matches('/').to_string()
    }
}

/// Combines all rule globs into one set whose match indices equal rule indices.
fn compile_glob_set(rules: &IgnoreRuleSet) -> Option<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for rule in rules.rules() {
        builder.add(rule.glob().clone());
    }
    match builder.build() {
        Ok(set) => Some(set),
        Err(err) => {
            warn!("Falling back to per-rule matching: {err}");
            None
        }
    }
}

#[cfg(test)]
#[path = "filter.test.rs"]
mod tests;
