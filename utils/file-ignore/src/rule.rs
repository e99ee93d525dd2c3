//! Gitignore lines compiled into ordered ignore / un-ignore rules.
//!
//! Every pattern is anchored to the scan root at construction time, so a
//! rule can be matched against a root-relative, forward-slash path without
//! knowing which `.gitignore` it came from:
//!
//! | line in `a/b/.gitignore` | emitted patterns            |
//! |--------------------------|-----------------------------|
//! | `foo`                    | `a/b/**/foo`, `a/b/**/foo/**` |
//! | `/foo`                   | `a/b/foo`, `a/b/foo/**`     |
//! | `build/`                 | `a/b/**/build`, `a/b/**/build/**` |
//! | `!keep.txt`              | negated `a/b/**/keep.txt`, ... |

use std::path::Path;
use std::path::PathBuf;

use globset::Glob;
use globset::GlobBuilder;
use globset::GlobMatcher;
use tracing::debug;
use tracing::warn;

use crate::config::IgnoreConfig;
use crate::patterns::get_all_default_excludes;
use crate::service::find_gitignore_files;

/// Whether a matching rule ignores or un-ignores a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuleKind {
    Ignore,
    Negate,
}

/// A single precompiled rule.
#[derive(Debug, Clone)]
pub struct IgnoreRule {
    kind: RuleKind,
    glob: Glob,
    matcher: GlobMatcher,
}

impl IgnoreRule {
    /// Compiles a root-anchored glob pattern into a rule.
    ///
    /// `*` and `?` never cross a `/`; `**` does.
    pub fn new(kind: RuleKind, pattern: &str) -> Result<Self, globset::Error> {
        let glob = GlobBuilder::new(pattern)
            .literal_separator(true)
            .backslash_escape(true)
            .build()?;
        let matcher = glob.compile_matcher();
        Ok(Self {
            kind,
            glob,
            matcher,
        })
    }

    pub fn kind(&self) -> RuleKind {
        self.kind
    }

    pub fn pattern(&self) -> &str {
        self.glob.glob()
    }

    pub(crate) fn glob(&self) -> &Glob {
        &self.glob
    }

    /// Tests a normalized, root-relative path.
    pub fn is_match(&self, path: &str) -> bool {
        self.matcher.is_match(path)
    }
}

/// Expands one gitignore line into its rule kind and anchored patterns.
///
/// `base` is the directory holding the ignore file, relative to the scan
/// root with forward slashes (empty for the root itself). Returns `None`
/// for blank lines and comments.
pub fn expand_line(line: &str, base: &str) -> Option<(RuleKind, Vec<String>)> {
    let line = line.trim_end();
    if line.is_empty() || line.starts_with('#') {
        return None;
    }

    let (kind, body) = if line.starts_with("\\#") || line.starts_with("\\!") {
        (RuleKind::Ignore, &line[1..])
    } else if let Some(rest) = line.strip_prefix('!') {
        (RuleKind::Negate, rest)
    } else {
        (RuleKind::Ignore, line)
    };

    // `build/` covers the directory itself as well as everything below it.
    let body = body.strip_suffix('/').unwrap_or(body);
    let (anchored, body) = match body.strip_prefix('/') {
        Some(rest) => (true, rest),
        None => (body.contains('/'), body),
    };
    if body.is_empty() {
        return None;
    }

    let base = base.trim_matches('/');
    let pattern = match (base.is_empty(), anchored) {
        (true, true) => body.to_string(),
        (true, false) => format!("**/{body}"),
        (false, true) => format!("{base}/{body}"),
        (false, false) => format!("{base}/**/{body}"),
    };

    let contents = (!pattern.ends_with("/**")).then(|| format!("{pattern}/**"));
    let mut patterns = vec![pattern];
    patterns.extend(contents);
    Some((kind, patterns))
}

/// Ordered rule list for one scan root.
///
/// Order is discovery order: built-in defaults, then `.gitignore` files from
/// shallowest to deepest (top to bottom within a file), then caller extras.
/// Rules are never reordered or deduplicated.
#[derive(Debug, Clone, Default)]
pub struct IgnoreRuleSet {
    rules: Vec<IgnoreRule>,
    default_rule_count: usize,
    sources: Vec<PathBuf>,
}

impl IgnoreRuleSet {
    /// An empty set; ignores nothing.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Wraps already-compiled rules, preserving their order.
    pub fn from_rules(rules: Vec<IgnoreRule>) -> Self {
        Self {
            rules,
            default_rule_count: 0,
            sources: Vec::new(),
        }
    }

    /// Parses gitignore text as if it lived in `base`.
    pub fn parse(content: &str, base: &str) -> Self {
        let mut set = Self::empty();
        for line in content.lines() {
            set.push_line(line, base);
        }
        set
    }

    /// Builds the rule set for `root`.
    ///
    /// Missing or unreadable `.gitignore` files are treated as empty.
    pub fn build(root: &Path, config: &IgnoreConfig) -> Self {
        let mut set = Self::empty();

        if config.use_default_excludes {
            for line in get_all_default_excludes() {
                set.push_line(line, "");
            }
            set.default_rule_count = set.rules.len();
        }

        if config.respect_gitignore {
            for file in find_gitignore_files(root) {
                let base = relative_base(root, &file);
                match std::fs::read_to_string(&file) {
                    Ok(content) => {
                        for line in content.lines() {
                            set.push_line(line, &base);
                        }
                        set.sources.push(file);
                    }
                    Err(err) => {
                        warn!("Skipping unreadable ignore file {}: {err}", file.display());
                    }
                }
            }
        }

        for line in &config.custom_excludes {
            set.push_line(line, "");
        }

        debug!(
            root = %root.display(),
            rules = set.rules.len(),
            sources = set.sources.len(),
            "Built ignore rule set"
        );
        set
    }

    /// Appends the rules produced by one gitignore line.
    ///
    /// A line whose glob fails to compile is skipped entirely.
    pub fn push_line(&mut self, line: &str, base: &str) {
        let Some((kind, patterns)) = expand_line(line, base) else {
            return;
        };
        let compiled: Result<Vec<_>, _> = patterns
            .iter()
            .map(|pattern| IgnoreRule::new(kind, pattern))
            .collect();
        match compiled {
            Ok(rules) => self.rules.extend(rules),
            Err(err) => warn!("Skipping invalid ignore pattern {line:?}: {err}"),
        }
    }

    pub fn rules(&self) -> &[IgnoreRule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Whether any rule can un-ignore a path.
    ///
    /// Walkers may only prune an ignored directory when this is false, since
    /// a later negation could re-include something below it.
    pub fn has_negations(&self) -> bool {
        self.rules.iter().any(|rule| rule.kind == RuleKind::Negate)
    }

    /// Number of leading rules that came from the built-in defaults.
    pub fn default_rule_count(&self) -> usize {
        self.default_rule_count
    }

    /// The `.gitignore` files that contributed rules, in read order.
    pub fn sources(&self) -> &[PathBuf] {
        &self.sources
    }
}

/// Directory of `ignore_file` relative to `root`, joined with `/`.
fn relative_base(root: &Path, ignore_file: &Path) -> String {
    ignore_file
        .parent()
        .and_then(|dir| dir.strip_prefix(root).ok())
        .map(|rel| {
            rel.components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/")
        })
        .unwrap_or_default()
}

#[cfg(test)]
#[path = "rule.test.rs"]
mod tests;
