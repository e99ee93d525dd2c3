//! Gitignore-aware path filtering.
//!
//! Rules from built-in defaults, every `.gitignore` under a root and caller
//! extras are compiled into one ordered [`IgnoreRuleSet`]. A [`PathFilter`]
//! answers ignore queries against it with last-match-wins precedence, and
//! [`FilterCache`] keeps built filters around for a short TTL.

mod cache;
mod config;
mod filter;
mod patterns;
mod rule;
mod service;

pub use cache::DEFAULT_CACHE_TTL;
pub use cache::FilterCache;
pub use config::IgnoreConfig;
pub use filter::PathFilter;
pub use patterns::COMMON_DIRECTORY_EXCLUDES;
pub use patterns::LOCKFILE_EXCLUDES;
pub use patterns::SYSTEM_FILE_EXCLUDES;
pub use patterns::VCS_DIRECTORY_EXCLUDES;
pub use patterns::default_excluded_dir_names;
pub use patterns::get_all_default_excludes;
pub use rule::IgnoreRule;
pub use rule::IgnoreRuleSet;
pub use rule::RuleKind;
pub use rule::expand_line;
pub use service::GITIGNORE_FILE;
pub use service::IgnoreService;
pub use service::find_gitignore_files;
