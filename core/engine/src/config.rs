//! Engine configuration, loaded from TOML.
//!
//! ```toml
//! filter_cache_ttl_secs = 30
//! default_timeout_ms = 120000
//! kill_grace_ms = 1000
//! max_pending_output_bytes = 1048576
//! default_max_results = 100
//! extra_excludes = ["*.generated.rs"]
//!
//! [logging]
//! level = "info"
//! ```

use std::path::Path;
use std::time::Duration;

use quill_file_ignore::DEFAULT_CACHE_TTL;
use quill_file_search::DEFAULT_MAX_RESULTS;
use quill_shell::DEFAULT_KILL_GRACE;
use quill_shell::DEFAULT_MAX_PENDING_BYTES;
use quill_shell::DEFAULT_TIMEOUT;
use quill_utils_common::LoggingConfig;
use serde::Deserialize;
use serde::Serialize;
use snafu::ResultExt;
use snafu::ensure;
use tracing::debug;

use crate::error::EngineError;
use crate::error::engine_error;

/// Tunables of a [`crate::ToolEngine`]. Every field has a default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Lifetime of a cached path filter.
    pub filter_cache_ttl_secs: u64,
    /// Foreground timeout when an invocation sets none.
    pub default_timeout_ms: u64,
    /// Delay between SIGTERM and SIGKILL.
    pub kill_grace_ms: u64,
    /// Cap on each background output stream between drains.
    pub max_pending_output_bytes: usize,
    /// Search limit when a request sets none.
    pub default_max_results: usize,
    /// Exclude lines appended to every path filter.
    pub extra_excludes: Vec<String>,
    pub logging: LoggingConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            filter_cache_ttl_secs: DEFAULT_CACHE_TTL.as_secs(),
            default_timeout_ms: DEFAULT_TIMEOUT.as_millis() as u64,
            kill_grace_ms: DEFAULT_KILL_GRACE.as_millis() as u64,
            max_pending_output_bytes: DEFAULT_MAX_PENDING_BYTES,
            default_max_results: DEFAULT_MAX_RESULTS,
            extra_excludes: Vec::new(),
            logging: LoggingConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Parses and validates a TOML document.
    pub fn from_toml_str(content: &str) -> Result<Self, EngineError> {
        Self::parse(content, "<inline>")
    }

    /// Loads a config file. A missing or empty file yields the defaults; a
    /// malformed one is an error.
    pub fn load(path: &Path) -> Result<Self, EngineError> {
        if !path.exists() {
            debug!(path = %path.display(), "Config file not found, using defaults");
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .context(engine_error::ConfigReadSnafu { path })?;
        if content.trim().is_empty() {
            debug!(path = %path.display(), "Config file is empty, using defaults");
            return Ok(Self::default());
        }
        Self::parse(&content, &path.display().to_string())
    }

    fn parse(content: &str, origin: &str) -> Result<Self, EngineError> {
        let config: Self =
            toml::from_str(content).context(engine_error::ConfigParseSnafu { origin })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        ensure!(
            self.default_max_results > 0,
            engine_error::InvalidConfigSnafu {
                message: "default_max_results must be at least 1",
            }
        );
        ensure!(
            self.default_timeout_ms > 0,
            engine_error::InvalidConfigSnafu {
                message: "default_timeout_ms must be positive",
            }
        );
        ensure!(
            self.max_pending_output_bytes > 0,
            engine_error::InvalidConfigSnafu {
                message: "max_pending_output_bytes must be positive",
            }
        );
        Ok(())
    }

    pub fn filter_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.filter_cache_ttl_secs)
    }

    pub fn default_timeout(&self) -> Duration {
        Duration::from_millis(self.default_timeout_ms)
    }

    pub fn kill_grace(&self) -> Duration {
        Duration::from_millis(self.kill_grace_ms)
    }
}

#[cfg(test)]
#[path = "config.test.rs"]
mod tests;
