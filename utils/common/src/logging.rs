//! Tracing subscriber setup shared by binaries.
//!
//! Library crates only emit `tracing` events; a binary calls
//! [`init_stderr_logging`] (or builds its own layer with
//! [`configure_fmt_layer!`](crate::configure_fmt_layer)) exactly once.

use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::time::FormatTime;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::util::TryInitError;

/// Timezone used for log timestamps.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimezoneConfig {
    #[default]
    Local,
    Utc,
}

/// Logging options.
///
/// ```toml
/// level = "info"
/// modules = ["quill_shell=debug"]
/// location = true
/// timezone = "utc"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Include file and line of the event.
    pub location: bool,
    /// Include the event target (module path).
    pub target: bool,
    pub timezone: TimezoneConfig,
    /// Base level or directive list, e.g. `"info"` or `"warn,quill=debug"`.
    pub level: String,
    /// Extra per-module directives appended after `level`.
    pub modules: Vec<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            location: false,
            target: false,
            timezone: TimezoneConfig::Local,
            level: "info".to_string(),
            modules: Vec::new(),
        }
    }
}

/// Timestamp formatter switching between local time and UTC at runtime.
#[derive(Debug, Clone, Copy)]
pub struct ConfigurableTimer {
    timezone: TimezoneConfig,
}

impl ConfigurableTimer {
    pub fn new(timezone: TimezoneConfig) -> Self {
        Self { timezone }
    }
}

impl FormatTime for ConfigurableTimer {
    fn format_time(&self, w: &mut Writer<'_>) -> fmt::Result {
        match self.timezone {
            TimezoneConfig::Local => {
                write!(w, "{}", chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f"))
            }
            TimezoneConfig::Utc => {
                write!(w, "{}", chrono::Utc::now().format("%Y-%m-%d %H:%M:%S%.3fZ"))
            }
        }
    }
}

/// Directive string built from the config, `default_level` standing in
/// for an empty `level`.
pub fn filter_directives(config: &LoggingConfig, default_level: &str) -> String {
    let level = config.level.trim();
    let mut directives = vec![if level.is_empty() { default_level } else { level }];
    directives.extend(
        config
            .modules
            .iter()
            .map(String::as_str)
            .map(str::trim)
            .filter(|m| !m.is_empty()),
    );
    directives.join(",")
}

/// Builds the event filter. `RUST_LOG` wins when set and valid.
pub fn build_env_filter(config: &LoggingConfig, default_level: &str) -> EnvFilter {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return filter;
    }
    EnvFilter::try_new(filter_directives(config, default_level))
        .unwrap_or_else(|_| EnvFilter::new(default_level))
}

/// Applies location, target, timer and filter settings to a fmt layer.
///
/// ```no_run
/// use quill_utils_common::LoggingConfig;
/// use tracing_subscriber::fmt;
///
/// let config = LoggingConfig::default();
/// let _layer = quill_utils_common::configure_fmt_layer!(
///     fmt::layer().with_ansi(false),
///     &config,
///     "info"
/// );
/// ```
#[macro_export]
macro_rules! configure_fmt_layer {
    ($layer:expr, $config:expr, $default_level:expr) => {{
        use $crate::__tracing_subscriber::Layer as _;
        let config: &$crate::LoggingConfig = $config;
        $layer
            .with_file(config.location)
            .with_line_number(config.location)
            .with_target(config.target)
            .with_timer($crate::ConfigurableTimer::new(config.timezone))
            .with_filter($crate::build_env_filter(config, $default_level))
    }};
}

/// Installs a global subscriber writing to stderr.
///
/// Fails if a global subscriber is already set.
pub fn init_stderr_logging(config: &LoggingConfig, default_level: &str) -> Result<(), TryInitError> {
    let layer = configure_fmt_layer!(
        tracing_subscriber::fmt::layer().with_writer(std::io::stderr),
        config,
        default_level
    );
    tracing_subscriber::registry().with(layer).try_init()
}

#[cfg(test)]
#[path = "logging.test.rs"]
mod tests;
