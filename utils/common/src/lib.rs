//! Shared helpers for quill crates: logging setup and duration formatting.

mod elapsed;
mod logging;

pub use elapsed::format_millis;
pub use logging::ConfigurableTimer;
pub use logging::LoggingConfig;
pub use logging::TimezoneConfig;
pub use logging::build_env_filter;
pub use logging::filter_directives;
pub use logging::init_stderr_logging;

#[doc(hidden)]
pub use tracing_subscriber as __tracing_subscriber;
