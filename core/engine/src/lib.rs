//! Local tool execution engine.
//!
//! [`ToolEngine`] is the single entry point a tool dispatch layer talks to.
//! It owns the path filter cache, session contexts and background processes,
//! and wraps every outcome in a [`ToolResponse`] whose `status` field tells
//! success, configuration errors, spawn failures, timeouts and cancellations
//! apart without parsing messages.
//!
//! ```no_run
//! use quill_engine::EngineConfig;
//! use quill_engine::GlobParams;
//! use quill_engine::ToolEngine;
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn example() {
//! let engine = ToolEngine::new("/project", EngineConfig::default());
//! let response = engine
//!     .glob(GlobParams::new("**/*.rs"), CancellationToken::new())
//!     .await;
//! if let Some(result) = response.payload {
//!     println!("{}", result.summary());
//! }
//! engine.shutdown().await;
//! # }
//! ```

mod config;
mod engine;
mod error;
mod response;

pub use config::EngineConfig;
pub use engine::GlobParams;
pub use engine::ToolEngine;
pub use error::EngineError;
pub use response::ToolResponse;
