//! Builders
//!
//! Fluent builders for configuration.

mod config;

pub use config::{session_config, SessionConfigBuilder};
