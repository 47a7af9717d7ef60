//! Configuration and logging

pub mod config;
pub mod logging;

pub use config::{ConfigError, FeedConfig};
pub use logging::{init_tracing, init_tracing_with_level};
