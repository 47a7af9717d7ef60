//! Status feed client
//!
//! Consumes a server-push status stream through `hyperstream`, decodes its
//! `connected` and `status` events and keeps the most recent ones in a
//! bounded buffer.
//!
//! # Example
//!
//! ```no_run
//! use hyperstream::SseTransport;
//! use statusfeed::{FeedConfig, FeedController};
//!
//! # async fn run() -> Result<(), statusfeed::ConfigError> {
//! let config = FeedConfig::load("config/feed_config.yaml")?;
//! let mut controller = FeedController::from_config(SseTransport::new(), &config);
//! controller.connect();
//!
//! while let Some(update) = controller.process_next().await {
//!     println!("{:?} / {}", update, controller.stats());
//! }
//! # Ok(())
//! # }
//! ```

pub mod application;
pub mod domain;
pub mod infrastructure;

pub use application::{FeedController, FeedUpdate};
pub use domain::{
    ConnectedPayload, EventBuffer, EventData, EventKind, FeedStats, StatusPayload, StreamEvent,
};
pub use infrastructure::{ConfigError, FeedConfig};
