//! Feed controller driving the connection manager

pub mod controller;

pub use controller::{FeedController, FeedUpdate, DEFAULT_RECONNECT_DELAY};
