//! Status Feed Client - Main Library
//!
//! ## Architecture
//!
//! - **bin_common**: Common utilities for binary executables (CLI, runners)
//! - **statusfeed**: Event store and controller (re-exported from workspace)
//! - **hyperstream**: Server-push stream library (re-exported from workspace)
//!
//! ## Usage in Binaries
//!
//! ```rust
//! use status_feed_client::bin_common::{load_config_from_env, ConfigType};
//! use status_feed_client::statusfeed::FeedController;
//! ```

// Re-export workspace libraries for convenience
pub use hyperstream;
pub use statusfeed;

// Binary common utilities
pub mod bin_common {
    //! Common utilities for binary executables

    pub mod cli;
    pub mod runner;

    pub use cli::{load_config_from_env, ConfigType};
    pub use runner::{print_banner, print_shutdown, RunConfig};
}
