//! Connection management
//!
//! ```rust,ignore
//! use hyperstream::{ConnectionManager, ManagerConfig, ManagerEvent, SseTransport};
//!
//! let config = ManagerConfig::new("http://localhost:8001/sse");
//! let (manager, mut events) = ConnectionManager::new(SseTransport::new(), config);
//! manager.connect();
//!
//! while let Some(event) = events.recv().await {
//!     println!("Event: {:?}", event);
//! }
//! ```

pub mod config;
pub mod connection_state;
pub mod manager;

// Re-export main types
pub use config::ManagerConfig;
pub use connection_state::{AtomicConnectionState, ConnectionState};
pub use manager::{ConnectionManager, ManagerEvent};
