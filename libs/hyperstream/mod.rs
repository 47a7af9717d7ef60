//! # HyperStream
//!
//! A server-push (Server-Sent Events) client built around a pluggable
//! transport and a bounded reconnection state machine.
//!
//! ## Features
//!
//! - **Pluggable transport**: real HTTP event-stream transport and a scripted
//!   double for deterministic tests
//! - **Reconnection state machine**: fixed-delay retry with a per-episode budget
//! - **Cooperative cancellation**: every connection episode owns a cancellation
//!   token that pending retry timers check before acting
//! - **Message passing**: manager events are delivered over a single ordered channel

pub mod core;
pub mod traits;
pub mod transport;

// Re-export all traits
pub use traits::*;

// Re-export core manager functionality
pub use crate::core::{
    config::ManagerConfig,
    connection_state::{AtomicConnectionState, ConnectionState},
    manager::{ConnectionManager, ManagerEvent},
};

// Re-export transports
pub use crate::transport::{
    frame::{FrameDecoder, SseFrame},
    notifier::HttpDisconnectNotifier,
    scripted::{ScriptedConnection, ScriptedTransport},
    sse::SseTransport,
};

/// Type alias for Result with StreamError
pub type Result<T> = std::result::Result<T, traits::StreamError>;
