//! # HyperStream Traits
//!
//! Core traits and types shared by the manager and the transports:
//!
//! - **Transport**: open a server-push connection and surface its signals
//! - **ReconnectionStrategy**: control retry delays and the retry budget
//! - **DisconnectNotifier**: tell the remote peer a client is leaving

pub mod error;
pub mod notifier;
pub mod reconnect;
pub mod transport;

// Re-export commonly used types
pub use error::{Result, StreamError};
pub use notifier::{DisconnectNotifier, NoopNotifier};
pub use reconnect::{FixedDelay, NeverReconnect, ReconnectionStrategy};
pub use transport::{
    AtomicReadyState, RawMessage, ReadyState, SignalSender, Transport, TransportHandle,
    TransportSignal,
};
