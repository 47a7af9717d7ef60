//! Transport abstraction
//!
//! A transport opens exactly one server-push connection per call to
//! [`Transport::open`] and reports what happens to it through
//! [`TransportSignal`]s. It never retries on its own; retry policy lives
//! in the connection manager.

use crate::error::StreamError;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// A single dispatched server-push event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawMessage {
    /// Event name (`event:` field); `None` for unnamed events
    pub event: Option<String>,
    /// Event payload (`data:` lines joined with `\n`)
    pub data: String,
    /// Last event id reported by the stream, if any
    pub id: Option<String>,
}

impl RawMessage {
    pub fn new(event: Option<&str>, data: impl Into<String>, id: Option<&str>) -> Self {
        Self {
            event: event.map(str::to_string),
            data: data.into(),
            id: id.map(str::to_string),
        }
    }

    /// Convenience constructor for a named event without id
    pub fn named(event: &str, data: impl Into<String>) -> Self {
        Self::new(Some(event), data, None)
    }
}

/// Signals surfaced by an open transport handle
#[derive(Debug, Clone, PartialEq)]
pub enum TransportSignal {
    /// Connection established, stream is flowing
    Open,
    /// An event was received
    Message(RawMessage),
    /// Connection failed or was lost
    Error(StreamError),
}

/// Sender half used by transport implementations to publish signals
pub type SignalSender = mpsc::UnboundedSender<TransportSignal>;

/// Readiness of a transport handle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ReadyState {
    Connecting = 0,
    Open = 1,
    Closed = 2,
}

impl ReadyState {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => ReadyState::Connecting,
            1 => ReadyState::Open,
            _ => ReadyState::Closed,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ReadyState::Connecting => "connecting",
            ReadyState::Open => "open",
            ReadyState::Closed => "closed",
        }
    }
}

impl std::fmt::Display for ReadyState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lock-free ready state shared between a handle and its reader task
#[derive(Debug)]
pub struct AtomicReadyState(AtomicU8);

impl AtomicReadyState {
    pub fn new(state: ReadyState) -> Self {
        Self(AtomicU8::new(state as u8))
    }

    #[inline]
    pub fn get(&self) -> ReadyState {
        ReadyState::from_u8(self.0.load(Ordering::Acquire))
    }

    #[inline]
    pub fn set(&self, state: ReadyState) {
        self.0.store(state as u8, Ordering::Release);
    }

    /// Move to `Open` unless the handle was already closed
    pub fn mark_open(&self) -> bool {
        self.0
            .compare_exchange(
                ReadyState::Connecting as u8,
                ReadyState::Open as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_ok()
    }
}

/// Handle to one opened transport connection
///
/// Dropping the handle does not close the connection; call [`close`](Self::close).
#[derive(Debug)]
pub struct TransportHandle {
    signals: Option<mpsc::UnboundedReceiver<TransportSignal>>,
    ready: Arc<AtomicReadyState>,
    cancel: CancellationToken,
}

impl TransportHandle {
    /// Build a handle from the parts a transport implementation keeps
    pub fn new(
        signals: mpsc::UnboundedReceiver<TransportSignal>,
        ready: Arc<AtomicReadyState>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            signals: Some(signals),
            ready,
            cancel,
        }
    }

    /// A handle that was never opened; closing it is a no-op
    pub fn closed() -> Self {
        let (_tx, rx) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();
        cancel.cancel();
        Self {
            signals: Some(rx),
            ready: Arc::new(AtomicReadyState::new(ReadyState::Closed)),
            cancel,
        }
    }

    /// Take the signal receiver; only the first call returns `Some`
    pub fn take_signals(&mut self) -> Option<mpsc::UnboundedReceiver<TransportSignal>> {
        self.signals.take()
    }

    #[inline]
    pub fn ready_state(&self) -> ReadyState {
        self.ready.get()
    }

    #[inline]
    pub fn is_closed(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Close the connection. Idempotent.
    pub fn close(&self) {
        self.cancel.cancel();
        self.ready.set(ReadyState::Closed);
    }
}

/// A server-push transport
///
/// `open` must return immediately and must never fail synchronously:
/// an unreachable endpoint is reported as a [`TransportSignal::Error`].
/// Implementations spawn onto the ambient tokio runtime.
pub trait Transport: Send + Sync + 'static {
    /// Begin connecting to `url`
    fn open(&self, url: &str) -> TransportHandle;

    /// Human-readable name for this transport
    fn name(&self) -> &'static str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_close_is_idempotent() {
        let (_tx, rx) = mpsc::unbounded_channel();
        let ready = Arc::new(AtomicReadyState::new(ReadyState::Connecting));
        let handle = TransportHandle::new(rx, Arc::clone(&ready), CancellationToken::new());

        assert_eq!(handle.ready_state(), ReadyState::Connecting);
        handle.close();
        handle.close();
        assert!(handle.is_closed());
        assert_eq!(ready.get(), ReadyState::Closed);
    }

    #[test]
    fn test_never_opened_handle() {
        let mut handle = TransportHandle::closed();
        assert!(handle.is_closed());
        handle.close();
        assert_eq!(handle.ready_state(), ReadyState::Closed);
        assert!(handle.take_signals().is_some());
        assert!(handle.take_signals().is_none());
    }

    #[test]
    fn test_mark_open_after_close_is_rejected() {
        let ready = AtomicReadyState::new(ReadyState::Connecting);
        ready.set(ReadyState::Closed);
        assert!(!ready.mark_open());
        assert_eq!(ready.get(), ReadyState::Closed);
    }
}
