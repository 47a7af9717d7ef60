//! Scripted transport
//!
//! A deterministic transport double: every `open` produces a
//! [`ScriptedConnection`] that the caller drives by hand. No network, no
//! timing of its own, so reconnection behaviour can be tested against a
//! paused clock.

use crate::traits::*;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// The caller's side of one opened connection
#[derive(Debug, Clone)]
pub struct ScriptedConnection {
    url: String,
    signals: SignalSender,
    ready: Arc<AtomicReadyState>,
    cancel: CancellationToken,
}

impl ScriptedConnection {
    /// URL the transport was asked to open
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Signal that the connection is established
    pub fn open(&self) {
        if self.ready.mark_open() {
            self.send(TransportSignal::Open);
        }
    }

    /// Deliver a named event
    pub fn message(&self, event: &str, data: &str) {
        self.send(TransportSignal::Message(RawMessage::named(event, data)));
    }

    /// Deliver a named event carrying an event id
    pub fn message_with_id(&self, event: &str, data: &str, id: &str) {
        self.send(TransportSignal::Message(RawMessage::new(
            Some(event),
            data,
            Some(id),
        )));
    }

    /// Deliver an unnamed event
    pub fn unnamed(&self, data: &str) {
        self.send(TransportSignal::Message(RawMessage::new(None, data, None)));
    }

    /// Fail the connection
    pub fn error(&self, reason: &str) {
        self.ready.set(ReadyState::Closed);
        self.send(TransportSignal::Error(StreamError::Transport(reason.into())));
    }

    /// True once the owner closed the handle
    pub fn is_closed(&self) -> bool {
        self.cancel.is_cancelled()
    }

    pub fn ready_state(&self) -> ReadyState {
        self.ready.get()
    }

    fn send(&self, signal: TransportSignal) {
        // The reader is gone once the handle was superseded
        let _ = self.signals.send(signal);
    }
}

struct ScriptedInner {
    opened_tx: mpsc::UnboundedSender<ScriptedConnection>,
    opened_rx: tokio::sync::Mutex<mpsc::UnboundedReceiver<ScriptedConnection>>,
    opens: AtomicUsize,
    history: Mutex<Vec<ScriptedConnection>>,
}

/// Transport whose connections are driven by the test
#[derive(Clone)]
pub struct ScriptedTransport {
    inner: Arc<ScriptedInner>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        let (opened_tx, opened_rx) = mpsc::unbounded_channel();
        Self {
            inner: Arc::new(ScriptedInner {
                opened_tx,
                opened_rx: tokio::sync::Mutex::new(opened_rx),
                opens: AtomicUsize::new(0),
                history: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Wait for the next `open` call and return its connection
    pub async fn next_connection(&self) -> Option<ScriptedConnection> {
        self.inner.opened_rx.lock().await.recv().await
    }

    /// Non-blocking variant of [`next_connection`](Self::next_connection)
    pub fn try_next_connection(&self) -> Option<ScriptedConnection> {
        self.inner.opened_rx.try_lock().ok()?.try_recv().ok()
    }

    /// Number of `open` calls so far
    pub fn open_count(&self) -> usize {
        self.inner.opens.load(Ordering::Acquire)
    }

    /// Most recently opened connection
    pub fn latest(&self) -> Option<ScriptedConnection> {
        self.inner.history.lock().last().cloned()
    }
}

impl Default for ScriptedTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ScriptedTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScriptedTransport")
            .field("opens", &self.open_count())
            .finish()
    }
}

impl Transport for ScriptedTransport {
    fn open(&self, url: &str) -> TransportHandle {
        let (signal_tx, signal_rx) = mpsc::unbounded_channel();
        let ready = Arc::new(AtomicReadyState::new(ReadyState::Connecting));
        let cancel = CancellationToken::new();

        let connection = ScriptedConnection {
            url: url.to_string(),
            signals: signal_tx,
            ready: Arc::clone(&ready),
            cancel: cancel.clone(),
        };

        self.inner.opens.fetch_add(1, Ordering::AcqRel);
        self.inner.history.lock().push(connection.clone());
        let _ = self.inner.opened_tx.send(connection);

        TransportHandle::new(signal_rx, ready, cancel)
    }

    fn name(&self) -> &'static str {
        "scripted"
    }
}
