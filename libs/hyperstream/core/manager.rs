use crate::core::config::ManagerConfig;
use crate::core::connection_state::{AtomicConnectionState, ConnectionState};
use crate::traits::*;
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Events emitted by the connection manager, in the order they happened
#[derive(Debug, Clone, PartialEq)]
pub enum ManagerEvent {
    /// A server-push event arrived on the current connection
    Message(RawMessage),
    /// The current connection failed
    Error(StreamError),
    /// The connection state changed
    StatusChanged(ConnectionState),
}

/// Mutable bookkeeping for the current connection episode
struct Episode {
    /// Handle of the connection currently owned by the manager
    handle: Option<TransportHandle>,
    /// Incremented on every open; signals from older handles are ignored
    generation: u64,
    /// Consecutive transport errors since the last successful open
    failures: usize,
    /// Cancelled by `disconnect()` and by the next `connect()`
    token: CancellationToken,
}

struct Shared<T: Transport> {
    transport: T,
    config: ManagerConfig,
    state: AtomicConnectionState,
    episode: Mutex<Episode>,
    event_tx: mpsc::UnboundedSender<ManagerEvent>,
}

/// Owns one transport connection at a time and keeps it alive
///
/// Transport errors move the manager to `Disconnected` and schedule a
/// retry after the strategy's delay. Once the strategy reports the budget
/// exhausted the manager enters `Failed` and stays there until the next
/// explicit [`connect`](Self::connect).
///
/// Cloning is cheap; all clones drive the same connection.
pub struct ConnectionManager<T: Transport> {
    shared: Arc<Shared<T>>,
}

impl<T: Transport> Clone for ConnectionManager<T> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<T: Transport> ConnectionManager<T> {
    /// Create a manager and the receiver for its events
    ///
    /// The receiver is the single subscriber; events arrive in the order the
    /// underlying signals were observed.
    pub fn new(
        transport: T,
        config: ManagerConfig,
    ) -> (Self, mpsc::UnboundedReceiver<ManagerEvent>) {
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let manager = Self {
            shared: Arc::new(Shared {
                transport,
                config,
                state: AtomicConnectionState::default(),
                episode: Mutex::new(Episode {
                    handle: None,
                    generation: 0,
                    failures: 0,
                    token: CancellationToken::new(),
                }),
                event_tx,
            }),
        };
        (manager, event_rx)
    }

    /// Start a new connection episode
    ///
    /// Resets the retry counter, invalidates retry timers from earlier
    /// episodes and replaces any existing connection.
    pub fn connect(&self) {
        let mut episode = self.shared.episode.lock();
        episode.token.cancel();
        episode.token = CancellationToken::new();
        episode.failures = 0;

        info!(
            "Connecting to {} via {}",
            self.shared.config.url,
            self.shared.transport.name()
        );
        self.open_locked(&mut episode);
    }

    /// Close the connection and suppress any pending retry
    pub fn disconnect(&self) {
        let mut episode = self.shared.episode.lock();
        episode.token.cancel();

        if let Some(handle) = episode.handle.take() {
            handle.close();
            info!("Stream connection manually closed");
        }

        self.set_state(ConnectionState::Disconnected);
    }

    /// Best-effort notice to the remote service that `client_id` is leaving
    ///
    /// Never touches local connection state. An empty id is a no-op.
    ///
    /// # Errors
    /// Returns the notifier's error (non-success status, transport failure,
    /// non-JSON body) after logging it.
    pub async fn notify_server_disconnect(&self, client_id: &str) -> Result<serde_json::Value> {
        if client_id.is_empty() {
            return Ok(serde_json::Value::Null);
        }

        let notifier = Arc::clone(&self.shared.config.notifier);
        match notifier.notify_disconnect(client_id).await {
            Ok(body) => {
                info!(client_id = %client_id, "Server disconnect successful: {}", body);
                Ok(body)
            }
            Err(e) => {
                warn!(client_id = %client_id, "Server disconnect failed: {}", e);
                Err(e)
            }
        }
    }

    /// Current connection state
    #[inline]
    pub fn state(&self) -> ConnectionState {
        self.shared.state.get()
    }

    #[inline]
    pub fn is_connected(&self) -> bool {
        self.shared.state.is_connected()
    }

    /// Readiness of the underlying transport handle
    ///
    /// Diagnostic only; [`state`](Self::state) is authoritative.
    pub fn transport_ready_state(&self) -> ReadyState {
        self.shared
            .episode
            .lock()
            .handle
            .as_ref()
            .map(TransportHandle::ready_state)
            .unwrap_or(ReadyState::Closed)
    }

    /// Configured endpoint
    pub fn url(&self) -> &str {
        self.shared.config.url()
    }

    /// Consecutive failures in the current episode
    pub(crate) fn failures(&self) -> usize {
        self.shared.episode.lock().failures
    }

    fn emit(&self, event: ManagerEvent) {
        if self.shared.event_tx.send(event).is_err() {
            debug!("Manager event receiver dropped");
        }
    }

    fn set_state(&self, state: ConnectionState) {
        let previous = self.shared.state.set(state);
        if previous != state {
            debug!("Connection state: {} -> {}", previous, state);
            self.emit(ManagerEvent::StatusChanged(state));
        }
    }

    /// Replace the current handle with a freshly opened one
    fn open_locked(&self, episode: &mut Episode) {
        if let Some(previous) = episode.handle.take() {
            previous.close();
        }

        episode.generation += 1;
        let generation = episode.generation;
        self.set_state(ConnectionState::Connecting);

        let mut handle = self.shared.transport.open(&self.shared.config.url);
        let signals = handle.take_signals();
        episode.handle = Some(handle);

        let Some(mut signals) = signals else {
            warn!("Transport handle has no signal receiver");
            return;
        };

        let manager = self.clone();
        tokio::spawn(async move {
            while let Some(signal) = signals.recv().await {
                if !manager.on_signal(generation, signal) {
                    break;
                }
            }
            debug!(generation, "Signal reader exiting");
        });
    }

    /// Apply one transport signal; returns false once the handle is finished
    fn on_signal(&self, generation: u64, signal: TransportSignal) -> bool {
        let mut episode = self.shared.episode.lock();

        if generation != episode.generation || episode.token.is_cancelled() {
            debug!(generation, "Ignoring signal from superseded connection");
            return false;
        }

        match signal {
            TransportSignal::Open => {
                info!("Stream connection opened");
                episode.failures = 0;
                self.set_state(ConnectionState::Connected);
                true
            }
            TransportSignal::Message(message) => {
                debug!(event = ?message.event, id = ?message.id, "Stream event received");
                self.emit(ManagerEvent::Message(message));
                true
            }
            TransportSignal::Error(err) => {
                warn!("Stream error: {}", err);
                if let Some(handle) = episode.handle.take() {
                    handle.close();
                }
                self.set_state(ConnectionState::Disconnected);
                self.emit(ManagerEvent::Error(err));
                self.schedule_reconnect(&mut episode);
                false
            }
        }
    }

    fn schedule_reconnect(&self, episode: &mut Episode) {
        episode.failures += 1;
        let failures = episode.failures;
        let strategy = &self.shared.config.reconnect_strategy;

        let Some(delay) = strategy.next_delay(failures) else {
            error!("Max reconnection attempts reached ({} failures)", failures);
            self.set_state(ConnectionState::Failed);
            return;
        };

        match strategy.max_failures() {
            Some(max) => info!("Attempting reconnection {}/{} in {:?}", failures, max, delay),
            None => info!("Attempting reconnection {} in {:?}", failures, delay),
        }
        self.set_state(ConnectionState::Connecting);

        let token = episode.token.clone();
        let manager = self.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            manager.retry(&token);
        });
    }

    /// Retry timer callback; a no-op once the episode was cancelled
    fn retry(&self, token: &CancellationToken) {
        let mut episode = self.shared.episode.lock();
        if token.is_cancelled() {
            debug!("Retry timer fired after disconnect, ignoring");
            return;
        }
        self.open_locked(&mut episode);
    }
}

impl<T: Transport> std::fmt::Debug for ConnectionManager<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionManager")
            .field("transport", &self.shared.transport.name())
            .field("config", &self.shared.config)
            .field("state", &self.state())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::scripted::ScriptedTransport;
    use std::time::Duration;

    fn manager() -> (
        ConnectionManager<ScriptedTransport>,
        mpsc::UnboundedReceiver<ManagerEvent>,
        ScriptedTransport,
    ) {
        let transport = ScriptedTransport::new();
        let (manager, events) =
            ConnectionManager::new(transport.clone(), ManagerConfig::new("http://feed.test/sse"));
        (manager, events, transport)
    }

    async fn wait_for_state(
        events: &mut mpsc::UnboundedReceiver<ManagerEvent>,
        state: ConnectionState,
    ) {
        while let Some(event) = events.recv().await {
            if event == ManagerEvent::StatusChanged(state) {
                return;
            }
        }
        panic!("event channel closed before reaching {}", state);
    }

    #[tokio::test(start_paused = true)]
    async fn test_open_resets_failure_counter() {
        let (manager, mut events, transport) = manager();
        manager.connect();

        for expected in 1..=4 {
            let conn = transport.next_connection().await.unwrap();
            conn.error("connection refused");
            wait_for_state(&mut events, ConnectionState::Disconnected).await;
            assert_eq!(manager.failures(), expected);
        }

        let conn = transport.next_connection().await.unwrap();
        conn.open();
        wait_for_state(&mut events, ConnectionState::Connected).await;
        assert_eq!(manager.failures(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_connect_resets_failure_counter() {
        let (manager, mut events, transport) = manager();
        manager.connect();

        let conn = transport.next_connection().await.unwrap();
        conn.error("reset by peer");
        wait_for_state(&mut events, ConnectionState::Disconnected).await;
        assert_eq!(manager.failures(), 1);

        manager.connect();
        assert_eq!(manager.failures(), 0);
        assert!(conn.is_closed());
    }

    #[tokio::test(start_paused = true)]
    async fn test_fresh_episode_after_recovery_gets_full_budget() {
        let (manager, mut events, transport) = manager();
        manager.connect();

        // 9 failures, then recovery
        for _ in 0..9 {
            let conn = transport.next_connection().await.unwrap();
            conn.error("flaky");
            wait_for_state(&mut events, ConnectionState::Disconnected).await;
        }
        let conn = transport.next_connection().await.unwrap();
        conn.open();
        wait_for_state(&mut events, ConnectionState::Connected).await;

        // Second episode: 9 more failures must still be retried
        conn.error("dropped");
        for _ in 0..8 {
            wait_for_state(&mut events, ConnectionState::Connecting).await;
            let conn = transport.next_connection().await.unwrap();
            conn.error("still down");
        }
        wait_for_state(&mut events, ConnectionState::Connecting).await;
        assert_eq!(manager.failures(), 9);
        assert!(transport.next_connection().await.is_some());
        assert_eq!(manager.state(), ConnectionState::Connecting);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_waits_fixed_delay() {
        let (manager, mut events, transport) = manager();
        manager.connect();

        let conn = transport.next_connection().await.unwrap();
        conn.error("boom");
        wait_for_state(&mut events, ConnectionState::Connecting).await;

        let started = tokio::time::Instant::now();
        transport.next_connection().await.unwrap();
        assert!(started.elapsed() >= Duration::from_millis(3000));
    }

    #[tokio::test(start_paused = true)]
    async fn test_ready_state_tracks_handle() {
        let (manager, mut events, transport) = manager();
        assert_eq!(manager.transport_ready_state(), ReadyState::Closed);

        manager.connect();
        assert_eq!(manager.transport_ready_state(), ReadyState::Connecting);

        let conn = transport.next_connection().await.unwrap();
        conn.open();
        wait_for_state(&mut events, ConnectionState::Connected).await;
        assert_eq!(manager.transport_ready_state(), ReadyState::Open);

        manager.disconnect();
        assert_eq!(manager.transport_ready_state(), ReadyState::Closed);
    }
}
