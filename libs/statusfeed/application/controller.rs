use crate::domain::{latest_status, EventBuffer, EventData, FeedStats, StreamEvent};
use crate::infrastructure::FeedConfig;
use chrono::Utc;
use hyperstream::transport::notifier::DEFAULT_NOTIFY_TIMEOUT;
use hyperstream::{
    ConnectionManager, ConnectionState, ManagerEvent, RawMessage, StreamError, Transport,
};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Default pause between disconnect and connect on a manual reconnect
pub const DEFAULT_RECONNECT_DELAY: Duration = Duration::from_millis(1000);

/// What a processed manager event changed
#[derive(Debug, Clone, PartialEq)]
pub enum FeedUpdate {
    /// A new event was appended to the buffer
    Event(StreamEvent),
    Status(ConnectionState),
    Error(StreamError),
}

/// Event store and user-facing actions over a [`ConnectionManager`]
///
/// The controller is the only consumer of the manager's events. It keeps the
/// bounded event buffer, the client id announced by the server and the last
/// stream error. Connection state is read from the manager, never stored here.
pub struct FeedController<T: Transport> {
    manager: ConnectionManager<T>,
    events: mpsc::UnboundedReceiver<ManagerEvent>,
    buffer: EventBuffer,
    client_id: Option<String>,
    error: Option<StreamError>,
    reconnect_delay: Duration,
    /// Bound on the disconnect notice; the local disconnect follows regardless
    notify_timeout: Duration,
}

impl<T: Transport> FeedController<T> {
    pub fn new(manager: ConnectionManager<T>, events: mpsc::UnboundedReceiver<ManagerEvent>) -> Self {
        Self {
            manager,
            events,
            buffer: EventBuffer::new(),
            client_id: None,
            error: None,
            reconnect_delay: DEFAULT_RECONNECT_DELAY,
            notify_timeout: DEFAULT_NOTIFY_TIMEOUT,
        }
    }

    /// Build the manager and controller from configuration
    pub fn from_config(transport: T, config: &FeedConfig) -> Self {
        let (manager, events) = ConnectionManager::new(transport, config.to_manager_config());
        Self::new(manager, events)
            .with_capacity(config.buffer_capacity)
            .with_reconnect_delay(config.manual_reconnect_delay())
            .with_notify_timeout(config.notify_timeout())
    }

    /// Replace the buffer with an empty one holding `capacity` events
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.buffer = EventBuffer::with_capacity(capacity);
        self
    }

    pub fn with_reconnect_delay(mut self, delay: Duration) -> Self {
        self.reconnect_delay = delay;
        self
    }

    pub fn with_notify_timeout(mut self, timeout: Duration) -> Self {
        self.notify_timeout = timeout;
        self
    }

    /// Buffered events, oldest first
    pub fn events(&self) -> &EventBuffer {
        &self.buffer
    }

    pub fn connection_status(&self) -> ConnectionState {
        self.manager.state()
    }

    pub fn is_connected(&self) -> bool {
        self.manager.is_connected()
    }

    pub fn client_id(&self) -> Option<&str> {
        self.client_id.as_deref()
    }

    /// Last stream error, cleared by the next message
    pub fn error(&self) -> Option<&StreamError> {
        self.error.as_ref()
    }

    pub fn manager(&self) -> &ConnectionManager<T> {
        &self.manager
    }

    /// Decode and append one raw message
    ///
    /// Never fails: undecodable payloads are stored as a decode error.
    /// A `connected` event updates the client id.
    pub fn add_event(&mut self, raw: RawMessage) -> StreamEvent {
        let event = StreamEvent::from_raw(raw, Utc::now());

        if let Some(client_id) = event.client_id() {
            info!(client_id = %client_id, "Connected with client ID");
            self.client_id = Some(client_id.to_string());
        }
        debug!(id = %event.id(), kind = %event.kind(), "Event received");

        self.buffer.push(event.clone());
        event
    }

    /// Apply one manager event
    pub fn handle_event(&mut self, event: ManagerEvent) -> FeedUpdate {
        match event {
            ManagerEvent::Message(raw) => {
                self.error = None;
                FeedUpdate::Event(self.add_event(raw))
            }
            ManagerEvent::Error(err) => {
                warn!("Stream error: {}", err);
                self.error = Some(err.clone());
                FeedUpdate::Error(err)
            }
            ManagerEvent::StatusChanged(state) => {
                info!("Connection status: {}", state);
                FeedUpdate::Status(state)
            }
        }
    }

    /// Wait for the next manager event and apply it
    ///
    /// Cancel safe. Returns `None` only if the manager is gone.
    pub async fn process_next(&mut self) -> Option<FeedUpdate> {
        let event = self.events.recv().await?;
        Some(self.handle_event(event))
    }

    /// Apply every manager event already queued, returning how many
    pub fn drain_pending(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(event) = self.events.try_recv() {
            self.handle_event(event);
            applied += 1;
        }
        applied
    }

    /// Start a fresh connection with an empty buffer
    ///
    /// No-op while already connected.
    pub fn connect(&mut self) {
        if self.is_connected() {
            info!("Already connected");
            return;
        }

        // Flush events from the previous connection so none land after the clear
        self.drain_pending();
        self.buffer.clear();
        self.error = None;
        self.manager.connect();
    }

    /// Tell the server we are leaving, then close the connection
    ///
    /// A failed or slow notification is logged and otherwise ignored; the
    /// notice is abandoned after the notify timeout.
    pub async fn disconnect(&mut self) {
        if let Some(client_id) = self.client_id.clone() {
            let notice = self.manager.notify_server_disconnect(&client_id);
            match tokio::time::timeout(self.notify_timeout, notice).await {
                Ok(Ok(_)) => {}
                Ok(Err(e)) => warn!("Error notifying server of disconnect: {}", e),
                Err(_) => warn!(
                    "Server disconnect notice timed out after {:?}",
                    self.notify_timeout
                ),
            }
        }

        self.manager.disconnect();
        self.drain_pending();
        self.client_id = None;
        self.error = None;
    }

    /// Disconnect, pause, then connect again
    pub async fn reconnect(&mut self) {
        info!("Manual reconnect in {:?}", self.reconnect_delay);
        self.disconnect().await;
        tokio::time::sleep(self.reconnect_delay).await;
        self.connect();
    }

    /// Empty the buffer; connection and client id are untouched
    pub fn clear_events(&mut self) {
        self.buffer.clear();
    }

    pub fn stats(&self) -> FeedStats {
        FeedStats::compute(&self.buffer, self.is_connected(), self.client_id())
    }

    /// Payload of the most recent `status` event
    pub fn latest_status(&self) -> Option<&EventData> {
        latest_status(&self.buffer)
    }
}

impl<T: Transport> std::fmt::Debug for FeedController<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FeedController")
            .field("status", &self.connection_status())
            .field("events", &self.buffer.len())
            .field("client_id", &self.client_id)
            .field("error", &self.error)
            .finish()
    }
}
