use crate::error::Result;
use async_trait::async_trait;

/// Trait for telling the remote service that a client is leaving voluntarily
///
/// Notification is best effort: callers log failures and carry on with the
/// local teardown regardless of the outcome.
#[async_trait]
pub trait DisconnectNotifier: Send + Sync + 'static {
    /// Notify the peer that `client_id` is disconnecting
    ///
    /// # Returns
    /// * `Ok(body)` - The peer acknowledged with a success status and JSON body
    /// * `Err(StreamError)` - Non-success status, transport failure or non-JSON body
    async fn notify_disconnect(&self, client_id: &str) -> Result<serde_json::Value>;
}

/// A notifier that never contacts anyone
pub struct NoopNotifier;

#[async_trait]
impl DisconnectNotifier for NoopNotifier {
    async fn notify_disconnect(&self, _client_id: &str) -> Result<serde_json::Value> {
        Ok(serde_json::Value::Null)
    }
}
