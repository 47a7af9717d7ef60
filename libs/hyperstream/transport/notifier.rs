use crate::traits::*;
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use std::time::Duration;

/// Default base URL of the service that accepts disconnect notices
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000";

/// Upper bound on one notice, from connect until the body is read
pub const DEFAULT_NOTIFY_TIMEOUT: Duration = Duration::from_secs(5);

/// Sends `POST {base_url}/disconnect/{client_id}`
#[derive(Debug, Clone)]
pub struct HttpDisconnectNotifier {
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl HttpDisconnectNotifier {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            timeout: DEFAULT_NOTIFY_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Endpoint for `client_id`
    pub fn disconnect_url(&self, client_id: &str) -> String {
        format!(
            "{}/disconnect/{}",
            self.base_url.trim_end_matches('/'),
            client_id
        )
    }
}

impl Default for HttpDisconnectNotifier {
    fn default() -> Self {
        Self::new(DEFAULT_API_BASE_URL)
    }
}

#[async_trait]
impl DisconnectNotifier for HttpDisconnectNotifier {
    async fn notify_disconnect(&self, client_id: &str) -> Result<serde_json::Value> {
        let response = self
            .client
            .post(self.disconnect_url(client_id))
            .header(CONTENT_TYPE, "application/json")
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| StreamError::Notification(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(StreamError::Notification(format!(
                "HTTP error! status: {}",
                status.as_u16()
            )));
        }

        response
            .json::<serde_json::Value>()
            .await
            .map_err(|e| StreamError::Notification(format!("invalid response body: {}", e)))
    }
}
