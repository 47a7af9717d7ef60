//! HTTP event-stream transport
//!
//! Opens a long-lived GET request and decodes the body with
//! [`FrameDecoder`]. One spawned task per handle; closing the handle
//! cancels the task and drops the connection.

use crate::traits::*;
use crate::transport::frame::FrameDecoder;
use futures::StreamExt;
use reqwest::header::{ACCEPT, CACHE_CONTROL, CONTENT_TYPE};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Server-Sent Events transport over reqwest
#[derive(Debug, Clone, Default)]
pub struct SseTransport {
    client: reqwest::Client,
}

impl SseTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a preconfigured HTTP client (proxies, TLS roots, headers)
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl Transport for SseTransport {
    fn open(&self, url: &str) -> TransportHandle {
        let (signal_tx, signal_rx) = mpsc::unbounded_channel();
        let ready = Arc::new(AtomicReadyState::new(ReadyState::Connecting));
        let cancel = CancellationToken::new();

        let client = self.client.clone();
        let url = url.to_string();
        let task_ready = Arc::clone(&ready);
        let task_cancel = cancel.clone();

        tokio::spawn(async move {
            tokio::select! {
                _ = task_cancel.cancelled() => {
                    debug!("Event stream to {} closed", url);
                }
                _ = run_stream(&client, &url, &signal_tx, &task_ready) => {}
            }
        });

        TransportHandle::new(signal_rx, ready, cancel)
    }

    fn name(&self) -> &'static str {
        "sse"
    }
}

/// Drive one connection to completion, always finishing with an error signal
async fn run_stream(
    client: &reqwest::Client,
    url: &str,
    signals: &SignalSender,
    ready: &AtomicReadyState,
) {
    let result = stream_events(client, url, signals, ready).await;
    ready.set(ReadyState::Closed);

    let err = match result {
        Ok(()) => StreamError::ConnectionClosed("Stream ended".into()),
        Err(e) => e,
    };
    let _ = signals.send(TransportSignal::Error(err));
}

async fn stream_events(
    client: &reqwest::Client,
    url: &str,
    signals: &SignalSender,
    ready: &AtomicReadyState,
) -> Result<()> {
    let response = client
        .get(url)
        .header(ACCEPT, "text/event-stream")
        .header(CACHE_CONTROL, "no-cache")
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        return Err(StreamError::HttpStatus(status.as_u16()));
    }

    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();
    if !is_event_stream(content_type) {
        return Err(StreamError::UnexpectedContentType(content_type.to_string()));
    }

    if !ready.mark_open() {
        return Ok(());
    }
    signals
        .send(TransportSignal::Open)
        .map_err(|e| StreamError::ChannelSend(e.to_string()))?;

    let mut decoder = FrameDecoder::new();
    let mut body = response.bytes_stream();

    while let Some(chunk) = body.next().await {
        let chunk = chunk?;
        for frame in decoder.push(&chunk) {
            signals
                .send(TransportSignal::Message(frame.into()))
                .map_err(|e| StreamError::ChannelSend(e.to_string()))?;
        }
    }

    Ok(())
}

/// `text/event-stream`, parameters and case ignored
fn is_event_stream(content_type: &str) -> bool {
    content_type
        .split(';')
        .next()
        .map(|mime| mime.trim().eq_ignore_ascii_case("text/event-stream"))
        .unwrap_or(false)
}
