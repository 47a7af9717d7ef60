//! Common test utilities for HyperStream integration tests
//!
//! Provides a minimal HTTP server that speaks just enough of the
//! event-stream and disconnect endpoints for the transports under test.

#![allow(dead_code)]

use parking_lot::Mutex;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Notify;

/// Macro for verbose test output (controlled by TEST_VERBOSE env var)
#[macro_export]
macro_rules! verbose_println {
    ($($arg:tt)*) => {
        if std::env::var("TEST_VERBOSE").is_ok() {
            println!($($arg)*);
        }
    };
}

/// What the mock server answers
#[derive(Debug, Clone)]
pub struct MockBehavior {
    /// Status for `GET /sse`
    pub stream_status: u16,
    /// Body chunks written (and flushed) one by one
    pub chunks: Vec<String>,
    /// Keep the stream open after the last chunk
    pub hold_open: bool,
    /// Content-Type of a successful stream response
    pub content_type: String,
    /// Status for `POST /disconnect/{id}`
    pub disconnect_status: u16,
    /// Accept `POST /disconnect/{id}` but never answer
    pub disconnect_hangs: bool,
}

impl Default for MockBehavior {
    fn default() -> Self {
        Self {
            stream_status: 200,
            chunks: Vec::new(),
            hold_open: false,
            content_type: "text/event-stream".to_string(),
            disconnect_status: 200,
            disconnect_hangs: false,
        }
    }
}

/// A simple mock event-stream server for testing
pub struct MockSseServer {
    pub addr: SocketAddr,
    shutdown: Arc<Notify>,
    requests: Arc<Mutex<Vec<String>>>,
}

impl MockSseServer {
    /// Create and start a new mock server
    pub async fn start(behavior: MockBehavior) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let shutdown = Arc::new(Notify::new());
        let requests = Arc::new(Mutex::new(Vec::new()));

        let shutdown_clone = Arc::clone(&shutdown);
        let requests_clone = Arc::clone(&requests);
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    result = listener.accept() => {
                        match result {
                            Ok((stream, _)) => {
                                let behavior = behavior.clone();
                                let shutdown = Arc::clone(&shutdown_clone);
                                let requests = Arc::clone(&requests_clone);
                                tokio::spawn(async move {
                                    Self::handle_connection(stream, behavior, shutdown, requests).await;
                                });
                            }
                            Err(e) => {
                                eprintln!("Accept error: {}", e);
                                break;
                            }
                        }
                    }
                    _ = shutdown_clone.notified() => {
                        break;
                    }
                }
            }
        });

        Self {
            addr,
            shutdown,
            requests,
        }
    }

    async fn handle_connection(
        mut stream: TcpStream,
        behavior: MockBehavior,
        shutdown: Arc<Notify>,
        requests: Arc<Mutex<Vec<String>>>,
    ) {
        let mut head = Vec::new();
        let mut buf = [0u8; 1024];
        while !head.windows(4).any(|w| w == b"\r\n\r\n") {
            match stream.read(&mut buf).await {
                Ok(0) | Err(_) => return,
                Ok(n) => head.extend_from_slice(&buf[..n]),
            }
        }

        let head = String::from_utf8_lossy(&head).to_string();
        let request_line = head.lines().next().unwrap_or_default().to_string();
        requests.lock().push(request_line.clone());

        let mut parts = request_line.split_whitespace();
        let method = parts.next().unwrap_or_default();
        let path = parts.next().unwrap_or_default();

        if method == "POST" && path.starts_with("/disconnect/") {
            if behavior.disconnect_hangs {
                shutdown.notified().await;
                return;
            }
            let client_id = path.trim_start_matches("/disconnect/");
            let body = format!(r#"{{"status":"disconnected","clientId":"{}"}}"#, client_id);
            let response = format!(
                "HTTP/1.1 {} X\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                behavior.disconnect_status,
                body.len(),
                body
            );
            let _ = stream.write_all(response.as_bytes()).await;
            return;
        }

        if behavior.stream_status != 200 {
            let response = format!(
                "HTTP/1.1 {} X\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
                behavior.stream_status
            );
            let _ = stream.write_all(response.as_bytes()).await;
            return;
        }

        let headers = format!(
            "HTTP/1.1 200 OK\r\nContent-Type: {}\r\nCache-Control: no-cache\r\nConnection: close\r\n\r\n",
            behavior.content_type
        );
        if stream.write_all(headers.as_bytes()).await.is_err() {
            return;
        }

        for chunk in &behavior.chunks {
            if stream.write_all(chunk.as_bytes()).await.is_err() {
                return;
            }
            let _ = stream.flush().await;
            tokio::time::sleep(Duration::from_millis(10)).await;
        }

        if behavior.hold_open {
            shutdown.notified().await;
        }
    }

    /// Event-stream URL for this server
    pub fn sse_url(&self) -> String {
        format!("http://{}/sse", self.addr)
    }

    /// Base URL for the disconnect endpoint
    pub fn api_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Request lines received so far
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().clone()
    }

    /// Shutdown the server
    pub fn shutdown(&self) {
        self.shutdown.notify_waiters();
    }
}

impl Drop for MockSseServer {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// A URL nothing is listening on
pub async fn unreachable_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}/sse", addr)
}

/// Event-stream encoding of one event
pub fn sse_event(id: Option<&str>, event: &str, data: &str) -> String {
    let mut out = String::new();
    if let Some(id) = id {
        out.push_str(&format!("id: {}\n", id));
    }
    out.push_str(&format!("event: {}\ndata: {}\n\n", event, data));
    out
}
