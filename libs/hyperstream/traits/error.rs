use thiserror::Error;

/// Main error type for hyperstream
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StreamError {
    /// Transport level failure (connect, read, TLS)
    #[error("Transport error: {0}")]
    Transport(String),

    /// Stream ended or was closed by the peer
    #[error("Connection closed: {0}")]
    ConnectionClosed(String),

    /// Non-success HTTP status
    #[error("HTTP error! status: {0}")]
    HttpStatus(u16),

    /// Success status but the body is not an event stream
    #[error("Unexpected content type: {0:?}")]
    UnexpectedContentType(String),

    /// Disconnect notification failed
    #[error("Disconnect notification failed: {0}")]
    Notification(String),

    /// Channel send error
    #[error("Channel send error: {0}")]
    ChannelSend(String),
}

impl StreamError {
    /// True for errors that drive the reconnection state machine
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            StreamError::Transport(_)
                | StreamError::ConnectionClosed(_)
                | StreamError::HttpStatus(_)
                | StreamError::UnexpectedContentType(_)
        )
    }
}

impl From<reqwest::Error> for StreamError {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => StreamError::HttpStatus(status.as_u16()),
            None => StreamError::Transport(err.to_string()),
        }
    }
}

/// Result type for hyperstream operations
pub type Result<T> = std::result::Result<T, StreamError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_classification() {
        assert!(StreamError::Transport("refused".into()).is_transport());
        assert!(StreamError::ConnectionClosed("eof".into()).is_transport());
        assert!(StreamError::HttpStatus(503).is_transport());
        assert!(StreamError::UnexpectedContentType("text/html".into()).is_transport());
        assert!(!StreamError::Notification("down".into()).is_transport());
        assert!(!StreamError::ChannelSend("closed".into()).is_transport());
    }

    #[test]
    fn test_http_status_message() {
        assert_eq!(
            StreamError::HttpStatus(404).to_string(),
            "HTTP error! status: 404"
        );
    }
}
