//! Wire payloads
//!
//! `connected` carries a single JSON object. `status` is encoded twice: the
//! event data is a JSON object whose `data` field is itself a JSON string
//! holding the status object, so decoding takes two passes.

use serde::{Deserialize, Serialize};

/// Stored in place of a payload that could not be decoded
pub const DECODE_ERROR_MESSAGE: &str = "Failed to parse event data";

/// Operational status pushed by the server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusPayload {
    pub status: String,
    pub message: String,
    pub cpu: f64,
    pub memory: f64,
    pub timestamp: String,
}

/// Greeting sent once per stream, naming this client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectedPayload {
    pub client_id: String,
}

/// Decoded payload of a stream event
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum EventData {
    Connected(ConnectedPayload),
    Status(StatusPayload),
    /// Serialises as `{"error": "Failed to parse event data"}`
    DecodeError { error: String },
}

impl EventData {
    pub fn decode_error() -> Self {
        EventData::DecodeError {
            error: DECODE_ERROR_MESSAGE.to_string(),
        }
    }

    pub fn as_status(&self) -> Option<&StatusPayload> {
        match self {
            EventData::Status(status) => Some(status),
            _ => None,
        }
    }

    pub fn is_decode_error(&self) -> bool {
        matches!(self, EventData::DecodeError { .. })
    }
}

/// Outer layer of a `status` event
#[derive(Deserialize)]
struct StatusEnvelope {
    data: String,
}

/// Decode a `status` event body (two JSON passes)
pub fn decode_status(raw: &str) -> serde_json::Result<StatusPayload> {
    let envelope: StatusEnvelope = serde_json::from_str(raw)?;
    serde_json::from_str(&envelope.data)
}

/// Decode a `connected` event body
pub fn decode_connected(raw: &str) -> serde_json::Result<ConnectedPayload> {
    serde_json::from_str(raw)
}
