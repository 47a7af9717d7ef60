use super::payloads::{decode_connected, decode_status, EventData};
use chrono::{DateTime, SecondsFormat, Utc};
use hyperstream::RawMessage;
use serde::{Serialize, Serializer};
use tracing::warn;

/// Kind of a stream event, derived from its event name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Connected,
    Status,
    /// Any other (or no) event name; payload is kept undecoded
    Raw,
}

impl EventKind {
    pub fn from_name(name: Option<&str>) -> Self {
        match name {
            Some("connected") => EventKind::Connected,
            Some("status") => EventKind::Status,
            _ => EventKind::Raw,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Connected => "connected",
            EventKind::Status => "status",
            EventKind::Raw => "raw",
        }
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One received event, decoded as far as its kind allows
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamEvent {
    id: String,
    #[serde(rename = "type")]
    kind: EventKind,
    #[serde(serialize_with = "serialize_millis")]
    timestamp: DateTime<Utc>,
    data: Option<EventData>,
    raw_data: String,
}

/// ISO-8601 in UTC with millisecond precision
fn serialize_millis<S: Serializer>(ts: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&ts.to_rfc3339_opts(SecondsFormat::Millis, true))
}

impl StreamEvent {
    /// Build an event from a raw message received at `received_at`
    ///
    /// Decoding never fails: a payload that does not decode is replaced by
    /// [`EventData::decode_error`].
    pub fn from_raw(raw: RawMessage, received_at: DateTime<Utc>) -> Self {
        let kind = EventKind::from_name(raw.event.as_deref());

        let data = match kind {
            EventKind::Connected => Some(
                decode_connected(&raw.data)
                    .map(EventData::Connected)
                    .unwrap_or_else(|e| {
                        warn!(error = %e, "Error parsing connected event data");
                        EventData::decode_error()
                    }),
            ),
            EventKind::Status => Some(decode_status(&raw.data).map(EventData::Status).unwrap_or_else(
                |e| {
                    warn!(error = %e, "Error parsing status event data");
                    EventData::decode_error()
                },
            )),
            EventKind::Raw => None,
        };

        let id = raw
            .id
            .filter(|id| !id.is_empty())
            .unwrap_or_else(|| received_at.timestamp_millis().to_string());

        Self {
            id,
            kind,
            timestamp: received_at,
            data,
            raw_data: raw.data,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn kind(&self) -> EventKind {
        self.kind
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn data(&self) -> Option<&EventData> {
        self.data.as_ref()
    }

    pub fn raw_data(&self) -> &str {
        &self.raw_data
    }

    /// Client id announced by a decoded `connected` event
    pub fn client_id(&self) -> Option<&str> {
        match &self.data {
            Some(EventData::Connected(payload)) => Some(&payload.client_id),
            _ => None,
        }
    }
}
