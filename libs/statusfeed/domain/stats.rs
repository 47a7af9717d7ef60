use super::buffer::EventBuffer;
use super::event::EventKind;
use super::payloads::EventData;
use serde::Serialize;
use std::fmt;

/// Summary of the buffered events, computed on demand
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedStats {
    pub total_events: usize,
    pub status_events: usize,
    pub connection_events: usize,
    pub is_connected: bool,
    pub client_id: Option<String>,
    pub latest_status: Option<EventData>,
}

impl FeedStats {
    pub fn compute(buffer: &EventBuffer, is_connected: bool, client_id: Option<&str>) -> Self {
        Self {
            total_events: buffer.len(),
            status_events: buffer.count_of(EventKind::Status),
            connection_events: buffer.count_of(EventKind::Connected),
            is_connected,
            client_id: client_id.map(str::to_string),
            latest_status: latest_status(buffer).cloned(),
        }
    }
}

/// Payload of the most recent `status` event, decode error included
pub fn latest_status(buffer: &EventBuffer) -> Option<&EventData> {
    buffer.latest_of(EventKind::Status).and_then(|e| e.data())
}

impl fmt::Display for FeedStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "events={} status={} connection={} connected={} client={}",
            self.total_events,
            self.status_events,
            self.connection_events,
            self.is_connected,
            self.client_id.as_deref().unwrap_or("-"),
        )?;
        match self.latest_status.as_ref().and_then(EventData::as_status) {
            Some(status) => write!(
                f,
                " latest={} (cpu {:.1}%, mem {:.1})",
                status.status, status.cpu, status.memory
            ),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::event::StreamEvent;
    use chrono::Utc;
    use hyperstream::RawMessage;

    fn status(name: &str) -> StreamEvent {
        let inner = format!(
            r#"{{"status":"{}","message":"m","cpu":1.5,"memory":2,"timestamp":"t"}}"#,
            name
        );
        let outer = serde_json::json!({ "data": inner }).to_string();
        StreamEvent::from_raw(RawMessage::named("status", &outer), Utc::now())
    }

    #[test]
    fn test_empty_buffer() {
        let stats = FeedStats::compute(&EventBuffer::new(), false, None);
        assert_eq!(stats.total_events, 0);
        assert!(stats.latest_status.is_none());
        assert!(stats.client_id.is_none());
    }

    #[test]
    fn test_counts_and_latest() {
        let mut buffer = EventBuffer::new();
        buffer.push(status("a"));
        buffer.push(StreamEvent::from_raw(
            RawMessage::named("connected", r#"{"clientId":"x"}"#),
            Utc::now(),
        ));
        buffer.push(status("b"));
        buffer.push(StreamEvent::from_raw(RawMessage::new(None, "noise", None), Utc::now()));

        let stats = FeedStats::compute(&buffer, true, Some("x"));
        assert_eq!(stats.total_events, 4);
        assert_eq!(stats.status_events, 2);
        assert_eq!(stats.connection_events, 1);
        assert_eq!(
            stats.latest_status.as_ref().and_then(EventData::as_status).map(|s| s.status.as_str()),
            Some("b")
        );
        assert!(stats.to_string().contains("latest=b"));
    }

    #[test]
    fn test_latest_status_may_be_decode_error() {
        let mut buffer = EventBuffer::new();
        buffer.push(status("a"));
        buffer.push(StreamEvent::from_raw(RawMessage::named("status", "not json"), Utc::now()));

        assert!(latest_status(&buffer).unwrap().is_decode_error());
    }
}
