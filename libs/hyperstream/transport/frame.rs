//! Event-stream framing
//!
//! Incremental decoder for the `text/event-stream` format. Bytes are fed in
//! arbitrary chunks; complete events come out in order.
//!
//! ```text
//! id: 42
//! event: status
//! data: {"data":"..."}
//!
//! ```

use crate::traits::RawMessage;
use tracing::warn;

/// Longest line kept; longer lines are discarded up to the next line break
pub const MAX_LINE_BYTES: usize = 1024 * 1024;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// One dispatched event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SseFrame {
    /// `event:` field; `None` for unnamed events
    pub event: Option<String>,
    /// `data:` lines joined with `\n`
    pub data: String,
    /// Last event id seen on the stream
    pub id: Option<String>,
}

impl From<SseFrame> for RawMessage {
    fn from(frame: SseFrame) -> Self {
        RawMessage {
            event: frame.event,
            data: frame.data,
            id: frame.id,
        }
    }
}

/// Incremental event-stream decoder
#[derive(Debug)]
pub struct FrameDecoder {
    /// Bytes of the line being assembled
    line: Vec<u8>,
    max_line: usize,
    /// Current line went past `max_line` and is being skipped
    overflowed: bool,
    /// Previous chunk ended in `\r`; swallow a leading `\n`
    skip_lf: bool,
    /// Set once the first line ended; a BOM is only stripped before that
    past_first_line: bool,
    event: Option<String>,
    data: String,
    has_data: bool,
    last_event_id: Option<String>,
}

impl FrameDecoder {
    pub fn new() -> Self {
        Self {
            line: Vec::new(),
            max_line: MAX_LINE_BYTES,
            overflowed: false,
            skip_lf: false,
            past_first_line: false,
            event: None,
            data: String::new(),
            has_data: false,
            last_event_id: None,
        }
    }

    /// Feed a chunk of the response body, returning the events it completes
    pub fn push(&mut self, chunk: &[u8]) -> Vec<SseFrame> {
        let mut frames = Vec::new();

        for &byte in chunk {
            if self.skip_lf {
                self.skip_lf = false;
                if byte == b'\n' {
                    continue;
                }
            }

            match byte {
                b'\n' => self.end_line(&mut frames),
                b'\r' => {
                    self.end_line(&mut frames);
                    self.skip_lf = true;
                }
                _ if self.overflowed => {}
                _ => {
                    self.line.push(byte);
                    // Leave room for a BOM ahead of the first line
                    let limit = if self.past_first_line {
                        self.max_line
                    } else {
                        self.max_line + UTF8_BOM.len()
                    };
                    if self.line.len() > limit {
                        warn!("Event-stream line exceeds {} bytes, discarding", self.max_line);
                        self.line = Vec::new();
                        self.overflowed = true;
                    }
                }
            }
        }

        frames
    }

    fn end_line(&mut self, frames: &mut Vec<SseFrame>) {
        let mut raw = std::mem::take(&mut self.line);
        if !std::mem::replace(&mut self.past_first_line, true) && raw.starts_with(UTF8_BOM) {
            raw.drain(..UTF8_BOM.len());
        }
        if std::mem::take(&mut self.overflowed) {
            return;
        }
        let line = String::from_utf8_lossy(&raw);

        if line.is_empty() {
            if let Some(frame) = self.dispatch() {
                frames.push(frame);
            }
            return;
        }

        // comment
        if line.starts_with(':') {
            return;
        }

        let (field, value) = match line.find(':') {
            Some(idx) => {
                let value = &line[idx + 1..];
                (&line[..idx], value.strip_prefix(' ').unwrap_or(value))
            }
            None => (&line[..], ""),
        };

        match field {
            "event" => self.event = Some(value.to_string()),
            "data" => {
                self.data.push_str(value);
                self.data.push('\n');
                self.has_data = true;
            }
            "id" if !value.contains('\0') => {
                self.last_event_id = (!value.is_empty()).then(|| value.to_string());
            }
            _ => {}
        }
    }

    fn dispatch(&mut self) -> Option<SseFrame> {
        let event = self.event.take();
        if !self.has_data {
            return None;
        }
        self.has_data = false;

        let mut data = std::mem::take(&mut self.data);
        if data.ends_with('\n') {
            data.pop();
        }

        Some(SseFrame {
            event: event.filter(|name| !name.is_empty()),
            data,
            id: self.last_event_id.clone(),
        })
    }
}

impl Default for FrameDecoder {
    fn default() -> Self {
        Self::new()
    }
}
