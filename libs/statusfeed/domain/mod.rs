//! Domain types for the status feed
//!
//! Events, their decoded payloads, the bounded buffer holding them and the
//! stats derived from it. Nothing here performs I/O.

pub mod buffer;
pub mod event;
pub mod payloads;
pub mod stats;

pub use buffer::{EventBuffer, DEFAULT_BUFFER_CAPACITY};
pub use event::{EventKind, StreamEvent};
pub use payloads::{
    decode_connected, decode_status, ConnectedPayload, EventData, StatusPayload,
    DECODE_ERROR_MESSAGE,
};
pub use stats::{latest_status, FeedStats};
