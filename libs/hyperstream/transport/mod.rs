//! Transport implementations
//!
//! - **sse**: HTTP `text/event-stream` transport built on reqwest
//! - **frame**: incremental event-stream framing decoder
//! - **scripted**: deterministic test double driven by the caller
//! - **notifier**: HTTP disconnect notifier

pub mod frame;
pub mod notifier;
pub mod scripted;
pub mod sse;

pub use frame::{FrameDecoder, SseFrame};
pub use notifier::HttpDisconnectNotifier;
pub use scripted::{ScriptedConnection, ScriptedTransport};
pub use sse::SseTransport;
