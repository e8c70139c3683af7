//! WebSocket adapter: the real-time fan-out layer.
//!
//! The connection registry tracks live sessions and their channel
//! subscriptions; the handler owns the socket lifecycle and classifies
//! inbound frames. Envelopes are the shared wire type (`crate::domain`).

mod handler;
mod registry;

pub use handler::{classify_frame, ws_handler, InboundFrame, WebSocketState};
pub use registry::{ConnectionRegistry, SessionId};
