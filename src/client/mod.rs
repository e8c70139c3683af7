//! Consumer-side session client.
//!
//! Everything a dashboard frontend needs to follow the feed: a bounded
//! message log, a reconnecting session controller, collaborator traits
//! for rendering, and the tokio-tungstenite runtime that ties them to a
//! live socket.

mod controller;
mod log_buffer;
mod runtime;
mod sinks;

pub use controller::{ConnectionState, ReconnectDecision, ReconnectPolicy, SessionController};
pub use log_buffer::{LogEntry, LogLevel, MessageLog};
pub use runtime::{ClientError, DashboardClient};
pub use sinks::{NullIndicator, NullSink, StatusIndicator, UpdateSink};
