//! Domain layer: the event envelope and the value objects it carries.

pub mod envelope;
pub mod status;
pub mod timestamp;

pub use envelope::{Envelope, EventKind};
pub use status::{DashboardCounters, SystemStatus};
pub use timestamp::Timestamp;
