//! Collaborator traits the session controller dispatches into.
//!
//! A dashboard frontend implements these to receive feed updates; tests
//! implement them with recording stubs.

use serde_json::Value;

/// Receives feed payloads routed by envelope kind.
///
/// Default implementations ignore everything, so a consumer only
/// overrides the feeds it renders.
pub trait UpdateSink: Send + Sync {
    /// A CCTV detection arrived.
    fn on_cctv_detection(&self, _data: &Value) {}

    /// A batch analysis finished.
    fn on_analysis_complete(&self, _data: &Value) {}

    /// Fresh dashboard counters arrived.
    fn on_status_update(&self, _data: &Value) {}
}

/// Receives connection up/down transitions.
pub trait StatusIndicator: Send + Sync {
    fn connection_changed(&self, connected: bool);
}

/// Indicator that ignores transitions, for headless consumers.
#[derive(Debug, Default)]
pub struct NullIndicator;

impl StatusIndicator for NullIndicator {
    fn connection_changed(&self, _connected: bool) {}
}

/// Sink that ignores every feed, for headless consumers.
#[derive(Debug, Default)]
pub struct NullSink;

impl UpdateSink for NullSink {}
