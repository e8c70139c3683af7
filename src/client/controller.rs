//! Client session controller: connection state machine and envelope
//! dispatch.
//!
//! The controller is deliberately free of sockets and timers. The
//! runtime feeds it lifecycle events and inbound envelopes; it answers
//! with reconnect decisions and routes payloads to the sinks. That
//! split keeps the retry ceiling and dispatch rules testable without a
//! server.

use std::sync::Arc;
use std::time::Duration;

use crate::domain::{Envelope, EventKind};

use super::log_buffer::{LogLevel, MessageLog};
use super::sinks::{StatusIndicator, UpdateSink};

/// Connection lifecycle states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// Never connected
    Idle,
    /// Dial in progress
    Connecting,
    /// Live socket
    Open,
    /// Waiting out a reconnect delay
    Retrying,
    /// Retry ceiling reached; terminal
    GaveUp,
}

/// Reconnect tuning: base delay scaled linearly by the attempt count.
#[derive(Debug, Clone, Copy)]
pub struct ReconnectPolicy {
    pub base_delay: Duration,
    pub max_attempts: u32,
}

impl ReconnectPolicy {
    pub fn new(base_delay: Duration, max_attempts: u32) -> Self {
        Self {
            base_delay,
            max_attempts,
        }
    }

    /// Delay before the given attempt (1-based): `base * attempt`.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(attempt.max(1))
    }
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            base_delay: Duration::from_millis(3000),
            max_attempts: 5,
        }
    }
}

/// What the runtime should do after a disconnect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconnectDecision {
    /// Schedule another dial after `delay`.
    Retry { attempt: u32, delay: Duration },
    /// Stop; the session is terminally down.
    GiveUp,
}

/// Drives the connection lifecycle and dispatches inbound envelopes.
pub struct SessionController {
    state: ConnectionState,
    reconnect_attempts: u32,
    policy: ReconnectPolicy,
    log: MessageLog,
    sink: Arc<dyn UpdateSink>,
    indicator: Arc<dyn StatusIndicator>,
}

impl SessionController {
    pub fn new(
        policy: ReconnectPolicy,
        log_bound: usize,
        sink: Arc<dyn UpdateSink>,
        indicator: Arc<dyn StatusIndicator>,
    ) -> Self {
        Self {
            state: ConnectionState::Idle,
            reconnect_attempts: 0,
            policy,
            log: MessageLog::new(log_bound),
            sink,
            indicator,
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn is_connected(&self) -> bool {
        self.state == ConnectionState::Open
    }

    pub fn reconnect_attempts(&self) -> u32 {
        self.reconnect_attempts
    }

    /// The message log, for rendering and the pause/clear/export
    /// operations.
    pub fn log(&self) -> &MessageLog {
        &self.log
    }

    pub fn log_mut(&mut self) -> &mut MessageLog {
        &mut self.log
    }

    /// A dial started.
    pub fn on_connecting(&mut self) {
        if self.state != ConnectionState::GaveUp {
            self.state = ConnectionState::Connecting;
        }
    }

    /// The socket opened. Resets the attempt counter so the full retry
    /// budget is available for the next outage.
    pub fn on_open(&mut self) {
        self.state = ConnectionState::Open;
        self.reconnect_attempts = 0;
        self.log
            .append(LogLevel::Success, "connection", "Connected to server");
        self.indicator.connection_changed(true);
    }

    /// The socket closed or errored. Returns what to do next.
    pub fn on_disconnect(&mut self) -> ReconnectDecision {
        if self.state == ConnectionState::GaveUp {
            return ReconnectDecision::GiveUp;
        }

        if self.state == ConnectionState::Open {
            self.log
                .append(LogLevel::Warning, "connection", "Connection lost");
        }
        self.indicator.connection_changed(false);

        self.reconnect_attempts += 1;
        if self.reconnect_attempts > self.policy.max_attempts {
            self.state = ConnectionState::GaveUp;
            self.log.append(
                LogLevel::Error,
                "connection",
                "Max reconnection attempts reached",
            );
            return ReconnectDecision::GiveUp;
        }

        self.state = ConnectionState::Retrying;
        let attempt = self.reconnect_attempts;
        self.log.append(
            LogLevel::Warning,
            "connection",
            format!("Reconnecting (attempt {attempt}/{})", self.policy.max_attempts),
        );
        ReconnectDecision::Retry {
            attempt,
            delay: self.policy.delay_for(attempt),
        }
    }

    /// Gate for outbound sends. Logs a warning when blocked so the
    /// caller only has to surface the boolean.
    pub fn allow_send(&mut self) -> bool {
        if self.is_connected() {
            true
        } else {
            self.log.append(
                LogLevel::Warning,
                "send",
                "Cannot send message: not connected",
            );
            false
        }
    }

    /// Route one inbound envelope. Unknown kinds produce exactly one
    /// generic log entry and nothing else.
    pub fn handle_envelope(&mut self, envelope: &Envelope) {
        match &envelope.kind {
            EventKind::Connection => {
                let message = envelope.message.as_deref().unwrap_or("Connected");
                self.log.append(LogLevel::Info, "connection", message);
            }
            EventKind::CctvDetection => {
                if let Some(data) = &envelope.data {
                    self.sink.on_cctv_detection(data);
                }
                self.log
                    .append(LogLevel::Info, "cctv", "CCTV detection received");
            }
            EventKind::AnalysisComplete => {
                if let Some(data) = &envelope.data {
                    self.sink.on_analysis_complete(data);
                }
                self.log
                    .append(LogLevel::Info, "analysis", "Analysis batch received");
            }
            EventKind::StatusUpdate => {
                if let Some(data) = &envelope.data {
                    self.sink.on_status_update(data);
                }
                self.log
                    .append(LogLevel::Info, "status", "Status update received");
            }
            EventKind::Echo => {
                let rendered = envelope
                    .data
                    .as_ref()
                    .map(|d| d.to_string())
                    .unwrap_or_default();
                self.log
                    .append(LogLevel::Info, "echo", format!("Echo: {rendered}"));
            }
            EventKind::Error => {
                let message = envelope.message.as_deref().unwrap_or("Server error");
                self.log.append(LogLevel::Error, "server", message);
            }
            EventKind::SubscriptionConfirmed | EventKind::UnsubscriptionConfirmed => {
                let message = envelope.message.as_deref().unwrap_or("Subscription changed");
                self.log.append(LogLevel::Info, "subscription", message);
            }
            EventKind::Pong => {
                // Liveness only; nothing to surface
            }
            other => {
                self.log.append(
                    LogLevel::Info,
                    "unknown",
                    format!("Unknown message type: {other}"),
                );
            }
        }
    }
}
