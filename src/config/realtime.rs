//! Real-time channel configuration
//!
//! Tunables for the WebSocket fan-out layer and the client-side
//! reconnection/log-buffer defaults.

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Real-time layer configuration
#[derive(Debug, Clone, Deserialize)]
pub struct RealtimeConfig {
    /// Outbound queue capacity per connected session
    #[serde(default = "default_session_capacity")]
    pub session_capacity: usize,

    /// Maximum entries retained by the client message log
    #[serde(default = "default_log_bound")]
    pub log_bound: usize,

    /// Base reconnect delay in milliseconds (scaled by attempt count)
    #[serde(default = "default_reconnect_delay_ms")]
    pub reconnect_delay_ms: u64,

    /// Maximum automatic reconnect attempts before giving up
    #[serde(default = "default_max_reconnect_attempts")]
    pub max_reconnect_attempts: u32,
}

impl RealtimeConfig {
    /// Get the base reconnect delay as a Duration
    pub fn reconnect_delay(&self) -> Duration {
        Duration::from_millis(self.reconnect_delay_ms)
    }

    /// Validate real-time configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.session_capacity == 0 {
            return Err(ValidationError::InvalidChannelCapacity);
        }
        if self.log_bound == 0 {
            return Err(ValidationError::InvalidLogBound);
        }
        if self.reconnect_delay_ms == 0 {
            return Err(ValidationError::InvalidReconnectDelay);
        }
        Ok(())
    }
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            session_capacity: default_session_capacity(),
            log_bound: default_log_bound(),
            reconnect_delay_ms: default_reconnect_delay_ms(),
            max_reconnect_attempts: default_max_reconnect_attempts(),
        }
    }
}

fn default_session_capacity() -> usize {
    128
}

fn default_log_bound() -> usize {
    100
}

fn default_reconnect_delay_ms() -> u64 {
    3000
}

fn default_max_reconnect_attempts() -> u32 {
    5
}
