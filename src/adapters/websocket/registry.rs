//! Connection registry for WebSocket fan-out.
//!
//! The registry owns one entry per live session: the outbound queue the
//! socket task drains, plus the set of channels the session subscribed to.
//! Subscriptions live here rather than on the socket so broadcast routing
//! never needs to reach into connection state.
//!
//! # Thread Safety
//!
//! Uses `RwLock` for the session table since broadcasts (reads) vastly
//! outnumber registrations (writes). Delivery uses `try_send`, so a
//! session with a full or closed queue is skipped without affecting the
//! remaining sessions.

use std::collections::{HashMap, HashSet};

use tokio::sync::{mpsc, RwLock};
use uuid::Uuid;

use crate::domain::Envelope;

/// Unique identifier for a WebSocket session.
///
/// Generated server-side when a client connects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(Uuid);

impl SessionId {
    /// Create a new random session ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

struct SessionEntry {
    sender: mpsc::Sender<Envelope>,
    subscriptions: HashSet<String>,
}

/// Tracks live sessions and routes envelopes to them.
pub struct ConnectionRegistry {
    sessions: RwLock<HashMap<SessionId, SessionEntry>>,

    /// Outbound queue capacity per session.
    session_capacity: usize,
}

impl ConnectionRegistry {
    /// Create a new registry with the given per-session queue capacity.
    pub fn new(session_capacity: usize) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            session_capacity,
        }
    }

    /// Create with default capacity (128 envelopes per session).
    pub fn with_default_capacity() -> Self {
        Self::new(128)
    }

    /// Register a new session.
    ///
    /// Returns the assigned session ID and the receiving end of the
    /// session's outbound queue. The caller drains the receiver into the
    /// socket; dropping it marks the session dead for delivery purposes.
    pub async fn register(&self) -> (SessionId, mpsc::Receiver<Envelope>) {
        let session_id = SessionId::new();
        let (tx, rx) = mpsc::channel(self.session_capacity);

        self.sessions.write().await.insert(
            session_id,
            SessionEntry {
                sender: tx,
                subscriptions: HashSet::new(),
            },
        );

        (session_id, rx)
    }

    /// Remove a session. Unknown IDs are ignored, so repeated
    /// unregistration of the same session is harmless.
    pub async fn unregister(&self, session_id: SessionId) {
        self.sessions.write().await.remove(&session_id);
    }

    /// Add a channel to a session's subscription set.
    ///
    /// Channel names are not validated against any catalog; subscribing
    /// to a channel nothing broadcasts on simply never delivers.
    /// Returns `false` when the session is not registered.
    pub async fn subscribe(&self, session_id: SessionId, channel: &str) -> bool {
        let mut sessions = self.sessions.write().await;
        match sessions.get_mut(&session_id) {
            Some(entry) => {
                entry.subscriptions.insert(channel.to_string());
                true
            }
            None => false,
        }
    }

    /// Remove a channel from a session's subscription set.
    ///
    /// Removing a channel that was never subscribed is a no-op.
    pub async fn unsubscribe(&self, session_id: SessionId, channel: &str) -> bool {
        let mut sessions = self.sessions.write().await;
        match sessions.get_mut(&session_id) {
            Some(entry) => {
                entry.subscriptions.remove(channel);
                true
            }
            None => false,
        }
    }

    /// Current subscription set of a session, for status and tests.
    pub async fn subscriptions(&self, session_id: SessionId) -> Option<HashSet<String>> {
        self.sessions
            .read()
            .await
            .get(&session_id)
            .map(|entry| entry.subscriptions.clone())
    }

    /// Deliver an envelope to one session.
    ///
    /// Returns `false` when the session is unknown or its queue is
    /// closed or full.
    pub async fn send_to(&self, session_id: SessionId, envelope: Envelope) -> bool {
        let sessions = self.sessions.read().await;
        match sessions.get(&session_id) {
            Some(entry) => entry.sender.try_send(envelope).is_ok(),
            None => false,
        }
    }

    /// Deliver an envelope to every session.
    ///
    /// Sessions whose queue is closed or full are skipped; the rest
    /// still receive the envelope. Returns the number of deliveries.
    pub async fn broadcast_all(&self, envelope: Envelope) -> usize {
        let sessions = self.sessions.read().await;
        let mut delivered = 0;

        for (session_id, entry) in sessions.iter() {
            if entry.sender.try_send(envelope.clone()).is_ok() {
                delivered += 1;
            } else {
                tracing::debug!(session_id = %session_id, "Skipping undeliverable session");
            }
        }

        delivered
    }

    /// Deliver an envelope to every session subscribed to `channel`.
    ///
    /// The envelope's `channel` field is stamped before delivery so
    /// receivers can tell which subscription routed it.
    pub async fn broadcast_to_channel(&self, channel: &str, envelope: Envelope) -> usize {
        let envelope = envelope.with_channel(channel);
        let sessions = self.sessions.read().await;
        let mut delivered = 0;

        for (session_id, entry) in sessions.iter() {
            if !entry.subscriptions.contains(channel) {
                continue;
            }
            if entry.sender.try_send(envelope.clone()).is_ok() {
                delivered += 1;
            } else {
                tracing::debug!(session_id = %session_id, channel, "Skipping undeliverable session");
            }
        }

        delivered
    }

    /// Number of registered sessions.
    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }
}

impl Default for ConnectionRegistry {
    fn default() -> Self {
        Self::with_default_capacity()
    }
}
