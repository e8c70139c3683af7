//! WebSocket upgrade handler for real-time dashboard connections.
//!
//! Handles the HTTP → WebSocket upgrade and manages the connection lifecycle:
//! 1. Upgrade to WebSocket
//! 2. Register the session with the connection registry
//! 3. Send the welcome envelope
//! 4. Pump outbound envelopes / classify inbound frames until disconnect
//! 5. Unregister the session

use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use futures::{SinkExt, StreamExt};
use serde_json::Value;

use crate::domain::{Envelope, EventKind, SystemStatus};
use crate::ports::DashboardStore;

use super::registry::{ConnectionRegistry, SessionId};

/// State required for WebSocket handling.
///
/// Extracted from the application state.
#[derive(Clone)]
pub struct WebSocketState {
    /// Session registry for fan-out routing.
    pub registry: Arc<ConnectionRegistry>,
    /// Store backing `request_status` counters.
    pub store: Arc<dyn DashboardStore>,
}

impl WebSocketState {
    /// Create a new WebSocket state.
    pub fn new(registry: Arc<ConnectionRegistry>, store: Arc<dyn DashboardStore>) -> Self {
        Self { registry, store }
    }
}

/// Classification of one inbound text frame.
///
/// Classification is pure so routing decisions can be tested without a
/// socket. Anything that parses but matches no known client tag falls
/// through to `Echo`, preserving the original payload.
#[derive(Debug, Clone, PartialEq)]
pub enum InboundFrame {
    /// Not JSON, not an object, or missing a string `type`
    Malformed,
    /// Liveness probe
    Ping,
    /// Channel subscription request
    Subscribe(String),
    /// Channel unsubscription request
    Unsubscribe(String),
    /// Client wants a status_update
    RequestStatus,
    /// Everything else, reflected to all sessions
    Echo(Value),
}

/// Classify a raw text frame into a routing decision.
pub fn classify_frame(text: &str) -> InboundFrame {
    let value: Value = match serde_json::from_str(text) {
        Ok(value) => value,
        Err(_) => return InboundFrame::Malformed,
    };

    let Some(tag) = value.get("type").and_then(Value::as_str) else {
        return InboundFrame::Malformed;
    };

    match EventKind::from(tag) {
        EventKind::Ping => InboundFrame::Ping,
        EventKind::Subscribe => match channel_of(&value) {
            Some(channel) => InboundFrame::Subscribe(channel),
            None => InboundFrame::Malformed,
        },
        EventKind::Unsubscribe => match channel_of(&value) {
            Some(channel) => InboundFrame::Unsubscribe(channel),
            None => InboundFrame::Malformed,
        },
        EventKind::RequestStatus => InboundFrame::RequestStatus,
        _ => InboundFrame::Echo(value),
    }
}

fn channel_of(value: &Value) -> Option<String> {
    value
        .get("channel")
        .and_then(Value::as_str)
        .map(str::to_string)
}

/// Handle WebSocket upgrade requests.
///
/// Route: `GET /ws`
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<WebSocketState>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Handle an established WebSocket connection.
///
/// This function runs for the lifetime of the connection, handling:
/// - Registering the session
/// - Forwarding queued envelopes to the client
/// - Classifying and acting on client frames
/// - Cleanup on disconnect
async fn handle_socket(socket: WebSocket, state: WebSocketState) {
    let (mut sender, mut receiver) = socket.split();

    let (session_id, mut queue_rx) = state.registry.register().await;
    tracing::debug!(session_id = %session_id, "WebSocket session registered");

    // Welcome envelope goes out before anything else
    if let Err(e) = send_envelope(&mut sender, &Envelope::connection()).await {
        tracing::debug!(session_id = %session_id, "Failed to send welcome envelope: {}", e);
        state.registry.unregister(session_id).await;
        return;
    }

    // Drain the session's outbound queue into the socket
    let mut send_task = tokio::spawn(async move {
        while let Some(envelope) = queue_rx.recv().await {
            if let Err(e) = send_envelope(&mut sender, &envelope).await {
                tracing::debug!(
                    session_id = %session_id,
                    "Send error, closing connection: {}",
                    e
                );
                break;
            }
        }
    });

    // Classify inbound frames and act on them
    let recv_state = state.clone();
    let mut recv_task = tokio::spawn(async move {
        while let Some(result) = receiver.next().await {
            match result {
                Ok(Message::Text(text)) => {
                    handle_frame(&recv_state, session_id, &text).await;
                }
                Ok(Message::Binary(_)) => {
                    tracing::warn!(
                        session_id = %session_id,
                        "Received unsupported binary message"
                    );
                }
                Ok(Message::Ping(_)) | Ok(Message::Pong(_)) => {
                    // WebSocket protocol frames - handled automatically by axum
                }
                Ok(Message::Close(_)) => {
                    tracing::debug!(session_id = %session_id, "Client sent close frame");
                    break;
                }
                Err(e) => {
                    tracing::debug!(session_id = %session_id, "Receive error: {}", e);
                    break;
                }
            }
        }
    });

    // Wait for either task to finish, then tear down the other
    tokio::select! {
        _ = &mut send_task => {
            recv_task.abort();
        }
        _ = &mut recv_task => {
            send_task.abort();
        }
    }

    state.registry.unregister(session_id).await;
    tracing::debug!(session_id = %session_id, "WebSocket session closed");
}

/// Act on one classified frame.
///
/// Malformed frames answer the sender only and never end the session.
async fn handle_frame(state: &WebSocketState, session_id: SessionId, text: &str) {
    match classify_frame(text) {
        InboundFrame::Malformed => {
            tracing::debug!(session_id = %session_id, "Malformed frame");
            state
                .registry
                .send_to(session_id, Envelope::error("Invalid message format"))
                .await;
        }
        InboundFrame::Ping => {
            state.registry.send_to(session_id, Envelope::pong()).await;
        }
        InboundFrame::Subscribe(channel) => {
            state.registry.subscribe(session_id, &channel).await;
            state
                .registry
                .send_to(session_id, Envelope::subscription_confirmed(&channel))
                .await;
        }
        InboundFrame::Unsubscribe(channel) => {
            state.registry.unsubscribe(session_id, &channel).await;
            state
                .registry
                .send_to(session_id, Envelope::unsubscription_confirmed(&channel))
                .await;
        }
        InboundFrame::RequestStatus => {
            let envelope = match state.store.counters().await {
                Ok(counters) => {
                    let status =
                        SystemStatus::new(counters, state.registry.session_count().await);
                    match serde_json::to_value(status) {
                        Ok(data) => Envelope::new(EventKind::StatusUpdate).with_data(data),
                        Err(e) => {
                            tracing::error!("Failed to encode status: {}", e);
                            Envelope::error("Failed to load status")
                        }
                    }
                }
                Err(e) => {
                    tracing::error!(session_id = %session_id, "Status query failed: {}", e);
                    Envelope::error("Failed to load status")
                }
            };
            state.registry.send_to(session_id, envelope).await;
        }
        InboundFrame::Echo(original) => {
            state.registry.broadcast_all(Envelope::echo(original)).await;
        }
    }
}

/// Send a JSON envelope over the WebSocket.
async fn send_envelope(
    sender: &mut futures::stream::SplitSink<WebSocket, Message>,
    envelope: &Envelope,
) -> Result<(), axum::Error> {
    let json = envelope.to_wire().map_err(axum::Error::new)?;
    sender.send(Message::Text(json)).await
}
