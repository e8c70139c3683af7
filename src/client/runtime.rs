//! Tokio runtime around the session controller.
//!
//! Owns the tokio-tungstenite socket and the reconnect loop. All retry
//! decisions come from [`SessionController`]; this module only executes
//! them. The whole loop runs in one task whose handle the client owns,
//! so teardown aborts any pending reconnect delay along with the
//! socket.

use std::sync::Arc;

use futures::{SinkExt, StreamExt};
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tokio_tungstenite::{connect_async, tungstenite::Message};

use crate::config::RealtimeConfig;
use crate::domain::Envelope;

use super::controller::{ReconnectDecision, ReconnectPolicy, SessionController};
use super::sinks::{StatusIndicator, UpdateSink};

/// Errors surfaced by the client runtime.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("Client already connected")]
    AlreadyConnected,

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

struct Shared {
    url: String,
    controller: Mutex<SessionController>,
    outbound_tx: mpsc::Sender<Envelope>,
    outbound_rx: Mutex<mpsc::Receiver<Envelope>>,
}

/// WebSocket client for the dashboard feed.
///
/// Reconnects automatically with the controller's bounded policy and
/// dispatches inbound envelopes to the configured sinks.
pub struct DashboardClient {
    shared: Arc<Shared>,
    run_task: Mutex<Option<JoinHandle<()>>>,
}

impl DashboardClient {
    /// Build a client for `url`, typically `ws://host:port/ws`.
    pub fn new(
        url: impl Into<String>,
        config: &RealtimeConfig,
        sink: Arc<dyn UpdateSink>,
        indicator: Arc<dyn StatusIndicator>,
    ) -> Self {
        let policy = ReconnectPolicy::new(config.reconnect_delay(), config.max_reconnect_attempts);
        let controller = SessionController::new(policy, config.log_bound, sink, indicator);
        let (outbound_tx, outbound_rx) = mpsc::channel(config.session_capacity);

        Self {
            shared: Arc::new(Shared {
                url: url.into(),
                controller: Mutex::new(controller),
                outbound_tx,
                outbound_rx: Mutex::new(outbound_rx),
            }),
            run_task: Mutex::new(None),
        }
    }

    /// Start the connect/reconnect loop in the background.
    pub async fn connect(&self) -> Result<(), ClientError> {
        let mut run_task = self.run_task.lock().await;
        if run_task.is_some() {
            return Err(ClientError::AlreadyConnected);
        }

        let shared = self.shared.clone();
        *run_task = Some(tokio::spawn(run_loop(shared)));
        Ok(())
    }

    /// Queue an envelope for sending.
    ///
    /// Returns `false` when the session is not open; the controller
    /// records a warning in the message log.
    pub async fn send(&self, envelope: Envelope) -> bool {
        if !self.shared.controller.lock().await.allow_send() {
            return false;
        }
        self.shared.outbound_tx.send(envelope).await.is_ok()
    }

    /// Run `f` against the session controller (state inspection, log
    /// pause/clear/export).
    pub async fn with_controller<R>(&self, f: impl FnOnce(&mut SessionController) -> R) -> R {
        let mut controller = self.shared.controller.lock().await;
        f(&mut controller)
    }

    /// Tear the client down: aborts the run loop, including any pending
    /// reconnect delay.
    pub async fn shutdown(&self) {
        if let Some(task) = self.run_task.lock().await.take() {
            task.abort();
        }
    }
}

async fn run_loop(shared: Arc<Shared>) {
    loop {
        shared.controller.lock().await.on_connecting();

        match connect_async(shared.url.as_str()).await {
            Ok((stream, _)) => {
                shared.controller.lock().await.on_open();
                tracing::info!(url = %shared.url, "Dashboard feed connected");
                pump_socket(&shared, stream).await;
            }
            Err(e) => {
                tracing::warn!(url = %shared.url, "Connect failed: {}", e);
            }
        }

        let decision = shared.controller.lock().await.on_disconnect();
        match decision {
            ReconnectDecision::Retry { attempt, delay } => {
                tracing::info!(attempt, delay_ms = delay.as_millis() as u64, "Reconnecting");
                tokio::time::sleep(delay).await;
            }
            ReconnectDecision::GiveUp => {
                tracing::error!(url = %shared.url, "Giving up on dashboard feed");
                return;
            }
        }
    }
}

/// Pump one live socket until it closes or errors.
async fn pump_socket(
    shared: &Arc<Shared>,
    stream: tokio_tungstenite::WebSocketStream<
        tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
    >,
) {
    let (mut ws_sender, mut ws_receiver) = stream.split();
    let mut outbound_rx = shared.outbound_rx.lock().await;

    loop {
        tokio::select! {
            outbound = outbound_rx.recv() => {
                // The sender half lives in Shared, so this never yields None
                let Some(envelope) = outbound else { return };
                let text = match envelope.to_wire() {
                    Ok(text) => text,
                    Err(e) => {
                        tracing::error!("Failed to encode outbound envelope: {}", e);
                        continue;
                    }
                };
                if let Err(e) = ws_sender.send(Message::Text(text)).await {
                    tracing::debug!("Send failed, socket closing: {}", e);
                    return;
                }
            }
            inbound = ws_receiver.next() => {
                match inbound {
                    Some(Ok(Message::Text(text))) => {
                        match serde_json::from_str::<Envelope>(&text) {
                            Ok(envelope) => {
                                shared.controller.lock().await.handle_envelope(&envelope);
                            }
                            Err(e) => {
                                tracing::warn!("Unparseable frame from server: {}", e);
                            }
                        }
                    }
                    Some(Ok(Message::Ping(_))) | Some(Ok(Message::Pong(_))) => {}
                    Some(Ok(Message::Close(_))) | None => {
                        tracing::debug!("Server closed the connection");
                        return;
                    }
                    Some(Ok(_)) => {
                        // Binary and raw frames are not part of the protocol
                    }
                    Some(Err(e)) => {
                        tracing::debug!("Receive error: {}", e);
                        return;
                    }
                }
            }
        }
    }
}
