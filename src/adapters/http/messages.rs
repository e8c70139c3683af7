//! Manual broadcast endpoint, mainly used for demos and smoke tests.

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::{Envelope, EventKind};

use super::{ApiError, ApiState};

#[derive(Debug, Deserialize)]
pub struct BroadcastRequest {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub message: Option<String>,
    pub data: Option<Value>,
}

#[derive(Debug, Serialize)]
pub struct BroadcastResponse {
    pub success: bool,
    pub clients: usize,
}

/// `POST /api/messages`
///
/// Requires both `type` and `message`; the envelope is stamped here and
/// fanned out to every session.
pub async fn broadcast_message(
    State(state): State<ApiState>,
    Json(request): Json<BroadcastRequest>,
) -> Result<Json<BroadcastResponse>, ApiError> {
    let kind = request
        .kind
        .as_deref()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ApiError::BadRequest("Type and message are required".to_string()))?;
    let message = request
        .message
        .as_deref()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ApiError::BadRequest("Type and message are required".to_string()))?;

    let mut envelope = Envelope::new(EventKind::from(kind)).with_message(message);
    if let Some(data) = request.data {
        envelope = envelope.with_data(data);
    }

    let clients = state.registry.broadcast_all(envelope).await;
    tracing::info!(kind, clients, "Manual broadcast");

    Ok(Json(BroadcastResponse {
        success: true,
        clients,
    }))
}
