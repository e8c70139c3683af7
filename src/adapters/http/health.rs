//! Liveness endpoint.

use axum::Json;
use serde::Serialize;

use crate::domain::Timestamp;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: Timestamp,
    pub service: &'static str,
}

/// `GET /api/health`
///
/// Reports liveness regardless of how many WebSocket sessions exist.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "OK",
        timestamp: Timestamp::now(),
        service: "Sentinel Dashboard Server",
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn health_reports_ok() {
        let Json(body) = health().await;
        assert_eq!(body.status, "OK");
        assert_eq!(body.service, "Sentinel Dashboard Server");
    }
}
