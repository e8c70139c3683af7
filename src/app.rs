//! Router assembly and shared application state.

use std::sync::Arc;
use std::time::Duration;

use axum::extract::FromRef;
use axum::http::{HeaderValue, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::adapters::http::{api_router, ApiState, ErrorResponse};
use crate::adapters::websocket::{ws_handler, ConnectionRegistry, WebSocketState};
use crate::config::AppConfig;
use crate::ports::DashboardStore;

/// Everything the routers need, injected explicitly.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn DashboardStore>,
    pub registry: Arc<ConnectionRegistry>,
}

impl AppState {
    pub fn new(store: Arc<dyn DashboardStore>, registry: Arc<ConnectionRegistry>) -> Self {
        Self { store, registry }
    }
}

impl FromRef<AppState> for ApiState {
    fn from_ref(state: &AppState) -> Self {
        ApiState::new(state.store.clone(), state.registry.clone())
    }
}

impl FromRef<AppState> for WebSocketState {
    fn from_ref(state: &AppState) -> Self {
        WebSocketState::new(state.registry.clone(), state.store.clone())
    }
}

async fn fallback(uri: axum::http::Uri) -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse::new("Endpoint not found").with_path(uri.path())),
    )
}

/// CORS layer from the configured origin list; permissive when no
/// origins are configured (local development default).
fn cors_layer(config: &AppConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .server
        .cors_origins_list()
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    if origins.is_empty() {
        CorsLayer::permissive()
    } else {
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    }
}

/// Build the full application router.
pub fn build_router(state: AppState, config: &AppConfig) -> Router {
    Router::new()
        .nest("/api", api_router())
        .route("/ws", get(ws_handler))
        .fallback(fallback)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(config))
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryStore;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn test_app() -> Router {
        let state = AppState::new(
            Arc::new(InMemoryStore::new()),
            Arc::new(ConnectionRegistry::with_default_capacity()),
        );
        let config = AppConfig {
            server: Default::default(),
            database: crate::config::DatabaseConfig {
                url: "postgresql://unused".to_string(),
                ..Default::default()
            },
            realtime: Default::default(),
        };
        build_router(state, &config)
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn health_endpoint_responds() {
        let app = test_app();
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["status"], "OK");
        assert_eq!(body["service"], "Sentinel Dashboard Server");
    }

    #[tokio::test]
    async fn channels_endpoint_lists_catalog() {
        let app = test_app();
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/channels")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["channels"].as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn unknown_route_returns_structured_404() {
        let app = test_app();
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/nope")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = body_json(response).await;
        assert_eq!(body["error"], "Endpoint not found");
        assert_eq!(body["path"], "/api/nope");
    }

    #[tokio::test]
    async fn scraped_result_create_then_fetch() {
        let app = test_app();

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/scraped-results")
                    .header("content-type", "application/json")
                    .body(Body::from(
                        json!({"account": "@user123", "data": "content"}).to_string(),
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let created = body_json(response).await;
        let id = created["data"]["id"].as_i64().unwrap();

        let response = app
            .oneshot(
                Request::builder()
                    .uri(format!("/api/scraped-results/{id}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let fetched = body_json(response).await;
        assert_eq!(fetched["data"]["account"], "@user123");
    }

    #[tokio::test]
    async fn scraped_result_create_without_data_is_400() {
        let app = test_app();
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/scraped-results")
                    .header("content-type", "application/json")
                    .body(Body::from(json!({"account": "@user123"}).to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["error"], "Account and data are required");
    }

    #[tokio::test]
    async fn configured_cors_origin_is_echoed_back() {
        let state = AppState::new(
            Arc::new(InMemoryStore::new()),
            Arc::new(ConnectionRegistry::with_default_capacity()),
        );
        let config = AppConfig {
            server: crate::config::ServerConfig {
                cors_origins: Some("http://localhost:5173".to_string()),
                ..Default::default()
            },
            database: crate::config::DatabaseConfig {
                url: "postgresql://unused".to_string(),
                ..Default::default()
            },
            realtime: Default::default(),
        };
        let app = build_router(state, &config);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/health")
                    .header("origin", "http://localhost:5173")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(
            response
                .headers()
                .get("access-control-allow-origin")
                .map(|v| v.to_str().unwrap()),
            Some("http://localhost:5173")
        );
    }

    #[tokio::test]
    async fn unconfigured_cors_allows_any_origin() {
        let app = test_app();
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/health")
                    .header("origin", "http://example.com")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(
            response
                .headers()
                .get("access-control-allow-origin")
                .map(|v| v.to_str().unwrap()),
            Some("*")
        );
    }

    #[tokio::test]
    async fn cctv_detection_limit_is_clamped() {
        let app = test_app();

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/cctv")
                    .header("content-type", "application/json")
                    .body(Body::from(
                        json!({"name": "Main Gate", "stream_url": "rtsp://x"}).to_string(),
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let camera = body_json(response).await;
        let id = camera["data"]["id"].as_i64().unwrap();

        // Absurd limit gets clamped rather than rejected
        let response = app
            .oneshot(
                Request::builder()
                    .uri(format!("/api/cctv/{id}/detections?limit=9999"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
