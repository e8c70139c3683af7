//! HTTP adapter: REST endpoints over axum.
//!
//! Handlers receive the store and the connection registry through
//! [`ApiState`]; writes that other dashboards should see immediately
//! broadcast an envelope after the row is persisted.

mod cctv;
mod channels;
mod data;
mod error;
mod health;
mod messages;
mod scraped_results;

pub use error::{ApiError, ErrorResponse};

use std::sync::Arc;

use axum::extract::FromRef;
use axum::routing::{get, post};
use axum::Router;

use crate::adapters::websocket::ConnectionRegistry;
use crate::ports::DashboardStore;

/// Dependencies shared by every REST handler.
#[derive(Clone)]
pub struct ApiState {
    pub store: Arc<dyn DashboardStore>,
    pub registry: Arc<ConnectionRegistry>,
}

impl ApiState {
    pub fn new(store: Arc<dyn DashboardStore>, registry: Arc<ConnectionRegistry>) -> Self {
        Self { store, registry }
    }
}

/// Router for everything under `/api`.
pub fn api_router<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
    ApiState: FromRef<S>,
{
    Router::new()
        .route("/health", get(health::health))
        .route("/channels", get(channels::list_channels))
        .route("/messages", post(messages::broadcast_message))
        .route(
            "/scraped-results",
            get(scraped_results::list_results).post(scraped_results::create_result),
        )
        .route("/scraped-results/analyze", post(scraped_results::analyze_results))
        .route(
            "/scraped-results/analysis/:id",
            get(scraped_results::get_result_analysis),
        )
        .route("/scraped-results/:id", get(scraped_results::get_result))
        .route("/cctv", get(cctv::list_cameras).post(cctv::create_camera))
        .route("/cctv/mock-detection", post(cctv::mock_detection))
        .route("/cctv/:id", get(cctv::get_camera))
        .route(
            "/cctv/:id/detections",
            get(cctv::list_detections).post(cctv::create_detection),
        )
        .route(
            "/data/dummy-accounts",
            get(data::list_dummy_accounts).post(data::create_dummy_account),
        )
        .route(
            "/data/suspected-accounts",
            get(data::list_suspected_accounts).post(data::create_suspected_account),
        )
        .route(
            "/data/locations",
            get(data::list_locations).post(data::create_location),
        )
        .route("/data/generate-mock", post(data::generate_mock))
}
