//! CCTV cameras and their detection feeds.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::domain::{Envelope, EventKind};
use crate::ports::{Camera, Detection, NewCamera, NewDetection};

use super::{ApiError, ApiState};

const DEFAULT_DETECTION_LIMIT: i64 = 20;

#[derive(Debug, Deserialize)]
pub struct CreateCameraRequest {
    pub name: Option<String>,
    pub stream_url: Option<String>,
    pub origin_url: Option<String>,
    pub location: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateDetectionRequest {
    pub data: Option<Value>,
    pub snapshot_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct MockDetectionRequest {
    pub cctv_id: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct DetectionQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct CameraListResponse {
    pub success: bool,
    pub count: usize,
    pub data: Vec<Camera>,
}

#[derive(Debug, Serialize)]
pub struct CameraResponse {
    pub success: bool,
    pub data: Camera,
}

#[derive(Debug, Serialize)]
pub struct DetectionListResponse {
    pub success: bool,
    pub count: usize,
    pub data: Vec<Detection>,
}

#[derive(Debug, Serialize)]
pub struct DetectionResponse {
    pub success: bool,
    pub data: Detection,
}

/// Clamp a requested page size into the allowed window.
fn clamp_limit(limit: Option<i64>) -> i64 {
    limit.unwrap_or(DEFAULT_DETECTION_LIMIT).clamp(1, 100)
}

/// Random detection payload: a few person/vehicle boxes with
/// confidences, an alert level and a fake processing time.
fn generate_mock_detection_data() -> Value {
    let mut rng = rand::thread_rng();

    let mut objects = Vec::new();
    for _ in 0..rng.gen_range(1..=4) {
        let class = if rng.gen_bool(0.7) { "person" } else { "vehicle" };
        objects.push(json!({
            "class": class,
            "confidence": (rng.gen_range(0.6..=0.99_f64) * 100.0).round() / 100.0,
            "bbox": [
                rng.gen_range(0..1280),
                rng.gen_range(0..720),
                rng.gen_range(50..300),
                rng.gen_range(50..300),
            ],
        }));
    }

    json!({
        "objects": objects,
        "alert_level": rng.gen_range(1..=5),
        "processing_time_ms": rng.gen_range(20..200),
    })
}

fn mock_snapshot_url() -> String {
    let seed: u32 = rand::thread_rng().gen_range(1..=1000);
    format!("https://picsum.photos/seed/{seed}/640/360")
}

/// Envelope announcing one detection to the dashboards.
fn detection_envelope(detection: &Detection, camera_name: &str) -> Envelope {
    Envelope::new(EventKind::CctvDetection).with_data(json!({
        "id": detection.id,
        "cctv_id": detection.cctv_id,
        "cctv_name": camera_name,
        "data": detection.data,
        "snapshot_url": detection.snapshot_url,
        "timestamp": detection.created_at,
    }))
}

/// `GET /api/cctv`
pub async fn list_cameras(
    State(state): State<ApiState>,
) -> Result<Json<CameraListResponse>, ApiError> {
    let cameras = state.store.list_cameras().await?;
    Ok(Json(CameraListResponse {
        success: true,
        count: cameras.len(),
        data: cameras,
    }))
}

/// `POST /api/cctv`
pub async fn create_camera(
    State(state): State<ApiState>,
    Json(request): Json<CreateCameraRequest>,
) -> Result<(StatusCode, Json<CameraResponse>), ApiError> {
    let name = request
        .name
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ApiError::BadRequest("Name and stream_url are required".to_string()))?;
    let stream_url = request
        .stream_url
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ApiError::BadRequest("Name and stream_url are required".to_string()))?;

    let camera = state
        .store
        .insert_camera(NewCamera {
            name,
            stream_url,
            origin_url: request.origin_url,
            location: request.location,
        })
        .await?;

    let envelope = Envelope::new(EventKind::CctvAdded)
        .with_data(serde_json::to_value(&camera).map_err(|e| ApiError::Internal(e.to_string()))?);
    state.registry.broadcast_all(envelope).await;

    Ok((
        StatusCode::CREATED,
        Json(CameraResponse {
            success: true,
            data: camera,
        }),
    ))
}

/// `GET /api/cctv/:id`
pub async fn get_camera(
    State(state): State<ApiState>,
    Path(id): Path<i64>,
) -> Result<Json<CameraResponse>, ApiError> {
    let camera = state
        .store
        .get_camera(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("CCTV camera not found".to_string()))?;

    Ok(Json(CameraResponse {
        success: true,
        data: camera,
    }))
}

/// `GET /api/cctv/:id/detections?limit&offset`
pub async fn list_detections(
    State(state): State<ApiState>,
    Path(id): Path<i64>,
    Query(query): Query<DetectionQuery>,
) -> Result<Json<DetectionListResponse>, ApiError> {
    state
        .store
        .get_camera(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("CCTV camera not found".to_string()))?;

    let limit = clamp_limit(query.limit);
    let offset = query.offset.unwrap_or(0).max(0);

    let detections = state.store.list_detections(id, limit, offset).await?;
    Ok(Json(DetectionListResponse {
        success: true,
        count: detections.len(),
        data: detections,
    }))
}

/// `POST /api/cctv/:id/detections`
pub async fn create_detection(
    State(state): State<ApiState>,
    Path(id): Path<i64>,
    Json(request): Json<CreateDetectionRequest>,
) -> Result<(StatusCode, Json<DetectionResponse>), ApiError> {
    let camera = state
        .store
        .get_camera(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("CCTV camera not found".to_string()))?;
    let data = request
        .data
        .ok_or_else(|| ApiError::BadRequest("Detection data is required".to_string()))?;

    let detection = state
        .store
        .insert_detection(NewDetection {
            cctv_id: camera.id,
            data,
            snapshot_url: request.snapshot_url,
        })
        .await?;

    state
        .registry
        .broadcast_all(detection_envelope(&detection, &camera.name))
        .await;

    Ok((
        StatusCode::CREATED,
        Json(DetectionResponse {
            success: true,
            data: detection,
        }),
    ))
}

/// `POST /api/cctv/mock-detection`
///
/// Simulates a camera event: picks the requested camera (or a random
/// one), fabricates a detection and pushes it through the same path as
/// a real one.
pub async fn mock_detection(
    State(state): State<ApiState>,
    Json(request): Json<MockDetectionRequest>,
) -> Result<(StatusCode, Json<DetectionResponse>), ApiError> {
    let camera = match request.cctv_id {
        Some(id) => state
            .store
            .get_camera(id)
            .await?
            .ok_or_else(|| ApiError::NotFound("CCTV camera not found".to_string()))?,
        None => state
            .store
            .random_camera()
            .await?
            .ok_or_else(|| ApiError::NotFound("No CCTV cameras available".to_string()))?,
    };

    let detection = state
        .store
        .insert_detection(NewDetection {
            cctv_id: camera.id,
            data: generate_mock_detection_data(),
            snapshot_url: Some(mock_snapshot_url()),
        })
        .await?;

    state
        .registry
        .broadcast_all(detection_envelope(&detection, &camera.name))
        .await;

    Ok((
        StatusCode::CREATED,
        Json(DetectionResponse {
            success: true,
            data: detection,
        }),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryStore;
    use crate::adapters::websocket::ConnectionRegistry;
    use std::sync::Arc;

    fn state() -> (ApiState, Arc<ConnectionRegistry>) {
        let registry = Arc::new(ConnectionRegistry::with_default_capacity());
        (
            ApiState::new(Arc::new(InMemoryStore::new()), registry.clone()),
            registry,
        )
    }

    async fn seed_camera(state: &ApiState) -> Camera {
        let request = CreateCameraRequest {
            name: Some("Building A Entrance".to_string()),
            stream_url: Some("rtsp://example/stream-1".to_string()),
            origin_url: None,
            location: Some("Building A".to_string()),
        };
        let (_, Json(body)) = create_camera(State(state.clone()), Json(request))
            .await
            .unwrap();
        body.data
    }

    #[test]
    fn limit_clamps_into_allowed_window() {
        assert_eq!(clamp_limit(None), DEFAULT_DETECTION_LIMIT);
        assert_eq!(clamp_limit(Some(0)), 1);
        assert_eq!(clamp_limit(Some(-5)), 1);
        assert_eq!(clamp_limit(Some(50)), 50);
        assert_eq!(clamp_limit(Some(500)), 100);
    }

    #[test]
    fn mock_detection_data_is_well_formed() {
        for _ in 0..20 {
            let data = generate_mock_detection_data();
            let objects = data["objects"].as_array().unwrap();
            assert!(!objects.is_empty() && objects.len() <= 4);
            for object in objects {
                let class = object["class"].as_str().unwrap();
                assert!(class == "person" || class == "vehicle");
                assert_eq!(object["bbox"].as_array().unwrap().len(), 4);
            }
            let alert = data["alert_level"].as_i64().unwrap();
            assert!((1..=5).contains(&alert));
        }
    }

    #[tokio::test]
    async fn create_camera_broadcasts_cctv_added() {
        let (state, registry) = state();
        let (_id, mut rx) = registry.register().await;

        seed_camera(&state).await;

        let envelope = rx.recv().await.unwrap();
        assert_eq!(envelope.kind, EventKind::CctvAdded);
        assert_eq!(
            envelope.data.as_ref().unwrap()["name"],
            "Building A Entrance"
        );
    }

    #[tokio::test]
    async fn create_camera_requires_name_and_stream() {
        let (state, _) = state();
        let request = CreateCameraRequest {
            name: Some("Camera".to_string()),
            stream_url: None,
            origin_url: None,
            location: None,
        };
        let result = create_camera(State(state), Json(request)).await;
        assert!(matches!(result, Err(ApiError::BadRequest(_))));
    }

    #[tokio::test]
    async fn detection_broadcast_names_the_camera() {
        let (state, registry) = state();
        let camera = seed_camera(&state).await;
        let (_id, mut rx) = registry.register().await;

        let request = CreateDetectionRequest {
            data: Some(json!({"objects": []})),
            snapshot_url: None,
        };
        let (status, Json(body)) =
            create_detection(State(state), Path(camera.id), Json(request))
                .await
                .unwrap();

        assert_eq!(status, StatusCode::CREATED);
        assert!(body.success);

        let envelope = rx.recv().await.unwrap();
        assert_eq!(envelope.kind, EventKind::CctvDetection);
        let data = envelope.data.unwrap();
        assert_eq!(data["cctv_id"], camera.id);
        assert_eq!(data["cctv_name"], "Building A Entrance");
    }

    #[tokio::test]
    async fn detections_for_unknown_camera_are_404() {
        let (state, _) = state();
        let query = DetectionQuery {
            limit: None,
            offset: None,
        };
        let result = list_detections(State(state), Path(999), Query(query)).await;
        assert!(matches!(result, Err(ApiError::NotFound(_))));
    }

    #[tokio::test]
    async fn mock_detection_without_cameras_is_404() {
        let (state, _) = state();
        let result = mock_detection(
            State(state),
            Json(MockDetectionRequest { cctv_id: None }),
        )
        .await;
        assert!(matches!(result, Err(ApiError::NotFound(_))));
    }

    #[tokio::test]
    async fn mock_detection_uses_random_camera() {
        let (state, registry) = state();
        let camera = seed_camera(&state).await;
        let (_id, mut rx) = registry.register().await;

        let (_, Json(body)) = mock_detection(
            State(state.clone()),
            Json(MockDetectionRequest { cctv_id: None }),
        )
        .await
        .unwrap();

        assert_eq!(body.data.cctv_id, camera.id);
        assert!(body.data.snapshot_url.as_deref().unwrap().contains("picsum"));

        let envelope = rx.recv().await.unwrap();
        assert_eq!(envelope.kind, EventKind::CctvDetection);

        // The stored detection is listed like any real one
        let query = DetectionQuery {
            limit: Some(10),
            offset: None,
        };
        let Json(listed) = list_detections(State(state), Path(camera.id), Query(query))
            .await
            .unwrap();
        assert_eq!(listed.count, 1);
    }
}
