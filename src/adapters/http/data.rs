//! Reference data endpoints and the bulk mock-data generator.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::ports::{DummyAccount, LocationRecord, NewCamera, NewScrapedResult, SuspectedAccount};

use super::{ApiError, ApiState};

const MOCK_ACCOUNTS: &[&str] = &[
    "@user123", "@shadow_account", "@anon_watcher", "@city_observer", "@night_poster",
];

const MOCK_POSTS: &[&str] = &[
    "Meeting at the usual place tonight",
    "Package arrived, same as last time",
    "Watch the main square around 8pm",
    "Everything is quiet on this side of town",
    "New route through the east gate",
];

const MOCK_PLATFORMS: &[&str] = &["twitter", "instagram", "facebook", "telegram"];

const MOCK_CITIES: &[&str] = &["Jakarta", "Surabaya", "Bandung", "Medan", "Semarang"];

const MOCK_CAMERA_SPOTS: &[&str] = &[
    "Building A Entrance",
    "Parking Lot North",
    "Main Gate",
    "Lobby Camera",
    "Perimeter East",
];

const MAX_MOCK_COUNT: usize = 50;

#[derive(Debug, Deserialize)]
pub struct CreateDummyAccountRequest {
    pub username: Option<String>,
    pub password: Option<String>,
    pub platform: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateDataRequest {
    pub data: Option<Value>,
}

#[derive(Debug, Deserialize)]
pub struct GenerateMockRequest {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub count: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct ListResponse<T> {
    pub success: bool,
    pub count: usize,
    pub data: Vec<T>,
}

#[derive(Debug, Serialize)]
pub struct ItemResponse<T> {
    pub success: bool,
    pub data: T,
}

#[derive(Debug, Serialize)]
pub struct GenerateMockResponse {
    pub success: bool,
    pub generated: usize,
    #[serde(rename = "type")]
    pub kind: String,
}

/// `GET /api/data/dummy-accounts`
pub async fn list_dummy_accounts(
    State(state): State<ApiState>,
) -> Result<Json<ListResponse<DummyAccount>>, ApiError> {
    let rows = state.store.list_dummy_accounts().await?;
    Ok(Json(ListResponse {
        success: true,
        count: rows.len(),
        data: rows,
    }))
}

/// `POST /api/data/dummy-accounts`
pub async fn create_dummy_account(
    State(state): State<ApiState>,
    Json(request): Json<CreateDummyAccountRequest>,
) -> Result<(StatusCode, Json<ItemResponse<DummyAccount>>), ApiError> {
    let missing = || ApiError::BadRequest("Username, password and platform are required".to_string());
    let username = request.username.filter(|s| !s.is_empty()).ok_or_else(missing)?;
    let password = request.password.filter(|s| !s.is_empty()).ok_or_else(missing)?;
    let platform = request.platform.filter(|s| !s.is_empty()).ok_or_else(missing)?;

    let row = state
        .store
        .insert_dummy_account(username, password, platform)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(ItemResponse {
            success: true,
            data: row,
        }),
    ))
}

/// `GET /api/data/suspected-accounts`
pub async fn list_suspected_accounts(
    State(state): State<ApiState>,
) -> Result<Json<ListResponse<SuspectedAccount>>, ApiError> {
    let rows = state.store.list_suspected_accounts().await?;
    Ok(Json(ListResponse {
        success: true,
        count: rows.len(),
        data: rows,
    }))
}

/// `POST /api/data/suspected-accounts`
pub async fn create_suspected_account(
    State(state): State<ApiState>,
    Json(request): Json<CreateDataRequest>,
) -> Result<(StatusCode, Json<ItemResponse<SuspectedAccount>>), ApiError> {
    let data = request
        .data
        .ok_or_else(|| ApiError::BadRequest("Data is required".to_string()))?;

    let row = state.store.insert_suspected_account(data).await?;
    Ok((
        StatusCode::CREATED,
        Json(ItemResponse {
            success: true,
            data: row,
        }),
    ))
}

/// `GET /api/data/locations`
pub async fn list_locations(
    State(state): State<ApiState>,
) -> Result<Json<ListResponse<LocationRecord>>, ApiError> {
    let rows = state.store.list_locations().await?;
    Ok(Json(ListResponse {
        success: true,
        count: rows.len(),
        data: rows,
    }))
}

/// `POST /api/data/locations`
pub async fn create_location(
    State(state): State<ApiState>,
    Json(request): Json<CreateDataRequest>,
) -> Result<(StatusCode, Json<ItemResponse<LocationRecord>>), ApiError> {
    let data = request
        .data
        .ok_or_else(|| ApiError::BadRequest("Data is required".to_string()))?;

    let row = state.store.insert_location(data).await?;
    Ok((
        StatusCode::CREATED,
        Json(ItemResponse {
            success: true,
            data: row,
        }),
    ))
}

/// `POST /api/data/generate-mock`
///
/// Bulk-seeds one table with random rows drawn from the text pools
/// above. Count is capped so a typo cannot flood the database.
pub async fn generate_mock(
    State(state): State<ApiState>,
    Json(request): Json<GenerateMockRequest>,
) -> Result<Json<GenerateMockResponse>, ApiError> {
    let kind = request
        .kind
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ApiError::BadRequest("Type is required".to_string()))?;
    let count = request.count.unwrap_or(5).min(MAX_MOCK_COUNT);

    // StdRng is Send, unlike ThreadRng, so the handler future stays Send
    // while the rng lives across the insert awaits below.
    let mut rng = rand::rngs::StdRng::from_entropy();
    match kind.as_str() {
        "scraped-results" => {
            for _ in 0..count {
                let account = MOCK_ACCOUNTS.choose(&mut rng).copied().unwrap_or("@user123");
                let post = MOCK_POSTS.choose(&mut rng).copied().unwrap_or(MOCK_POSTS[0]);
                state
                    .store
                    .insert_scraped_result(NewScrapedResult {
                        account: account.to_string(),
                        data: post.to_string(),
                        url: Some(format!(
                            "https://example.com/posts/{}",
                            rng.gen_range(1000..9999)
                        )),
                    })
                    .await?;
            }
        }
        "dummy-accounts" => {
            for _ in 0..count {
                let platform = MOCK_PLATFORMS.choose(&mut rng).copied().unwrap_or("twitter");
                state
                    .store
                    .insert_dummy_account(
                        format!("agent_{}", rng.gen_range(100..999)),
                        format!("pw-{}", rng.gen_range(10000..99999)),
                        platform.to_string(),
                    )
                    .await?;
            }
        }
        "suspected-accounts" => {
            for _ in 0..count {
                let account = MOCK_ACCOUNTS.choose(&mut rng).copied().unwrap_or("@user123");
                let platform = MOCK_PLATFORMS.choose(&mut rng).copied().unwrap_or("twitter");
                state
                    .store
                    .insert_suspected_account(json!({
                        "username": account,
                        "platform": platform,
                        "risk_score": rng.gen_range(1..=10),
                    }))
                    .await?;
            }
        }
        "locations" => {
            for _ in 0..count {
                let city = MOCK_CITIES.choose(&mut rng).copied().unwrap_or("Jakarta");
                state
                    .store
                    .insert_location(json!({
                        "city": city,
                        "lat": rng.gen_range(-8.0..=-5.0_f64),
                        "lng": rng.gen_range(105.0..=112.0_f64),
                    }))
                    .await?;
            }
        }
        "cctv" => {
            for n in 0..count {
                let spot = MOCK_CAMERA_SPOTS
                    .choose(&mut rng)
                    .copied()
                    .unwrap_or(MOCK_CAMERA_SPOTS[0]);
                let city = MOCK_CITIES.choose(&mut rng).copied().unwrap_or("Jakarta");
                state
                    .store
                    .insert_camera(NewCamera {
                        name: format!("{spot} {}", n + 1),
                        stream_url: format!("rtsp://cctv.example/{}", rng.gen_range(1..100)),
                        origin_url: None,
                        location: Some(city.to_string()),
                    })
                    .await?;
            }
        }
        other => {
            return Err(ApiError::BadRequest(format!("Unknown mock type: {other}")));
        }
    }

    tracing::info!(kind = %kind, count, "Generated mock rows");
    Ok(Json(GenerateMockResponse {
        success: true,
        generated: count,
        kind,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryStore;
    use crate::adapters::websocket::ConnectionRegistry;
    use std::sync::Arc;

    fn state() -> ApiState {
        ApiState::new(
            Arc::new(InMemoryStore::new()),
            Arc::new(ConnectionRegistry::with_default_capacity()),
        )
    }

    #[tokio::test]
    async fn dummy_account_requires_all_fields() {
        let request = CreateDummyAccountRequest {
            username: Some("agent_1".to_string()),
            password: None,
            platform: Some("twitter".to_string()),
        };
        let result = create_dummy_account(State(state()), Json(request)).await;
        assert!(matches!(result, Err(ApiError::BadRequest(_))));
    }

    #[tokio::test]
    async fn suspected_account_roundtrip() {
        let state = state();
        let request = CreateDataRequest {
            data: Some(json!({"username": "@shadow_account", "platform": "telegram"})),
        };
        let (status, _) = create_suspected_account(State(state.clone()), Json(request))
            .await
            .unwrap();
        assert_eq!(status, StatusCode::CREATED);

        let Json(listed) = list_suspected_accounts(State(state)).await.unwrap();
        assert_eq!(listed.count, 1);
        assert_eq!(listed.data[0].data["platform"], "telegram");
    }

    #[tokio::test]
    async fn generate_mock_seeds_each_table() {
        let state = state();

        for kind in [
            "scraped-results",
            "dummy-accounts",
            "suspected-accounts",
            "locations",
            "cctv",
        ] {
            let request = GenerateMockRequest {
                kind: Some(kind.to_string()),
                count: Some(3),
            };
            let Json(body) = generate_mock(State(state.clone()), Json(request))
                .await
                .unwrap();
            assert_eq!(body.generated, 3);
            assert_eq!(body.kind, kind);
        }

        assert_eq!(state.store.list_dummy_accounts().await.unwrap().len(), 3);
        assert_eq!(state.store.list_locations().await.unwrap().len(), 3);
        assert_eq!(state.store.list_cameras().await.unwrap().len(), 3);
        assert_eq!(state.store.list_scraped_results().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn generate_mock_caps_the_count() {
        let state = state();
        let request = GenerateMockRequest {
            kind: Some("locations".to_string()),
            count: Some(10_000),
        };
        let Json(body) = generate_mock(State(state.clone()), Json(request))
            .await
            .unwrap();
        assert_eq!(body.generated, MAX_MOCK_COUNT);
    }

    #[tokio::test]
    async fn generate_mock_rejects_unknown_type() {
        let request = GenerateMockRequest {
            kind: Some("users".to_string()),
            count: None,
        };
        let result = generate_mock(State(state()), Json(request)).await;
        assert!(matches!(result, Err(ApiError::BadRequest(_))));
    }
}
