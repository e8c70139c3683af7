//! Scraped social-media results and their mock analysis.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::domain::{Envelope, EventKind};
use crate::ports::{AnalysisRecord, NewAnalysis, NewScrapedResult, ScrapedResult};

use super::{ApiError, ApiState};

const KEYWORD_POOL: &[&str] = &[
    "protest", "gathering", "weapon", "threat", "meeting", "transfer", "package", "location",
];

const ENTITY_POOL: &[&str] = &[
    "person", "organization", "vehicle", "address", "phone_number",
];

#[derive(Debug, Deserialize)]
pub struct CreateResultRequest {
    pub account: Option<String>,
    pub data: Option<String>,
    pub url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    #[serde(default)]
    pub ids: Vec<i64>,
}

#[derive(Debug, Serialize)]
pub struct ResultListResponse {
    pub success: bool,
    pub count: usize,
    pub data: Vec<ScrapedResult>,
}

#[derive(Debug, Serialize)]
pub struct ResultResponse {
    pub success: bool,
    pub data: ScrapedResult,
}

#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub success: bool,
    pub analyzed_count: usize,
    pub results: Vec<AnalysisRecord>,
}

#[derive(Debug, Serialize)]
pub struct ResultAnalysisResponse {
    pub success: bool,
    pub data: ScrapedResult,
    pub analysis: Vec<AnalysisRecord>,
}

/// Mock analysis outcome for one scraped result.
///
/// Stands in for a real NLP pipeline: random threat level, a violence
/// flag biased towards negative, and placeholder keywords/entities.
fn generate_mock_analysis(scraped_result_id: i64) -> NewAnalysis {
    let mut rng = rand::thread_rng();

    let keyword_count = rng.gen_range(1..=3);
    let keywords = KEYWORD_POOL
        .choose_multiple(&mut rng, keyword_count)
        .map(|s| s.to_string())
        .collect();
    let entity_count = rng.gen_range(0..=2);
    let detected_entities = ENTITY_POOL
        .choose_multiple(&mut rng, entity_count)
        .map(|s| s.to_string())
        .collect();

    NewAnalysis {
        scraped_result_id,
        violence_detected: rng.gen_bool(0.3),
        threat_level: rng.gen_range(1..=5),
        keywords,
        confidence: (rng.gen_range(0.5..=1.0_f64) * 100.0).round() / 100.0,
        detected_entities,
    }
}

/// `POST /api/scraped-results`
pub async fn create_result(
    State(state): State<ApiState>,
    Json(request): Json<CreateResultRequest>,
) -> Result<(StatusCode, Json<ResultResponse>), ApiError> {
    let account = request
        .account
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ApiError::BadRequest("Account and data are required".to_string()))?;
    let data = request
        .data
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ApiError::BadRequest("Account and data are required".to_string()))?;

    let row = state
        .store
        .insert_scraped_result(NewScrapedResult {
            account,
            data,
            url: request.url,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ResultResponse {
            success: true,
            data: row,
        }),
    ))
}

/// `GET /api/scraped-results`
pub async fn list_results(
    State(state): State<ApiState>,
) -> Result<Json<ResultListResponse>, ApiError> {
    let rows = state.store.list_scraped_results().await?;
    Ok(Json(ResultListResponse {
        success: true,
        count: rows.len(),
        data: rows,
    }))
}

/// `GET /api/scraped-results/:id`
pub async fn get_result(
    State(state): State<ApiState>,
    Path(id): Path<i64>,
) -> Result<Json<ResultResponse>, ApiError> {
    let row = state
        .store
        .get_scraped_result(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Scraped result not found".to_string()))?;

    Ok(Json(ResultResponse {
        success: true,
        data: row,
    }))
}

/// `POST /api/scraped-results/analyze`
///
/// Runs the mock analyzer over the requested rows, persists the
/// outcomes and announces the batch to every session.
pub async fn analyze_results(
    State(state): State<ApiState>,
    Json(request): Json<AnalyzeRequest>,
) -> Result<Json<AnalyzeResponse>, ApiError> {
    if request.ids.is_empty() {
        return Err(ApiError::BadRequest("ids is required".to_string()));
    }

    let mut results = Vec::new();
    for id in &request.ids {
        let Some(row) = state.store.get_scraped_result(*id).await? else {
            continue;
        };

        let analysis = state
            .store
            .insert_analysis(generate_mock_analysis(row.id))
            .await?;
        state.store.mark_result_analyzed(row.id).await?;
        results.push(analysis);
    }

    if results.is_empty() {
        return Err(ApiError::NotFound("No scraped results found".to_string()));
    }

    let envelope = Envelope::new(EventKind::AnalysisComplete).with_data(json!({
        "analyzed_count": results.len(),
        "results": &results,
    }));
    state.registry.broadcast_all(envelope).await;
    tracing::info!(analyzed_count = results.len(), "Analysis batch complete");

    Ok(Json(AnalyzeResponse {
        success: true,
        analyzed_count: results.len(),
        results,
    }))
}

/// `GET /api/scraped-results/analysis/:id`
pub async fn get_result_analysis(
    State(state): State<ApiState>,
    Path(id): Path<i64>,
) -> Result<Json<ResultAnalysisResponse>, ApiError> {
    let row = state
        .store
        .get_scraped_result(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Scraped result not found".to_string()))?;
    let analysis = state.store.list_analysis_for_result(id).await?;

    Ok(Json(ResultAnalysisResponse {
        success: true,
        data: row,
        analysis,
    }))
}
