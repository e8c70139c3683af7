use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::{DashboardCounters, Timestamp};

/// A scraped social-media result on record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrapedResult {
    pub id: i64,
    pub account: String,
    pub data: String,
    pub url: Option<String>,
    pub analyzed: bool,
    pub created_at: Timestamp,
}

/// One analysis outcome for a scraped result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisRecord {
    pub id: i64,
    pub scraped_result_id: i64,
    pub violence_detected: bool,
    /// 1 (benign) through 5 (critical)
    pub threat_level: i16,
    pub keywords: Vec<String>,
    pub confidence: f64,
    pub detected_entities: Vec<String>,
    pub created_at: Timestamp,
}

/// A registered CCTV camera.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Camera {
    pub id: i64,
    pub name: String,
    pub stream_url: String,
    pub origin_url: Option<String>,
    pub location: Option<String>,
    pub created_at: Timestamp,
}

/// A detection reported by a camera.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Detection {
    pub id: i64,
    pub cctv_id: i64,
    pub data: Value,
    pub snapshot_url: Option<String>,
    pub created_at: Timestamp,
}

/// Seeded credentials used by the mock scraper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DummyAccount {
    pub id: i64,
    pub username: String,
    pub password: String,
    pub platform: String,
    pub created_at: Timestamp,
}

/// An account flagged for monitoring.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuspectedAccount {
    pub id: i64,
    pub data: Value,
    pub created_at: Timestamp,
}

/// A location of interest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationRecord {
    pub id: i64,
    pub data: Value,
    pub created_at: Timestamp,
}

/// Insert payloads. Ids and timestamps are assigned by the store.
#[derive(Debug, Clone)]
pub struct NewScrapedResult {
    pub account: String,
    pub data: String,
    pub url: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewCamera {
    pub name: String,
    pub stream_url: String,
    pub origin_url: Option<String>,
    pub location: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewDetection {
    pub cctv_id: i64,
    pub data: Value,
    pub snapshot_url: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewAnalysis {
    pub scraped_result_id: i64,
    pub violence_detected: bool,
    pub threat_level: i16,
    pub keywords: Vec<String>,
    pub confidence: f64,
    pub detected_entities: Vec<String>,
}

/// Persistence port for everything the dashboard records.
#[async_trait]
pub trait DashboardStore: Send + Sync {
    // Scraped results
    async fn insert_scraped_result(
        &self,
        new: NewScrapedResult,
    ) -> Result<ScrapedResult, StoreError>;
    async fn list_scraped_results(&self) -> Result<Vec<ScrapedResult>, StoreError>;
    async fn get_scraped_result(&self, id: i64) -> Result<Option<ScrapedResult>, StoreError>;

    // Analysis
    async fn insert_analysis(&self, new: NewAnalysis) -> Result<AnalysisRecord, StoreError>;
    async fn list_analysis_for_result(
        &self,
        scraped_result_id: i64,
    ) -> Result<Vec<AnalysisRecord>, StoreError>;
    async fn mark_result_analyzed(&self, id: i64) -> Result<(), StoreError>;

    // Cameras
    async fn insert_camera(&self, new: NewCamera) -> Result<Camera, StoreError>;
    async fn list_cameras(&self) -> Result<Vec<Camera>, StoreError>;
    async fn get_camera(&self, id: i64) -> Result<Option<Camera>, StoreError>;
    /// Picks an arbitrary camera, used by mock detection generation.
    async fn random_camera(&self) -> Result<Option<Camera>, StoreError>;

    // Detections
    async fn insert_detection(&self, new: NewDetection) -> Result<Detection, StoreError>;
    async fn list_detections(
        &self,
        cctv_id: i64,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Detection>, StoreError>;

    // Reference data
    async fn insert_dummy_account(
        &self,
        username: String,
        password: String,
        platform: String,
    ) -> Result<DummyAccount, StoreError>;
    async fn list_dummy_accounts(&self) -> Result<Vec<DummyAccount>, StoreError>;

    async fn insert_suspected_account(&self, data: Value) -> Result<SuspectedAccount, StoreError>;
    async fn list_suspected_accounts(&self) -> Result<Vec<SuspectedAccount>, StoreError>;

    async fn insert_location(&self, data: Value) -> Result<LocationRecord, StoreError>;
    async fn list_locations(&self) -> Result<Vec<LocationRecord>, StoreError>;

    /// Counters reported through `status_update` envelopes.
    async fn counters(&self) -> Result<DashboardCounters, StoreError>;
}

/// Errors that can occur during store operations
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Record not found: {0}")]
    NotFound(i64),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        StoreError::Database(err.to_string())
    }
}
