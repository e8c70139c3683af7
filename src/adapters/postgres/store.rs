//! PostgreSQL implementation of DashboardStore.
//!
//! Row-level CRUD over the dashboard schema. Schema management lives
//! outside this crate; queries assume the tables already exist.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value as JsonValue;
use sqlx::{PgPool, Row};

use crate::domain::{DashboardCounters, Timestamp};
use crate::ports::{
    AnalysisRecord, Camera, DashboardStore, Detection, DummyAccount, LocationRecord, NewAnalysis,
    NewCamera, NewDetection, NewScrapedResult, ScrapedResult, StoreError, SuspectedAccount,
};

/// PostgreSQL implementation of DashboardStore.
#[derive(Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Creates a new PostgresStore.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn timestamp(row: &sqlx::postgres::PgRow, column: &str) -> Timestamp {
    let dt: DateTime<Utc> = row.get(column);
    Timestamp::from_datetime(dt)
}

fn scraped_result_from_row(row: &sqlx::postgres::PgRow) -> ScrapedResult {
    ScrapedResult {
        id: row.get("id"),
        account: row.get("account"),
        data: row.get("data"),
        url: row.get("url"),
        analyzed: row.get("analyzed"),
        created_at: timestamp(row, "created_at"),
    }
}

fn analysis_from_row(row: &sqlx::postgres::PgRow) -> AnalysisRecord {
    AnalysisRecord {
        id: row.get("id"),
        scraped_result_id: row.get("scraped_result_id"),
        violence_detected: row.get("violence_detected"),
        threat_level: row.get("threat_level"),
        keywords: row.get("keywords"),
        confidence: row.get("confidence"),
        detected_entities: row.get("detected_entities"),
        created_at: timestamp(row, "created_at"),
    }
}

fn camera_from_row(row: &sqlx::postgres::PgRow) -> Camera {
    Camera {
        id: row.get("id"),
        name: row.get("name"),
        stream_url: row.get("stream_url"),
        origin_url: row.get("origin_url"),
        location: row.get("location"),
        created_at: timestamp(row, "created_at"),
    }
}

fn detection_from_row(row: &sqlx::postgres::PgRow) -> Detection {
    Detection {
        id: row.get("id"),
        cctv_id: row.get("cctv_id"),
        data: row.get("data"),
        snapshot_url: row.get("snapshot_url"),
        created_at: timestamp(row, "created_at"),
    }
}

#[async_trait]
impl DashboardStore for PostgresStore {
    async fn insert_scraped_result(
        &self,
        new: NewScrapedResult,
    ) -> Result<ScrapedResult, StoreError> {
        let row = sqlx::query(
            r#"
            INSERT INTO scraped_results (account, data, url, analyzed)
            VALUES ($1, $2, $3, FALSE)
            RETURNING id, account, data, url, analyzed, created_at
            "#,
        )
        .bind(&new.account)
        .bind(&new.data)
        .bind(&new.url)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(scraped_result_from_row(&row))
    }

    async fn list_scraped_results(&self) -> Result<Vec<ScrapedResult>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT id, account, data, url, analyzed, created_at
            FROM scraped_results
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(rows.iter().map(scraped_result_from_row).collect())
    }

    async fn get_scraped_result(&self, id: i64) -> Result<Option<ScrapedResult>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT id, account, data, url, analyzed, created_at
            FROM scraped_results
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(row.as_ref().map(scraped_result_from_row))
    }

    async fn insert_analysis(&self, new: NewAnalysis) -> Result<AnalysisRecord, StoreError> {
        let row = sqlx::query(
            r#"
            INSERT INTO analysis_results
                (scraped_result_id, violence_detected, threat_level, keywords,
                 confidence, detected_entities)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, scraped_result_id, violence_detected, threat_level,
                      keywords, confidence, detected_entities, created_at
            "#,
        )
        .bind(new.scraped_result_id)
        .bind(new.violence_detected)
        .bind(new.threat_level)
        .bind(&new.keywords)
        .bind(new.confidence)
        .bind(&new.detected_entities)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(analysis_from_row(&row))
    }

    async fn list_analysis_for_result(
        &self,
        scraped_result_id: i64,
    ) -> Result<Vec<AnalysisRecord>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT id, scraped_result_id, violence_detected, threat_level,
                   keywords, confidence, detected_entities, created_at
            FROM analysis_results
            WHERE scraped_result_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(scraped_result_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(rows.iter().map(analysis_from_row).collect())
    }

    async fn mark_result_analyzed(&self, id: i64) -> Result<(), StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE scraped_results SET analyzed = TRUE WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Database(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(id));
        }
        Ok(())
    }

    async fn insert_camera(&self, new: NewCamera) -> Result<Camera, StoreError> {
        let row = sqlx::query(
            r#"
            INSERT INTO cctv_cameras (name, stream_url, origin_url, location)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, stream_url, origin_url, location, created_at
            "#,
        )
        .bind(&new.name)
        .bind(&new.stream_url)
        .bind(&new.origin_url)
        .bind(&new.location)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(camera_from_row(&row))
    }

    async fn list_cameras(&self) -> Result<Vec<Camera>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT id, name, stream_url, origin_url, location, created_at
            FROM cctv_cameras
            ORDER BY created_at ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(rows.iter().map(camera_from_row).collect())
    }

    async fn get_camera(&self, id: i64) -> Result<Option<Camera>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT id, name, stream_url, origin_url, location, created_at
            FROM cctv_cameras
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(row.as_ref().map(camera_from_row))
    }

    async fn random_camera(&self) -> Result<Option<Camera>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT id, name, stream_url, origin_url, location, created_at
            FROM cctv_cameras
            ORDER BY RANDOM()
            LIMIT 1
            "#,
        )
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(row.as_ref().map(camera_from_row))
    }

    async fn insert_detection(&self, new: NewDetection) -> Result<Detection, StoreError> {
        let row = sqlx::query(
            r#"
            INSERT INTO cctv_detections (cctv_id, data, snapshot_url)
            VALUES ($1, $2, $3)
            RETURNING id, cctv_id, data, snapshot_url, created_at
            "#,
        )
        .bind(new.cctv_id)
        .bind(&new.data)
        .bind(&new.snapshot_url)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(detection_from_row(&row))
    }

    async fn list_detections(
        &self,
        cctv_id: i64,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Detection>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT id, cctv_id, data, snapshot_url, created_at
            FROM cctv_detections
            WHERE cctv_id = $1
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(cctv_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(rows.iter().map(detection_from_row).collect())
    }

    async fn insert_dummy_account(
        &self,
        username: String,
        password: String,
        platform: String,
    ) -> Result<DummyAccount, StoreError> {
        let row = sqlx::query(
            r#"
            INSERT INTO dummy_accounts (username, password, platform)
            VALUES ($1, $2, $3)
            RETURNING id, username, password, platform, created_at
            "#,
        )
        .bind(&username)
        .bind(&password)
        .bind(&platform)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(DummyAccount {
            id: row.get("id"),
            username: row.get("username"),
            password: row.get("password"),
            platform: row.get("platform"),
            created_at: timestamp(&row, "created_at"),
        })
    }

    async fn list_dummy_accounts(&self) -> Result<Vec<DummyAccount>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT id, username, password, platform, created_at
            FROM dummy_accounts
            ORDER BY created_at ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(rows
            .iter()
            .map(|row| DummyAccount {
                id: row.get("id"),
                username: row.get("username"),
                password: row.get("password"),
                platform: row.get("platform"),
                created_at: timestamp(row, "created_at"),
            })
            .collect())
    }

    async fn insert_suspected_account(&self, data: JsonValue) -> Result<SuspectedAccount, StoreError> {
        let row = sqlx::query(
            r#"
            INSERT INTO suspected_accounts (data)
            VALUES ($1)
            RETURNING id, data, created_at
            "#,
        )
        .bind(&data)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(SuspectedAccount {
            id: row.get("id"),
            data: row.get("data"),
            created_at: timestamp(&row, "created_at"),
        })
    }

    async fn list_suspected_accounts(&self) -> Result<Vec<SuspectedAccount>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT id, data, created_at
            FROM suspected_accounts
            ORDER BY created_at ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(rows
            .iter()
            .map(|row| SuspectedAccount {
                id: row.get("id"),
                data: row.get("data"),
                created_at: timestamp(row, "created_at"),
            })
            .collect())
    }

    async fn insert_location(&self, data: JsonValue) -> Result<LocationRecord, StoreError> {
        let row = sqlx::query(
            r#"
            INSERT INTO locations (data)
            VALUES ($1)
            RETURNING id, data, created_at
            "#,
        )
        .bind(&data)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(LocationRecord {
            id: row.get("id"),
            data: row.get("data"),
            created_at: timestamp(&row, "created_at"),
        })
    }

    async fn list_locations(&self) -> Result<Vec<LocationRecord>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT id, data, created_at
            FROM locations
            ORDER BY created_at ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(rows
            .iter()
            .map(|row| LocationRecord {
                id: row.get("id"),
                data: row.get("data"),
                created_at: timestamp(row, "created_at"),
            })
            .collect())
    }

    async fn counters(&self) -> Result<DashboardCounters, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT
                (SELECT COUNT(*) FROM cctv_cameras) AS cctv_cameras,
                (SELECT COUNT(*) FROM scraped_results) AS scraped_results,
                (SELECT COUNT(*) FROM cctv_detections
                 WHERE created_at >= date_trunc('day', now())) AS detections_today
            "#,
        )
        .fetch_one(&self.pool)
        .await
        .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(DashboardCounters {
            cctv_cameras: row.get("cctv_cameras"),
            scraped_results: row.get("scraped_results"),
            detections_today: row.get("detections_today"),
        })
    }
}
