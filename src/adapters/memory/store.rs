//! In-memory `DashboardStore` used by tests and local development.
//!
//! Single-writer semantics behind one `RwLock`; ids are assigned from a
//! shared counter so cross-table ids never collide, which keeps test
//! assertions unambiguous.

use async_trait::async_trait;
use chrono::{Datelike, Utc};
use rand::seq::SliceRandom;
use serde_json::Value;
use tokio::sync::RwLock;

use crate::domain::{DashboardCounters, Timestamp};
use crate::ports::{
    AnalysisRecord, Camera, DashboardStore, Detection, DummyAccount, LocationRecord, NewAnalysis,
    NewCamera, NewDetection, NewScrapedResult, ScrapedResult, StoreError, SuspectedAccount,
};

#[derive(Default)]
struct Inner {
    scraped_results: Vec<ScrapedResult>,
    analyses: Vec<AnalysisRecord>,
    cameras: Vec<Camera>,
    detections: Vec<Detection>,
    dummy_accounts: Vec<DummyAccount>,
    suspected_accounts: Vec<SuspectedAccount>,
    locations: Vec<LocationRecord>,
    next_id: i64,
}

impl Inner {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

/// In-memory store, empty at construction.
#[derive(Default)]
pub struct InMemoryStore {
    inner: RwLock<Inner>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DashboardStore for InMemoryStore {
    async fn insert_scraped_result(
        &self,
        new: NewScrapedResult,
    ) -> Result<ScrapedResult, StoreError> {
        let mut inner = self.inner.write().await;
        let row = ScrapedResult {
            id: inner.next_id(),
            account: new.account,
            data: new.data,
            url: new.url,
            analyzed: false,
            created_at: Timestamp::now(),
        };
        inner.scraped_results.push(row.clone());
        Ok(row)
    }

    async fn list_scraped_results(&self) -> Result<Vec<ScrapedResult>, StoreError> {
        let inner = self.inner.read().await;
        // Newest first
        Ok(inner.scraped_results.iter().rev().cloned().collect())
    }

    async fn get_scraped_result(&self, id: i64) -> Result<Option<ScrapedResult>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.scraped_results.iter().find(|r| r.id == id).cloned())
    }

    async fn insert_analysis(&self, new: NewAnalysis) -> Result<AnalysisRecord, StoreError> {
        let mut inner = self.inner.write().await;
        let row = AnalysisRecord {
            id: inner.next_id(),
            scraped_result_id: new.scraped_result_id,
            violence_detected: new.violence_detected,
            threat_level: new.threat_level,
            keywords: new.keywords,
            confidence: new.confidence,
            detected_entities: new.detected_entities,
            created_at: Timestamp::now(),
        };
        inner.analyses.push(row.clone());
        Ok(row)
    }

    async fn list_analysis_for_result(
        &self,
        scraped_result_id: i64,
    ) -> Result<Vec<AnalysisRecord>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner
            .analyses
            .iter()
            .filter(|a| a.scraped_result_id == scraped_result_id)
            .cloned()
            .collect())
    }

    async fn mark_result_analyzed(&self, id: i64) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        match inner.scraped_results.iter_mut().find(|r| r.id == id) {
            Some(row) => {
                row.analyzed = true;
                Ok(())
            }
            None => Err(StoreError::NotFound(id)),
        }
    }

    async fn insert_camera(&self, new: NewCamera) -> Result<Camera, StoreError> {
        let mut inner = self.inner.write().await;
        let row = Camera {
            id: inner.next_id(),
            name: new.name,
            stream_url: new.stream_url,
            origin_url: new.origin_url,
            location: new.location,
            created_at: Timestamp::now(),
        };
        inner.cameras.push(row.clone());
        Ok(row)
    }

    async fn list_cameras(&self) -> Result<Vec<Camera>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.cameras.clone())
    }

    async fn get_camera(&self, id: i64) -> Result<Option<Camera>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.cameras.iter().find(|c| c.id == id).cloned())
    }

    async fn random_camera(&self) -> Result<Option<Camera>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.cameras.choose(&mut rand::thread_rng()).cloned())
    }

    async fn insert_detection(&self, new: NewDetection) -> Result<Detection, StoreError> {
        let mut inner = self.inner.write().await;
        if !inner.cameras.iter().any(|c| c.id == new.cctv_id) {
            return Err(StoreError::NotFound(new.cctv_id));
        }
        let row = Detection {
            id: inner.next_id(),
            cctv_id: new.cctv_id,
            data: new.data,
            snapshot_url: new.snapshot_url,
            created_at: Timestamp::now(),
        };
        inner.detections.push(row.clone());
        Ok(row)
    }

    async fn list_detections(
        &self,
        cctv_id: i64,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Detection>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner
            .detections
            .iter()
            .rev()
            .filter(|d| d.cctv_id == cctv_id)
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .cloned()
            .collect())
    }

    async fn insert_dummy_account(
        &self,
        username: String,
        password: String,
        platform: String,
    ) -> Result<DummyAccount, StoreError> {
        let mut inner = self.inner.write().await;
        let row = DummyAccount {
            id: inner.next_id(),
            username,
            password,
            platform,
            created_at: Timestamp::now(),
        };
        inner.dummy_accounts.push(row.clone());
        Ok(row)
    }

    async fn list_dummy_accounts(&self) -> Result<Vec<DummyAccount>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.dummy_accounts.clone())
    }

    async fn insert_suspected_account(&self, data: Value) -> Result<SuspectedAccount, StoreError> {
        let mut inner = self.inner.write().await;
        let row = SuspectedAccount {
            id: inner.next_id(),
            data,
            created_at: Timestamp::now(),
        };
        inner.suspected_accounts.push(row.clone());
        Ok(row)
    }

    async fn list_suspected_accounts(&self) -> Result<Vec<SuspectedAccount>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.suspected_accounts.clone())
    }

    async fn insert_location(&self, data: Value) -> Result<LocationRecord, StoreError> {
        let mut inner = self.inner.write().await;
        let row = LocationRecord {
            id: inner.next_id(),
            data,
            created_at: Timestamp::now(),
        };
        inner.locations.push(row.clone());
        Ok(row)
    }

    async fn list_locations(&self) -> Result<Vec<LocationRecord>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.locations.clone())
    }

    async fn counters(&self) -> Result<DashboardCounters, StoreError> {
        let inner = self.inner.read().await;
        let today = Utc::now();
        let detections_today = inner
            .detections
            .iter()
            .filter(|d| {
                let at = d.created_at.as_datetime();
                at.year() == today.year() && at.ordinal() == today.ordinal()
            })
            .count() as i64;

        Ok(DashboardCounters {
            cctv_cameras: inner.cameras.len() as i64,
            scraped_results: inner.scraped_results.len() as i64,
            detections_today,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn camera() -> NewCamera {
        NewCamera {
            name: "Building A Entrance".to_string(),
            stream_url: "rtsp://example/stream".to_string(),
            origin_url: None,
            location: Some("Building A".to_string()),
        }
    }

    #[tokio::test]
    async fn scraped_results_list_newest_first() {
        let store = InMemoryStore::new();
        for account in ["@first", "@second", "@third"] {
            store
                .insert_scraped_result(NewScrapedResult {
                    account: account.to_string(),
                    data: "post".to_string(),
                    url: None,
                })
                .await
                .unwrap();
        }

        let rows = store.list_scraped_results().await.unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].account, "@third");
        assert_eq!(rows[2].account, "@first");
    }

    #[tokio::test]
    async fn get_scraped_result_by_id() {
        let store = InMemoryStore::new();
        let inserted = store
            .insert_scraped_result(NewScrapedResult {
                account: "@user".to_string(),
                data: "post".to_string(),
                url: Some("https://example.com/p/1".to_string()),
            })
            .await
            .unwrap();

        let found = store.get_scraped_result(inserted.id).await.unwrap();
        assert_eq!(found.unwrap().account, "@user");

        let missing = store.get_scraped_result(9999).await.unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn analysis_links_to_scraped_result() {
        let store = InMemoryStore::new();
        let result = store
            .insert_scraped_result(NewScrapedResult {
                account: "@user".to_string(),
                data: "post".to_string(),
                url: None,
            })
            .await
            .unwrap();

        store
            .insert_analysis(NewAnalysis {
                scraped_result_id: result.id,
                violence_detected: true,
                threat_level: 4,
                keywords: vec!["keyword".to_string()],
                confidence: 0.9,
                detected_entities: vec!["entity".to_string()],
            })
            .await
            .unwrap();
        store.mark_result_analyzed(result.id).await.unwrap();

        let analyses = store.list_analysis_for_result(result.id).await.unwrap();
        assert_eq!(analyses.len(), 1);
        assert_eq!(analyses[0].threat_level, 4);

        let row = store.get_scraped_result(result.id).await.unwrap().unwrap();
        assert!(row.analyzed);
    }

    #[tokio::test]
    async fn detections_require_existing_camera() {
        let store = InMemoryStore::new();

        let err = store
            .insert_detection(NewDetection {
                cctv_id: 42,
                data: json!({"objects": []}),
                snapshot_url: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound(42)));
    }

    #[tokio::test]
    async fn detections_paginate_newest_first() {
        let store = InMemoryStore::new();
        let cam = store.insert_camera(camera()).await.unwrap();

        for n in 0..5 {
            store
                .insert_detection(NewDetection {
                    cctv_id: cam.id,
                    data: json!({"n": n}),
                    snapshot_url: None,
                })
                .await
                .unwrap();
        }

        let page = store.list_detections(cam.id, 2, 1).await.unwrap();
        assert_eq!(page.len(), 2);
        assert_eq!(page[0].data["n"], 3);
        assert_eq!(page[1].data["n"], 2);
    }

    #[tokio::test]
    async fn random_camera_none_when_empty() {
        let store = InMemoryStore::new();
        assert!(store.random_camera().await.unwrap().is_none());

        let cam = store.insert_camera(camera()).await.unwrap();
        assert_eq!(store.random_camera().await.unwrap().unwrap().id, cam.id);
    }

    #[tokio::test]
    async fn counters_track_inserts() {
        let store = InMemoryStore::new();
        let cam = store.insert_camera(camera()).await.unwrap();
        store
            .insert_scraped_result(NewScrapedResult {
                account: "@user".to_string(),
                data: "post".to_string(),
                url: None,
            })
            .await
            .unwrap();
        store
            .insert_detection(NewDetection {
                cctv_id: cam.id,
                data: json!({}),
                snapshot_url: None,
            })
            .await
            .unwrap();

        let counters = store.counters().await.unwrap();
        assert_eq!(counters.cctv_cameras, 1);
        assert_eq!(counters.scraped_results, 1);
        assert_eq!(counters.detections_today, 1);
    }
}
