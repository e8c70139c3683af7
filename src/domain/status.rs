//! Dashboard counters reported through `status_update` envelopes.

use serde::{Deserialize, Serialize};

/// Persistent counters tracked by the store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardCounters {
    /// Registered CCTV cameras
    pub cctv_cameras: i64,
    /// Scraped social-media results on record
    pub scraped_results: i64,
    /// Detections recorded since midnight UTC
    pub detections_today: i64,
}

/// Full status payload: store counters plus live session count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemStatus {
    pub cctv_cameras: i64,
    pub scraped_results: i64,
    pub detections_today: i64,
    /// Sessions currently held by the connection registry
    pub connected_clients: usize,
}

impl SystemStatus {
    pub fn new(counters: DashboardCounters, connected_clients: usize) -> Self {
        Self {
            cctv_cameras: counters.cctv_cameras,
            scraped_results: counters.scraped_results,
            detections_today: counters.detections_today,
            connected_clients,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_status_combines_counters_and_sessions() {
        let counters = DashboardCounters {
            cctv_cameras: 4,
            scraped_results: 120,
            detections_today: 17,
        };
        let status = SystemStatus::new(counters, 3);

        assert_eq!(status.cctv_cameras, 4);
        assert_eq!(status.scraped_results, 120);
        assert_eq!(status.detections_today, 17);
        assert_eq!(status.connected_clients, 3);
    }

    #[test]
    fn system_status_serializes_flat() {
        let status = SystemStatus::new(DashboardCounters::default(), 1);
        let value = serde_json::to_value(status).unwrap();

        assert_eq!(value["cctv_cameras"], 0);
        assert_eq!(value["connected_clients"], 1);
    }
}
