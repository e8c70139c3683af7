//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! - `DashboardStore` - persistence for scraped results, cameras,
//!   detections, analysis records and reference data

mod store;

pub use store::{
    AnalysisRecord, Camera, DashboardStore, Detection, DummyAccount, LocationRecord, NewAnalysis,
    NewCamera, NewDetection, NewScrapedResult, ScrapedResult, StoreError, SuspectedAccount,
};
