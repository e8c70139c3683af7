//! Sentinel Dashboard - Monitoring backend with real-time fan-out
//!
//! This crate ingests mocked social-media scraping and CCTV detection
//! events, stores them relationally, and pushes typed envelopes to
//! connected dashboards over WebSocket. The `client` module is the
//! consumer side: a reconnecting session controller with a bounded
//! message log.

pub mod adapters;
pub mod app;
pub mod client;
pub mod config;
pub mod domain;
pub mod ports;
