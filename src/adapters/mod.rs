//! Adapters - Implementations of ports for external systems.
//!
//! - `http` - REST endpoints over axum
//! - `websocket` - real-time fan-out layer
//! - `postgres` - sqlx-backed persistence
//! - `memory` - in-memory persistence for tests and local development

pub mod http;
pub mod memory;
pub mod postgres;
pub mod websocket;
