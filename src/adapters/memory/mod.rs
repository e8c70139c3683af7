//! In-memory adapter implementations for tests and local development.

mod store;

pub use store::InMemoryStore;
