//! PostgreSQL adapter implementations.

mod store;

pub use store::PostgresStore;
