//! # Quill Infrastructure
//!
//! Concrete implementations of the ports defined in `quill-core`.
//!
//! ## Feature Flags
//!
//! - `postgres` (default) - PostgreSQL post store via SeaORM; build with
//!   `default-features = false` for the in-memory store only

pub mod database;
pub mod store;

pub use database::DatabaseConfig;
pub use store::InMemoryPostStore;

#[cfg(feature = "postgres")]
pub use database::{DatabaseConnections, PostgresPostRepository};
