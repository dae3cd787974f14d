//! # Quill API Server
//!
//! HTTP layer of the Quill blog service: routes, error mapping and
//! application wiring. The binary in `main.rs` only boots it.

pub mod config;
pub mod handlers;
pub mod middleware;
pub mod observability;
pub mod state;
pub mod telemetry;

pub use config::AppConfig;
pub use state::AppState;
