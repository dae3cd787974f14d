//! Health check endpoint.

use actix_web::{HttpResponse, web};
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub timestamp: String,
    pub storage: &'static str,
}

/// Liveness check - reports the storage backend and whether it answers.
///
/// GET /health
pub async fn health_check(state: web::Data<AppState>) -> HttpResponse {
    let status = if state.storage_healthy().await {
        "healthy"
    } else {
        "degraded"
    };

    HttpResponse::Ok().json(HealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION"),
        timestamp: chrono::Utc::now().to_rfc3339(),
        storage: state.posts.backend(),
    })
}
