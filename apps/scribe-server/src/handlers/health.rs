//! Health check endpoint.

use actix_web::HttpResponse;

use scribe_shared::dto::HealthResponse;

/// Health check endpoint - returns server status.
///
/// GET /health
pub async fn health_check() -> HttpResponse {
    let response = HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    };

    HttpResponse::Ok().json(response)
}
