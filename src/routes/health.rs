use actix_web::{web, HttpResponse, Responder};

use super::AppState;
use crate::models::HealthResponse;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health_check))
        .route("/workspace", web::get().to(workspace));
}

/// Health check endpoint
///
/// Reports `degraded` while running on fallback data.
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let cloud_connected = state.workspace.snapshot().cloud_connected;
    let status = if cloud_connected { "healthy" } else { "degraded" };

    HttpResponse::Ok().json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        cloud_connected,
        timestamp: chrono::Utc::now(),
    })
}

/// Current workspace snapshot
///
/// GET /api/v1/workspace
async fn workspace(state: web::Data<AppState>) -> impl Responder {
    let snapshot = state.workspace.snapshot();
    HttpResponse::Ok().json(serde_json::json!({
        "version": snapshot.version,
        "cloudConnected": snapshot.cloud_connected,
        "leads": snapshot.leads,
        "properties": snapshot.properties,
        "listings": snapshot.listings,
        "resources": snapshot.resources,
        "sync": state.reconciler.status(),
    }))
}
