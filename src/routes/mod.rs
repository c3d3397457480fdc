// Route exports
pub mod health;
pub mod inventory;
pub mod leads;
pub mod matching;

use actix_web::{http::StatusCode, web, HttpResponse};
use std::sync::Arc;
use validator::ValidationErrors;

use crate::core::{Library, Reconciler, Workspace};
use crate::models::ErrorResponse;
use crate::services::GeminiClient;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub workspace: Arc<Workspace>,
    pub library: Library,
    pub reconciler: Arc<Reconciler>,
    pub gemini: Arc<GeminiClient>,
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .configure(health::configure)
            .configure(leads::configure)
            .configure(inventory::configure)
            .configure(matching::configure),
    );
}

pub(crate) fn error_response(status: StatusCode, error: &str, message: impl Into<String>) -> HttpResponse {
    HttpResponse::build(status).json(ErrorResponse {
        error: error.to_string(),
        message: message.into(),
        status_code: status.as_u16(),
    })
}

pub(crate) fn validation_failed(errors: ValidationErrors) -> HttpResponse {
    tracing::info!("Validation failed: {}", errors);
    error_response(StatusCode::BAD_REQUEST, "Validation failed", errors.to_string())
}

pub(crate) fn not_found(what: &str, id: &str) -> HttpResponse {
    error_response(
        StatusCode::NOT_FOUND,
        "Not found",
        format!("No {} with id {}", what, id),
    )
}
