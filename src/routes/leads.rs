use actix_web::{http::StatusCode, web, HttpResponse, Responder};
use validator::Validate;

use super::{error_response, validation_failed, AppState};
use crate::core::SyncError;
use crate::models::SyncLeadsRequest;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/leads", web::get().to(list_leads))
        .route("/leads/sync", web::post().to(sync_leads))
        .route("/leads/sync", web::get().to(sync_status));
}

pub(crate) fn sync_error_response(err: &SyncError) -> HttpResponse {
    match err {
        SyncError::InProgress => error_response(StatusCode::CONFLICT, "Sync in progress", err.to_string()),
        SyncError::Ingestion(_) => error_response(StatusCode::BAD_GATEWAY, "Sync failed", err.to_string()),
    }
}

async fn list_leads(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(&state.workspace.snapshot().leads)
}

/// Sync leads from a shared sheet
///
/// POST /api/v1/leads/sync
///
/// Request body:
/// ```json
/// { "sheetId": "string" }
/// ```
async fn sync_leads(
    state: web::Data<AppState>,
    req: web::Json<SyncLeadsRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        return validation_failed(errors);
    }

    match state.reconciler.sync_interactive(req.sheet_id.trim()).await {
        Ok(report) => HttpResponse::Ok().json(report),
        Err(e) => {
            tracing::error!("Lead sync failed: {}", e);
            sync_error_response(&e)
        }
    }
}

async fn sync_status(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(state.reconciler.status())
}
