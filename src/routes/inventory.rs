use actix_web::{web, HttpResponse, Responder};
use validator::Validate;

use super::{not_found, validation_failed, AppState};
use crate::models::{NewPropertyRequest, UploadDocumentRequest};

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/properties", web::get().to(list_properties))
        .route("/properties", web::post().to(add_property))
        .route("/properties/{id}", web::delete().to(remove_property))
        .route("/documents", web::get().to(list_documents))
        .route("/documents", web::post().to(add_document))
        .route("/documents/{id}", web::delete().to(remove_document));
}

async fn list_properties(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(&state.workspace.snapshot().properties)
}

/// Add a property by manual entry
///
/// POST /api/v1/properties
async fn add_property(
    state: web::Data<AppState>,
    req: web::Json<NewPropertyRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        return validation_failed(errors);
    }

    let property = state.library.add_property(req.into_inner()).await;
    tracing::info!("Added property {} ({})", property.name, property.id);
    HttpResponse::Created().json(property)
}

async fn remove_property(state: web::Data<AppState>, path: web::Path<String>) -> impl Responder {
    let id = path.into_inner();
    if state.library.remove_property(&id).await {
        HttpResponse::NoContent().finish()
    } else {
        not_found("property", &id)
    }
}

/// Listing documents and resources, split by category
async fn list_documents(state: web::Data<AppState>) -> impl Responder {
    let snapshot = state.workspace.snapshot();
    HttpResponse::Ok().json(serde_json::json!({
        "listings": snapshot.listings,
        "resources": snapshot.resources,
    }))
}

/// Upload a text document
///
/// POST /api/v1/documents
///
/// Request body:
/// ```json
/// { "name": "listings.txt", "content": "...", "sizeBytes": 2048, "category": "Listing" }
/// ```
async fn add_document(
    state: web::Data<AppState>,
    req: web::Json<UploadDocumentRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        return validation_failed(errors);
    }

    let document = state.library.add_document(req.into_inner()).await;
    tracing::info!(
        "Stored {} document {} ({})",
        document.category.as_str(),
        document.name,
        document.size
    );
    HttpResponse::Created().json(document)
}

async fn remove_document(state: web::Data<AppState>, path: web::Path<String>) -> impl Responder {
    let id = path.into_inner();
    if state.library.remove_document(&id).await {
        HttpResponse::NoContent().finish()
    } else {
        not_found("document", &id)
    }
}
