use actix_web::{http::StatusCode, web, HttpResponse, Responder};
use validator::Validate;

use super::{error_response, not_found, validation_failed, AppState};
use crate::core::{rank, InventorySource};
use crate::models::{
    AnswerResponse, AskRequest, InventorySourceKind, RankRequest, RankedRecommendation,
    RecommendationsRequest, RecommendationsResponse,
};
use crate::services::MatchingError;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/matching/recommendations", web::post().to(recommend))
        .route("/matching/rank", web::post().to(rank_response))
        .route("/resources/ask", web::post().to(ask));
}

pub(crate) fn matching_error_response(err: &MatchingError) -> HttpResponse {
    match err {
        MatchingError::MissingCredential => error_response(
            StatusCode::SERVICE_UNAVAILABLE,
            "Matching unavailable",
            err.to_string(),
        ),
        _ => error_response(StatusCode::BAD_GATEWAY, "Matching failed", err.to_string()),
    }
}

/// Recommend properties for a lead
///
/// POST /api/v1/matching/recommendations
///
/// Request body:
/// ```json
/// {
///   "leadId": "string",
///   "source": "inventory|document",
///   "documentId": "string",
///   "order": "desc|asc"
/// }
/// ```
async fn recommend(
    state: web::Data<AppState>,
    req: web::Json<RecommendationsRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        return validation_failed(errors);
    }

    let snapshot = state.workspace.snapshot();
    let Some(lead) = snapshot.lead(&req.lead_id) else {
        return not_found("lead", &req.lead_id);
    };

    let source = match req.source {
        InventorySourceKind::Inventory => InventorySource::Structured(&snapshot.properties),
        InventorySourceKind::Document => {
            let Some(document_id) = req.document_id.as_deref() else {
                return error_response(
                    StatusCode::BAD_REQUEST,
                    "Validation failed",
                    "documentId is required when source is document",
                );
            };
            match snapshot.listings.iter().find(|d| d.id == document_id) {
                Some(document) => InventorySource::Document(&document.content),
                None => return not_found("listing document", document_id),
            }
        }
    };

    tracing::info!(
        "Matching lead {} against {} inventory",
        lead.id,
        if source.is_structured() { "structured" } else { "document" }
    );

    let response = match state.gemini.recommend(&lead.criteria, source).await {
        Ok(response) => response,
        Err(e) => {
            tracing::error!("Matching failed for lead {}: {}", lead.id, e);
            return matching_error_response(&e);
        }
    };

    let ranked = rank(&response, req.order);
    let recommendations = ranked
        .recommendations
        .into_iter()
        .map(|recommendation| RankedRecommendation {
            property: recommendation.resolve(&snapshot.properties).cloned(),
            recommendation,
        })
        .collect();

    HttpResponse::Ok().json(RecommendationsResponse {
        lead_id: lead.id.clone(),
        order: req.order,
        summary: ranked.summary,
        recommendations,
    })
}

/// Re-sort a response without calling the matching service again
async fn rank_response(req: web::Json<RankRequest>) -> impl Responder {
    HttpResponse::Ok().json(rank(&req.response, req.order))
}

/// Answer a question from the resource library
///
/// POST /api/v1/resources/ask
async fn ask(state: web::Data<AppState>, req: web::Json<AskRequest>) -> impl Responder {
    if let Err(errors) = req.validate() {
        return validation_failed(errors);
    }

    let snapshot = state.workspace.snapshot();
    let documents: Vec<_> = snapshot
        .resources
        .iter()
        .filter(|d| {
            req.document_ids
                .as_ref()
                .map_or(true, |ids| ids.iter().any(|id| *id == d.id))
        })
        .cloned()
        .collect();

    if documents.is_empty() {
        return error_response(
            StatusCode::BAD_REQUEST,
            "No resources",
            "Upload at least one resource document before asking a question",
        );
    }

    match state.gemini.ask(&documents, req.question.trim()).await {
        Ok(answer) => HttpResponse::Ok().json(AnswerResponse {
            answer,
            sources: documents.into_iter().map(|d| d.name).collect(),
        }),
        Err(e) => {
            tracing::error!("Resource question failed: {}", e);
            matching_error_response(&e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matching_error_status_codes() {
        assert_eq!(
            matching_error_response(&MatchingError::MissingCredential).status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            matching_error_response(&MatchingError::EmptyResponse).status(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            matching_error_response(&MatchingError::MalformedResponse("x".into())).status(),
            StatusCode::BAD_GATEWAY
        );
    }
}
