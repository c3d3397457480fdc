use serde::{Deserialize, Serialize};

use crate::core::ranker::SortOrder;
use crate::models::domain::{Property, Recommendation};

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub cloud_connected: bool,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}

/// Recommendation with the inventory record it refers to, when one is known
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankedRecommendation {
    #[serde(flatten)]
    pub recommendation: Recommendation,
    pub property: Option<Property>,
}

/// Response for the recommendations endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationsResponse {
    pub lead_id: String,
    pub order: SortOrder,
    pub summary: String,
    pub recommendations: Vec<RankedRecommendation>,
}

/// Grounded answer from the resource library
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerResponse {
    pub answer: String,
    pub sources: Vec<String>,
}
