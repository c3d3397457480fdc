use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::core::ranker::SortOrder;
use crate::models::domain::{DocumentCategory, PropertyType, RecommendationResponse};

/// Request to sync leads from a shared sheet
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SyncLeadsRequest {
    #[validate(length(min = 1))]
    #[serde(alias = "sheet_id", rename = "sheetId")]
    pub sheet_id: String,
}

/// Manual inventory entry
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewPropertyRequest {
    #[validate(length(min = 1))]
    pub name: String,
    #[validate(range(min = 0.0))]
    pub price: f64,
    #[serde(default)]
    pub location: String,
    #[serde(rename = "type", default)]
    pub property_type: PropertyType,
    #[serde(default)]
    pub bedrooms: u32,
    #[validate(range(min = 0.0))]
    #[serde(default)]
    pub bathrooms: f64,
    #[serde(default)]
    pub sqft: u32,
    #[serde(default)]
    pub amenities: Vec<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image_url: Option<String>,
}

/// Text document upload
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UploadDocumentRequest {
    #[validate(length(min = 1))]
    pub name: String,
    pub content: String,
    /// Original file size; the content length is used when absent
    #[serde(default)]
    pub size_bytes: Option<u64>,
    pub category: DocumentCategory,
}

/// Where the matching service should look for candidates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum InventorySourceKind {
    /// Structured inventory records
    #[default]
    Inventory,
    /// Raw text of a stored listing document
    Document,
}

/// Request property recommendations for a lead
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationsRequest {
    #[validate(length(min = 1))]
    pub lead_id: String,
    #[serde(default)]
    pub source: InventorySourceKind,
    #[serde(default)]
    pub document_id: Option<String>,
    #[serde(default)]
    pub order: SortOrder,
}

/// Re-sort a response the caller already holds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankRequest {
    pub response: RecommendationResponse,
    #[serde(default)]
    pub order: SortOrder,
}

/// Question answered from the resource library
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AskRequest {
    #[validate(length(min = 1))]
    pub question: String,
    /// Restrict grounding to these resources; all resources when absent
    #[serde(default)]
    pub document_ids: Option<Vec<String>>,
}
