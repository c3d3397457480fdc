use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Pipeline stage of a lead
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum LeadStatus {
    #[default]
    New,
    Contacted,
    Qualified,
    Converted,
    Lost,
}

impl LeadStatus {
    pub const ALL: [LeadStatus; 5] = [
        LeadStatus::New,
        LeadStatus::Contacted,
        LeadStatus::Qualified,
        LeadStatus::Converted,
        LeadStatus::Lost,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LeadStatus::New => "New",
            LeadStatus::Contacted => "Contacted",
            LeadStatus::Qualified => "Qualified",
            LeadStatus::Converted => "Converted",
            LeadStatus::Lost => "Lost",
        }
    }

    /// Case-insensitive lookup; `None` for anything outside the five stages
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        Self::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(value))
    }
}

impl fmt::Display for LeadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a buyer is looking for. Missing fields take the defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LeadCriteria {
    pub budget_min: f64,
    pub budget_max: f64,
    pub location: String,
    pub min_bedrooms: u32,
    pub min_bathrooms: f64,
    pub preferred_type: String,
    pub lifestyle: String,
    pub essential_features: Vec<String>,
}

impl LeadCriteria {
    /// `budgetMin <= budgetMax` is expected but never enforced
    pub fn has_inverted_budget(&self) -> bool {
        self.budget_min > self.budget_max
    }
}

impl Default for LeadCriteria {
    fn default() -> Self {
        Self {
            budget_min: 0.0,
            budget_max: 0.0,
            location: String::new(),
            min_bedrooms: 0,
            min_bathrooms: 0.0,
            preferred_type: "House".to_string(),
            lifestyle: String::new(),
            essential_features: Vec::new(),
        }
    }
}

/// A prospective buyer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lead {
    pub id: String,
    pub name: String,
    pub email: String,
    pub status: LeadStatus,
    pub last_contacted: NaiveDate,
    pub criteria: LeadCriteria,
}

/// Closed set of listing types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum PropertyType {
    #[default]
    House,
    Apartment,
    Condo,
    Penthouse,
    Villa,
}

impl PropertyType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PropertyType::House => "House",
            PropertyType::Apartment => "Apartment",
            PropertyType::Condo => "Condo",
            PropertyType::Penthouse => "Penthouse",
            PropertyType::Villa => "Villa",
        }
    }
}

impl fmt::Display for PropertyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An inventory listing. Replaced or removed as a whole, never patched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Property {
    pub id: String,
    pub name: String,
    pub price: f64,
    pub location: String,
    #[serde(rename = "type")]
    pub property_type: PropertyType,
    pub bedrooms: u32,
    pub bathrooms: f64,
    pub sqft: u32,
    #[serde(default)]
    pub amenities: Vec<String>,
    pub description: String,
    pub image_url: String,
}

/// Which collection an uploaded document belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DocumentCategory {
    /// Raw listing material, usable as an unstructured inventory source
    Listing,
    /// Articles and guides for grounded question answering
    Resource,
}

impl DocumentCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentCategory::Listing => "Listing",
            DocumentCategory::Resource => "Resource",
        }
    }
}

/// Uploaded text document. Content is immutable after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredDocument {
    pub id: String,
    pub name: String,
    pub content: String,
    #[serde(rename = "type")]
    pub doc_type: String,
    pub size: String,
    pub upload_date: NaiveDate,
    pub category: DocumentCategory,
}

impl StoredDocument {
    /// Build a document from an upload, deriving its type and display size
    pub fn from_upload(
        id: String,
        name: String,
        content: String,
        size_bytes: u64,
        category: DocumentCategory,
        uploaded: NaiveDate,
    ) -> Self {
        let doc_type = file_type(&name);
        let size = format_size(size_bytes, category);
        Self {
            id,
            name,
            content,
            doc_type,
            size,
            upload_date: uploaded,
            category,
        }
    }
}

/// Upper-cased extension after the last dot, or `UNKNOWN`
pub fn file_type(name: &str) -> String {
    match name.rsplit_once('.') {
        Some((_, ext)) if !ext.is_empty() => ext.to_uppercase(),
        _ => "UNKNOWN".to_string(),
    }
}

/// Listings are shown in megabytes, resources in kilobytes
pub fn format_size(size_bytes: u64, category: DocumentCategory) -> String {
    let bytes = size_bytes as f64;
    match category {
        DocumentCategory::Listing => format!("{:.1} MB", bytes / 1024.0 / 1024.0),
        DocumentCategory::Resource => format!("{:.1} KB", bytes / 1024.0),
    }
}

/// One ranked candidate from the matching service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    /// Known property id, or a free-text name when the source was a document
    pub property_id: String,
    pub match_score: f64,
    pub why_it_matches: String,
    pub key_selling_points: Vec<String>,
    pub suggested_pitch: String,
}

impl Recommendation {
    pub fn score_in_range(&self) -> bool {
        (0.0..=100.0).contains(&self.match_score)
    }

    /// Find the referenced property by id, falling back to a case-insensitive name match
    pub fn resolve<'a>(&self, inventory: &'a [Property]) -> Option<&'a Property> {
        let reference = self.property_id.trim();
        inventory
            .iter()
            .find(|p| p.id == reference)
            .or_else(|| {
                inventory
                    .iter()
                    .find(|p| p.name.trim().eq_ignore_ascii_case(reference))
            })
    }
}

/// Validated output of the matching service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationResponse {
    pub summary: String,
    pub recommendations: Vec<Recommendation>,
}
