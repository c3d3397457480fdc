//! Builds the requests sent to the generative matching service.
//!
//! A recommendation request restates the buyer profile, embeds the inventory
//! (pretty JSON for structured records, verbatim for a document) and carries a
//! fixed output schema. The inventory mode is chosen by the caller.

use serde_json::{json, Value};

use crate::models::{LeadCriteria, Property, StoredDocument};

pub const MATCHING_SYSTEM_INSTRUCTION: &str = "You are an expert real estate advisor for EstateFlow. \
Compare the lead's criteria against the property inventory you are given. \
Return the three strongest matches with specific reasoning and a tailored sales pitch for each. \
Stay professional and follow the requested output format exactly.";

pub const RESOURCE_SYSTEM_INSTRUCTION: &str =
    "You are a real estate expert who answers strictly from the supplied documentation.";

/// Sampling temperature for grounded question answering
pub const RESOURCE_TEMPERATURE: f32 = 0.2;

/// Inventory handed to the matching service
#[derive(Debug, Clone, Copy)]
pub enum InventorySource<'a> {
    /// Typed inventory records
    Structured(&'a [Property]),
    /// Raw text of an uploaded listing document; may be empty
    Document(&'a str),
}

impl InventorySource<'_> {
    pub fn is_structured(&self) -> bool {
        matches!(self, InventorySource::Structured(_))
    }
}

/// A self-contained request for the generative service
#[derive(Debug, Clone, PartialEq)]
pub struct MatchingRequest {
    pub system_instruction: String,
    pub prompt: String,
    /// Output schema; `None` for free-text answers
    pub response_schema: Option<Value>,
    pub temperature: Option<f32>,
}

/// Build the recommendation request for one buyer profile
pub fn recommendation_request(
    criteria: &LeadCriteria,
    source: InventorySource<'_>,
) -> Result<MatchingRequest, serde_json::Error> {
    let inventory = match source {
        InventorySource::Structured(properties) => serde_json::to_string_pretty(properties)?,
        InventorySource::Document(text) => text.to_string(),
    };

    let prompt = format!(
        "Analyze the following lead criteria against the property inventory below.\n\
         \n\
         Lead criteria:\n\
         - Budget: ${} to ${}\n\
         - Location preference: {}\n\
         - Min beds/baths: {}/{}\n\
         - Preferred type: {}\n\
         - Lifestyle: {}\n\
         - Essential features: {}\n\
         \n\
         Property inventory (source content):\n\
         {}\n\
         \n\
         Instructions:\n\
         1. If the inventory is a raw document, extract the property details from it first.\n\
         2. Recommend exactly the top 3 best matching properties found in the source.\n\
         3. If nothing in the source is even a reasonable match, explain why in the summary.\n\
         \n\
         Return your analysis and recommendations as JSON.",
        criteria.budget_min,
        criteria.budget_max,
        criteria.location,
        criteria.min_bedrooms,
        criteria.min_bathrooms,
        criteria.preferred_type,
        criteria.lifestyle,
        criteria.essential_features.join(", "),
        inventory,
    );

    Ok(MatchingRequest {
        system_instruction: MATCHING_SYSTEM_INSTRUCTION.to_string(),
        prompt,
        response_schema: Some(recommendation_schema()),
        temperature: None,
    })
}

/// Build a question grounded only in `documents`
pub fn resource_question_request(documents: &[StoredDocument], question: &str) -> MatchingRequest {
    let knowledge_base = documents
        .iter()
        .map(|doc| format!("--- DOCUMENT: {} ---\n{}", doc.name, doc.content))
        .collect::<Vec<_>>()
        .join("\n\n");

    let prompt = format!(
        "You are a professional real estate advisor. Below is a knowledge base of articles and guides.\n\
         Answer the user's question using ONLY the information in these documents.\n\
         If the answer is not in the documents, say that the provided resources do not contain enough information.\n\
         Be concise and professional, and name the documents you cite.\n\
         \n\
         KNOWLEDGE BASE:\n\
         {}\n\
         \n\
         USER QUESTION:\n\
         {}",
        knowledge_base, question
    );

    MatchingRequest {
        system_instruction: RESOURCE_SYSTEM_INSTRUCTION.to_string(),
        prompt,
        response_schema: None,
        temperature: Some(RESOURCE_TEMPERATURE),
    }
}

/// Output schema the service must conform to
pub fn recommendation_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "recommendations": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "propertyId": {
                            "type": "STRING",
                            "description": "Name or ID of the property"
                        },
                        "matchScore": {
                            "type": "NUMBER",
                            "description": "Match percentage 0-100",
                            "minimum": 0,
                            "maximum": 100
                        },
                        "whyItMatches": { "type": "STRING" },
                        "keySellingPoints": {
                            "type": "ARRAY",
                            "items": { "type": "STRING" }
                        },
                        "suggestedPitch": { "type": "STRING" }
                    },
                    "required": [
                        "propertyId",
                        "matchScore",
                        "whyItMatches",
                        "keySellingPoints",
                        "suggestedPitch"
                    ]
                }
            },
            "summary": {
                "type": "STRING",
                "description": "Executive summary of the matching process"
            }
        },
        "required": ["recommendations", "summary"]
    })
}
