use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;
use thiserror::Error;

use crate::core::prompt::{self, InventorySource, MatchingRequest};
use crate::models::{LeadCriteria, RecommendationResponse, StoredDocument};

pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_MATCHING_MODEL: &str = "gemini-3-pro-preview";
pub const DEFAULT_ANSWERING_MODEL: &str = "gemini-3-flash-preview";

/// Matching failures; every variant renders a message fit to show a user
#[derive(Debug, Error)]
pub enum MatchingError {
    #[error("No Gemini API key is configured; set GEMINI_API_KEY to enable AI matching")]
    MissingCredential,

    #[error("The matching service returned an empty response")]
    EmptyResponse,

    #[error("The matching service returned a response that does not fit the expected format: {0}")]
    MalformedResponse(String),

    #[error("The matching service rejected the request ({status}): {message}")]
    ApiError { status: u16, message: String },

    #[error("Could not reach the matching service: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("Could not serialize the inventory: {0}")]
    SerializationError(#[from] serde_json::Error),
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    #[serde(default)]
    text: Option<String>,
}

impl GenerateContentResponse {
    /// Concatenated text of the first candidate
    fn text(&self) -> String {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|content| {
                content
                    .parts
                    .iter()
                    .filter_map(|p| p.text.as_deref())
                    .collect::<String>()
            })
            .unwrap_or_default()
    }
}

/// Generative service client
///
/// Two capabilities share the client:
/// - schema-constrained property recommendations for a buyer profile
/// - free-text answers grounded in a set of resource documents
pub struct GeminiClient {
    base_url: String,
    api_key: Option<String>,
    matching_model: String,
    answering_model: String,
    client: Client,
}

impl GeminiClient {
    pub fn new(
        base_url: String,
        api_key: Option<String>,
        matching_model: String,
        answering_model: String,
        timeout: Duration,
    ) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url,
            api_key: api_key.filter(|key| !key.trim().is_empty()),
            matching_model,
            answering_model,
            client,
        }
    }

    pub fn has_credential(&self) -> bool {
        self.api_key.is_some()
    }

    /// Rank inventory against a buyer profile
    pub async fn recommend(
        &self,
        criteria: &LeadCriteria,
        source: InventorySource<'_>,
    ) -> Result<RecommendationResponse, MatchingError> {
        let request = prompt::recommendation_request(criteria, source)?;
        self.recommend_with(&request).await
    }

    /// Send a prebuilt recommendation request and validate the reply
    pub async fn recommend_with(
        &self,
        request: &MatchingRequest,
    ) -> Result<RecommendationResponse, MatchingError> {
        let text = self.generate(&self.matching_model, request).await?;

        let response: RecommendationResponse = serde_json::from_str(&text).map_err(|e| {
            tracing::error!("Matching response failed validation: {}", e);
            MatchingError::MalformedResponse(e.to_string())
        })?;

        for rec in response.recommendations.iter().filter(|r| !r.score_in_range()) {
            tracing::warn!(
                "Matching service scored {} at {}, outside 0-100",
                rec.property_id,
                rec.match_score
            );
        }

        tracing::info!(
            "Matching service returned {} recommendations",
            response.recommendations.len()
        );
        Ok(response)
    }

    /// Answer a question using only the supplied documents
    pub async fn ask(
        &self,
        documents: &[StoredDocument],
        question: &str,
    ) -> Result<String, MatchingError> {
        let request = prompt::resource_question_request(documents, question);
        let answer = self.generate(&self.answering_model, &request).await?;
        tracing::debug!("Answered question from {} documents", documents.len());
        Ok(answer)
    }

    fn request_body(request: &MatchingRequest) -> Value {
        let mut generation_config = serde_json::Map::new();
        if let Some(schema) = &request.response_schema {
            generation_config.insert("responseMimeType".into(), json!("application/json"));
            generation_config.insert("responseSchema".into(), schema.clone());
        }
        if let Some(temperature) = request.temperature {
            generation_config.insert("temperature".into(), json!(temperature));
        }

        json!({
            "systemInstruction": { "parts": [{ "text": request.system_instruction }] },
            "contents": [{ "role": "user", "parts": [{ "text": request.prompt }] }],
            "generationConfig": generation_config,
        })
    }

    /// Call `generateContent` and return the non-empty text of the reply
    async fn generate(&self, model: &str, request: &MatchingRequest) -> Result<String, MatchingError> {
        let api_key = self.api_key.as_deref().ok_or(MatchingError::MissingCredential)?;

        let url = format!(
            "{}/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            model
        );

        tracing::debug!("Calling generative model {}", model);

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", api_key)
            .json(&Self::request_body(request))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read body".to_string());
            tracing::error!("Generative model {} failed: {} - {}", model, status, message);
            return Err(MatchingError::ApiError {
                status: status.as_u16(),
                message,
            });
        }

        let body: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| MatchingError::MalformedResponse(e.to_string()))?;

        let text = body.text();
        if text.trim().is_empty() {
            tracing::error!("Generative model {} returned no text", model);
            return Err(MatchingError::EmptyResponse);
        }
        Ok(text)
    }
}
