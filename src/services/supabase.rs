use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde_json::{json, Value};
use std::time::Duration;

use crate::services::store::{Collection, RowStore, StoreError};

const SETTINGS_TABLE: &str = "settings";

/// Supabase (PostgREST) row-store client
///
/// Handles all communication with the hosted store:
/// - Listing collections newest first
/// - Upserting rows by identity
/// - Reading and writing the key/value settings table
pub struct SupabaseClient {
    base_url: String,
    api_key: String,
    client: Client,
}

impl SupabaseClient {
    /// Create a new store client
    pub fn new(base_url: String, api_key: String, timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url,
            api_key,
            client,
        }
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url.trim_end_matches('/'), table)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
    }

    async fn check(response: Response, action: &str) -> Result<Response, StoreError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(StoreError::Unauthorized);
        }

        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unable to read body".to_string());
        tracing::error!("Store failed to {}: {} - {}", action, status, body);
        Err(StoreError::ApiError(format!("Failed to {}: {}", action, status)))
    }

    async fn write(&self, table: &str, conflict_column: Option<&str>, row: &Value) -> Result<(), StoreError> {
        let mut url = self.table_url(table);
        let prefer = match conflict_column {
            Some(column) => {
                url = format!("{}?on_conflict={}", url, column);
                "resolution=merge-duplicates,return=minimal"
            }
            None => "return=minimal",
        };

        let response = self
            .authorized(self.client.post(&url))
            .header("Prefer", prefer)
            .json(row)
            .send()
            .await?;

        Self::check(response, &format!("write {}", table)).await?;
        Ok(())
    }
}

#[async_trait]
impl RowStore for SupabaseClient {
    async fn list(&self, collection: Collection) -> Result<Vec<Value>, StoreError> {
        let url = format!(
            "{}?select=*&order=created_at.desc",
            self.table_url(collection.table())
        );

        tracing::debug!("Listing rows from: {}", url);

        let response = self.authorized(self.client.get(&url)).send().await?;
        let response = Self::check(response, &format!("list {}", collection.table())).await?;

        let json: Value = response.json().await?;
        match json {
            Value::Array(rows) => Ok(rows),
            _ => Err(StoreError::InvalidResponse("Expected an array of rows".into())),
        }
    }

    async fn upsert(&self, collection: Collection, row: Value) -> Result<(), StoreError> {
        let has_identity = row.get("id").is_some_and(|id| !id.is_null());
        let conflict = has_identity.then_some("id");
        self.write(collection.table(), conflict, &row).await?;

        tracing::debug!(
            "{} row in {}",
            if has_identity { "Upserted" } else { "Inserted" },
            collection.table()
        );
        Ok(())
    }

    async fn delete(&self, collection: Collection, id: &str) -> Result<(), StoreError> {
        let url = format!(
            "{}?id=eq.{}",
            self.table_url(collection.table()),
            urlencoding::encode(id)
        );

        let response = self.authorized(self.client.delete(&url)).send().await?;
        Self::check(response, &format!("delete from {}", collection.table())).await?;

        tracing::debug!("Deleted {} from {}", id, collection.table());
        Ok(())
    }

    async fn get_setting(&self, key: &str) -> Result<Option<String>, StoreError> {
        let url = format!(
            "{}?select=value&key=eq.{}&limit=1",
            self.table_url(SETTINGS_TABLE),
            urlencoding::encode(key)
        );

        let response = self.authorized(self.client.get(&url)).send().await?;
        let response = Self::check(response, "read setting").await?;

        let json: Value = response.json().await?;
        let rows = json
            .as_array()
            .ok_or_else(|| StoreError::InvalidResponse("Expected an array of settings".into()))?;

        Ok(rows.first().and_then(|row| match row.get("value") {
            Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
            Some(Value::Null) | Some(Value::String(_)) | None => None,
            Some(other) => Some(other.to_string()),
        }))
    }

    async fn set_setting(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let row = json!({ "key": key, "value": value });
        self.write(SETTINGS_TABLE, Some("key"), &row).await
    }
}
