//! Persistence adapter over a remote row-store.
//!
//! The store speaks snake_case rows (`image_url`, `last_contacted`, ...) while the
//! in-memory model is camelCase. Translation lives in the private `*Row` types
//! and goes both ways.

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;

use crate::models::{
    DocumentCategory, Lead, LeadCriteria, LeadStatus, Property, PropertyType, StoredDocument,
};

/// Settings key holding the active sheet id
pub const SHEET_ID_SETTING: &str = "google_sheet_id";

/// Errors that can occur when talking to the row-store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("Store returned error: {0}")]
    ApiError(String),

    #[error("Unauthorized: invalid store API key")]
    Unauthorized,

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

/// Record collections held by the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Properties,
    Leads,
    Documents,
}

impl Collection {
    pub fn table(&self) -> &'static str {
        match self {
            Collection::Properties => "properties",
            Collection::Leads => "leads",
            Collection::Documents => "documents",
        }
    }
}

/// Raw row access. Rows are JSON objects in the store's column naming.
#[async_trait]
pub trait RowStore: Send + Sync {
    /// All rows, newest first by creation time
    async fn list(&self, collection: Collection) -> Result<Vec<Value>, StoreError>;

    /// Insert when the row has no `id`, otherwise replace by identity
    async fn upsert(&self, collection: Collection, row: Value) -> Result<(), StoreError>;

    async fn delete(&self, collection: Collection, id: &str) -> Result<(), StoreError>;

    async fn get_setting(&self, key: &str) -> Result<Option<String>, StoreError>;

    async fn set_setting(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Whether writes survive a restart
    fn is_durable(&self) -> bool {
        true
    }
}

/// A domain type stored in one collection
pub trait Record: Sized + Send + Sync {
    const COLLECTION: Collection;

    fn id(&self) -> &str;

    /// Store row; without identity the store assigns one on insert
    fn to_row(&self, with_identity: bool) -> Result<Value, StoreError>;

    fn from_row(row: Value) -> Result<Self, StoreError>;
}

/// Accept text or numeric primary keys
fn id_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(other) => Err(serde::de::Error::custom(format!("unsupported id: {}", other))),
    }
}

fn required_id(id: Option<String>, table: &str) -> Result<String, StoreError> {
    id.ok_or_else(|| StoreError::InvalidResponse(format!("{} row without id", table)))
}

#[derive(Debug, Serialize, Deserialize)]
struct PropertyRow {
    #[serde(default, deserialize_with = "id_string", skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    name: String,
    price: f64,
    #[serde(default)]
    location: String,
    #[serde(rename = "type")]
    property_type: PropertyType,
    #[serde(default)]
    bedrooms: u32,
    #[serde(default)]
    bathrooms: f64,
    #[serde(default)]
    sqft: u32,
    #[serde(default)]
    amenities: Vec<String>,
    #[serde(default)]
    description: String,
    #[serde(default)]
    image_url: String,
}

impl Record for Property {
    const COLLECTION: Collection = Collection::Properties;

    fn id(&self) -> &str {
        &self.id
    }

    fn to_row(&self, with_identity: bool) -> Result<Value, StoreError> {
        let row = PropertyRow {
            id: with_identity.then(|| self.id.clone()),
            name: self.name.clone(),
            price: self.price,
            location: self.location.clone(),
            property_type: self.property_type,
            bedrooms: self.bedrooms,
            bathrooms: self.bathrooms,
            sqft: self.sqft,
            amenities: self.amenities.clone(),
            description: self.description.clone(),
            image_url: self.image_url.clone(),
        };
        Ok(serde_json::to_value(row)?)
    }

    fn from_row(row: Value) -> Result<Self, StoreError> {
        let row: PropertyRow = serde_json::from_value(row)?;
        Ok(Property {
            id: required_id(row.id, Self::COLLECTION.table())?,
            name: row.name,
            price: row.price,
            location: row.location,
            property_type: row.property_type,
            bedrooms: row.bedrooms,
            bathrooms: row.bathrooms,
            sqft: row.sqft,
            amenities: row.amenities,
            description: row.description,
            image_url: row.image_url,
        })
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct LeadRow {
    #[serde(default, deserialize_with = "id_string", skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    name: String,
    #[serde(default)]
    email: String,
    #[serde(default)]
    status: String,
    #[serde(default)]
    last_contacted: Option<NaiveDate>,
    /// JSON column; some clients hand it back as an encoded string
    #[serde(default)]
    criteria: Value,
}

impl Record for Lead {
    const COLLECTION: Collection = Collection::Leads;

    fn id(&self) -> &str {
        &self.id
    }

    fn to_row(&self, with_identity: bool) -> Result<Value, StoreError> {
        let row = LeadRow {
            id: with_identity.then(|| self.id.clone()),
            name: self.name.clone(),
            email: self.email.clone(),
            status: self.status.as_str().to_string(),
            last_contacted: Some(self.last_contacted),
            criteria: serde_json::to_value(&self.criteria)?,
        };
        Ok(serde_json::to_value(row)?)
    }

    fn from_row(row: Value) -> Result<Self, StoreError> {
        let row: LeadRow = serde_json::from_value(row)?;
        let criteria: LeadCriteria = match row.criteria {
            Value::Null => LeadCriteria::default(),
            Value::String(encoded) => serde_json::from_str(&encoded)?,
            other => serde_json::from_value(other)?,
        };
        Ok(Lead {
            id: required_id(row.id, Self::COLLECTION.table())?,
            name: row.name,
            email: row.email,
            status: LeadStatus::parse(&row.status).unwrap_or_default(),
            last_contacted: row
                .last_contacted
                .unwrap_or_else(|| Utc::now().date_naive()),
            criteria,
        })
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct DocumentRow {
    #[serde(default, deserialize_with = "id_string", skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    name: String,
    #[serde(default)]
    content: String,
    #[serde(default)]
    file_type: String,
    #[serde(default)]
    file_size: String,
    upload_date: NaiveDate,
    category: DocumentCategory,
}

impl Record for StoredDocument {
    const COLLECTION: Collection = Collection::Documents;

    fn id(&self) -> &str {
        &self.id
    }

    fn to_row(&self, with_identity: bool) -> Result<Value, StoreError> {
        let row = DocumentRow {
            id: with_identity.then(|| self.id.clone()),
            name: self.name.clone(),
            content: self.content.clone(),
            file_type: self.doc_type.clone(),
            file_size: self.size.clone(),
            upload_date: self.upload_date,
            category: self.category,
        };
        Ok(serde_json::to_value(row)?)
    }

    fn from_row(row: Value) -> Result<Self, StoreError> {
        let row: DocumentRow = serde_json::from_value(row)?;
        Ok(StoredDocument {
            id: required_id(row.id, Self::COLLECTION.table())?,
            name: row.name,
            content: row.content,
            doc_type: row.file_type,
            size: row.file_size,
            upload_date: row.upload_date,
            category: row.category,
        })
    }
}

/// Typed access to a [`RowStore`]
#[derive(Clone)]
pub struct Persistence {
    store: Arc<dyn RowStore>,
}

impl Persistence {
    pub fn new(store: Arc<dyn RowStore>) -> Self {
        Self { store }
    }

    pub fn is_durable(&self) -> bool {
        self.store.is_durable()
    }

    /// List records; rows that fail translation are skipped
    pub async fn list<R: Record>(&self) -> Result<Vec<R>, StoreError> {
        let rows = self.store.list(R::COLLECTION).await?;
        let total = rows.len();

        let records: Vec<R> = rows
            .into_iter()
            .filter_map(|row| match R::from_row(row) {
                Ok(record) => Some(record),
                Err(e) => {
                    tracing::warn!("Skipping malformed {} row: {}", R::COLLECTION.table(), e);
                    None
                }
            })
            .collect();

        tracing::debug!(
            "Loaded {} of {} {} rows",
            records.len(),
            total,
            R::COLLECTION.table()
        );
        Ok(records)
    }

    /// Insert as a new row, letting the store assign the identity
    pub async fn insert<R: Record>(&self, record: &R) -> Result<(), StoreError> {
        let row = record.to_row(false)?;
        self.store.upsert(R::COLLECTION, row).await
    }

    /// Replace by identity, inserting if absent
    pub async fn upsert<R: Record>(&self, record: &R) -> Result<(), StoreError> {
        let row = record.to_row(true)?;
        self.store.upsert(R::COLLECTION, row).await
    }

    pub async fn delete<R: Record>(&self, id: &str) -> Result<(), StoreError> {
        self.store.delete(R::COLLECTION, id).await
    }

    pub async fn setting(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.store.get_setting(key).await
    }

    pub async fn set_setting(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.store.set_setting(key, value).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::defaults::{default_leads, default_properties};
    use serde_json::json;

    #[test]
    fn test_property_row_uses_store_column_names() {
        let property = default_properties().remove(0);
        let row = property.to_row(true).unwrap();

        assert_eq!(row["image_url"], json!(property.image_url));
        assert_eq!(row["type"], "Villa");
        assert!(row.get("imageUrl").is_none());
        assert_eq!(Property::from_row(row).unwrap(), property);
    }

    #[test]
    fn test_row_without_identity_omits_id() {
        let lead = default_leads().remove(0);
        let row = lead.to_row(false).unwrap();
        assert!(row.get("id").is_none());
        assert_eq!(row["last_contacted"], "2024-05-20");
        assert_eq!(row["criteria"]["budgetMin"], 1_500_000.0);
    }

    #[test]
    fn test_lead_row_round_trip() {
        let lead = default_leads().remove(1);
        let row = lead.to_row(true).unwrap();
        assert_eq!(Lead::from_row(row).unwrap(), lead);
    }

    #[test]
    fn test_lead_row_accepts_numeric_id_and_encoded_criteria() {
        let row = json!({
            "id": 42,
            "name": "Ana",
            "email": "ana@x.com",
            "status": "converted",
            "last_contacted": "2025-01-02",
            "criteria": "{\"budgetMin\":10,\"budgetMax\":20,\"location\":\"Austin\"}",
            "created_at": "2025-01-02T10:00:00Z"
        });

        let lead = Lead::from_row(row).unwrap();
        assert_eq!(lead.id, "42");
        assert_eq!(lead.status, LeadStatus::Converted);
        assert_eq!(lead.criteria.budget_max, 20.0);
        assert_eq!(lead.criteria.preferred_type, "House");
    }

    #[test]
    fn test_document_row_round_trip() {
        let doc = StoredDocument::from_upload(
            "d1".into(),
            "listings.csv".into(),
            "Harbor House".into(),
            2048,
            DocumentCategory::Listing,
            NaiveDate::from_ymd_opt(2026, 3, 4).unwrap(),
        );
        let row = doc.to_row(true).unwrap();
        assert_eq!(row["file_type"], "CSV");
        assert_eq!(row["file_size"], "0.0 MB");
        assert_eq!(row["category"], "Listing");
        assert_eq!(StoredDocument::from_row(row).unwrap(), doc);
    }

    #[test]
    fn test_row_without_id_is_rejected_on_read() {
        let row = json!({ "name": "x", "price": 1, "type": "House" });
        assert!(Property::from_row(row).is_err());
    }
}
