use chrono::Utc;
use std::sync::Arc;

use crate::core::workspace::{Intent, Snapshot, Workspace};
use crate::models::defaults::{default_leads, default_properties};
use crate::models::{Lead, NewPropertyRequest, Property, StoredDocument, UploadDocumentRequest};
use crate::services::store::{Persistence, Record};

/// Inventory and document handlers
///
/// Each handler emits its intent on the workspace first, then writes the
/// change through to the row-store. Store failures are logged and dropped;
/// the in-memory view stays authoritative for the session.
#[derive(Clone)]
pub struct Library {
    workspace: Arc<Workspace>,
    persistence: Persistence,
}

impl Library {
    pub fn new(workspace: Arc<Workspace>, persistence: Persistence) -> Self {
        Self {
            workspace,
            persistence,
        }
    }

    pub fn workspace(&self) -> &Arc<Workspace> {
        &self.workspace
    }

    /// Load all collections from the store
    ///
    /// A failed list falls back per collection (defaults for leads and
    /// properties, nothing for documents) and marks the view disconnected.
    pub async fn load(&self) -> Arc<Snapshot> {
        let mut connected = self.persistence.is_durable();

        let properties = match self.persistence.list::<Property>().await {
            Ok(rows) if rows.is_empty() => default_properties(),
            Ok(rows) => rows,
            Err(e) => {
                tracing::warn!("Failed to load properties, using defaults: {}", e);
                connected = false;
                default_properties()
            }
        };

        let leads = match self.persistence.list::<Lead>().await {
            Ok(rows) if rows.is_empty() => default_leads(),
            Ok(rows) => rows,
            Err(e) => {
                tracing::warn!("Failed to load leads, using defaults: {}", e);
                connected = false;
                default_leads()
            }
        };

        let documents = match self.persistence.list::<StoredDocument>().await {
            Ok(rows) => rows,
            Err(e) => {
                tracing::warn!("Failed to load documents: {}", e);
                connected = false;
                Vec::new()
            }
        };

        tracing::info!(
            "Loaded {} leads, {} properties, {} documents (cloud connected: {})",
            leads.len(),
            properties.len(),
            documents.len(),
            connected
        );

        self.workspace.apply(Intent::Loaded {
            leads,
            properties,
            documents,
            cloud_connected: connected,
        })
    }

    /// Add a manually entered property
    pub async fn add_property(&self, request: NewPropertyRequest) -> Property {
        let id = uuid::Uuid::new_v4().to_string();
        let image_url = request
            .image_url
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| format!("https://picsum.photos/seed/{}/800/600", id));

        let property = Property {
            id,
            name: request.name,
            price: request.price,
            location: request.location,
            property_type: request.property_type,
            bedrooms: request.bedrooms,
            bathrooms: request.bathrooms,
            sqft: request.sqft,
            amenities: request.amenities,
            description: request.description,
            image_url,
        };

        self.workspace.apply(Intent::PropertyAdded(property.clone()));
        self.write_through(&property).await;
        property
    }

    /// Remove a property; `false` when the id is unknown
    pub async fn remove_property(&self, id: &str) -> bool {
        if self.workspace.snapshot().property(id).is_none() {
            return false;
        }
        self.workspace.apply(Intent::PropertyRemoved(id.to_string()));
        self.delete_through::<Property>(id).await;
        true
    }

    /// Store an uploaded document in its category
    pub async fn add_document(&self, request: UploadDocumentRequest) -> StoredDocument {
        let size_bytes = request
            .size_bytes
            .unwrap_or(request.content.len() as u64);
        let document = StoredDocument::from_upload(
            uuid::Uuid::new_v4().to_string(),
            request.name,
            request.content,
            size_bytes,
            request.category,
            Utc::now().date_naive(),
        );

        self.workspace.apply(Intent::DocumentAdded(document.clone()));
        self.write_through(&document).await;
        document
    }

    /// Remove a document from either category; `false` when the id is unknown
    pub async fn remove_document(&self, id: &str) -> bool {
        if self.workspace.snapshot().document(id).is_none() {
            return false;
        }
        self.workspace.apply(Intent::DocumentRemoved(id.to_string()));
        self.delete_through::<StoredDocument>(id).await;
        true
    }

    async fn write_through<R: Record>(&self, record: &R) {
        if let Err(e) = self.persistence.upsert(record).await {
            tracing::warn!(
                "Failed to persist {} into {}: {}",
                record.id(),
                R::COLLECTION.table(),
                e
            );
        }
    }

    async fn delete_through<R: Record>(&self, id: &str) {
        if let Err(e) = self.persistence.delete::<R>(id).await {
            tracing::warn!(
                "Failed to delete {} from {}: {}",
                id,
                R::COLLECTION.table(),
                e
            );
        }
    }
}
