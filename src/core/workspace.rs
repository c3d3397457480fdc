//! Owned in-memory view of leads, inventory and documents.
//!
//! Every mutation goes through [`Workspace::apply`] with an explicit [`Intent`]
//! and publishes a fresh immutable [`Snapshot`]. Readers hold an `Arc` to the
//! snapshot they were given; it never changes under them.

use std::sync::Arc;
use tokio::sync::watch;

use crate::models::{DocumentCategory, Lead, Property, StoredDocument};

/// Immutable view published after every mutation
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    /// Incremented on every applied intent
    pub version: u64,
    pub leads: Vec<Lead>,
    pub properties: Vec<Property>,
    /// Documents usable as an unstructured inventory source
    pub listings: Vec<StoredDocument>,
    /// Documents used for grounded question answering
    pub resources: Vec<StoredDocument>,
    pub cloud_connected: bool,
}

impl Snapshot {
    pub fn lead(&self, id: &str) -> Option<&Lead> {
        self.leads.iter().find(|l| l.id == id)
    }

    pub fn property(&self, id: &str) -> Option<&Property> {
        self.properties.iter().find(|p| p.id == id)
    }

    /// Look a document up in both categories
    pub fn document(&self, id: &str) -> Option<&StoredDocument> {
        self.listings
            .iter()
            .chain(self.resources.iter())
            .find(|d| d.id == id)
    }

    fn documents_mut(&mut self, category: DocumentCategory) -> &mut Vec<StoredDocument> {
        match category {
            DocumentCategory::Listing => &mut self.listings,
            DocumentCategory::Resource => &mut self.resources,
        }
    }
}

/// Either a replacement value or a transform of the current one
pub enum Update<T> {
    Set(T),
    Apply(Box<dyn FnOnce(T) -> T + Send>),
}

impl<T> Update<T> {
    pub fn apply_fn(f: impl FnOnce(T) -> T + Send + 'static) -> Self {
        Update::Apply(Box::new(f))
    }

    /// Resolve against the current value
    pub fn resolve(self, current: T) -> T {
        match self {
            Update::Set(value) => value,
            Update::Apply(f) => f(current),
        }
    }
}

/// Named mutation emitted by the caller that made the change
pub enum Intent {
    PropertyAdded(Property),
    PropertyRemoved(String),
    DocumentAdded(StoredDocument),
    DocumentRemoved(String),
    LeadsReplaced(Vec<Lead>),
    Leads(Update<Vec<Lead>>),
    Properties(Update<Vec<Property>>),
    /// Full state from the startup store load
    Loaded {
        leads: Vec<Lead>,
        properties: Vec<Property>,
        documents: Vec<StoredDocument>,
        cloud_connected: bool,
    },
}

impl Intent {
    fn name(&self) -> &'static str {
        match self {
            Intent::PropertyAdded(_) => "property_added",
            Intent::PropertyRemoved(_) => "property_removed",
            Intent::DocumentAdded(_) => "document_added",
            Intent::DocumentRemoved(_) => "document_removed",
            Intent::LeadsReplaced(_) => "leads_replaced",
            Intent::Leads(_) => "leads_updated",
            Intent::Properties(_) => "properties_updated",
            Intent::Loaded { .. } => "loaded",
        }
    }

    fn apply_to(self, snapshot: &mut Snapshot) {
        match self {
            Intent::PropertyAdded(property) => {
                snapshot.properties.retain(|p| p.id != property.id);
                snapshot.properties.insert(0, property);
            }
            Intent::PropertyRemoved(id) => snapshot.properties.retain(|p| p.id != id),
            Intent::DocumentAdded(document) => {
                let documents = snapshot.documents_mut(document.category);
                documents.retain(|d| d.id != document.id);
                documents.insert(0, document);
            }
            Intent::DocumentRemoved(id) => {
                snapshot.listings.retain(|d| d.id != id);
                snapshot.resources.retain(|d| d.id != id);
            }
            Intent::LeadsReplaced(leads) => snapshot.leads = leads,
            Intent::Leads(update) => {
                snapshot.leads = update.resolve(std::mem::take(&mut snapshot.leads));
            }
            Intent::Properties(update) => {
                snapshot.properties = update.resolve(std::mem::take(&mut snapshot.properties));
            }
            Intent::Loaded {
                leads,
                properties,
                documents,
                cloud_connected,
            } => {
                let (listings, resources): (Vec<_>, Vec<_>) = documents
                    .into_iter()
                    .partition(|d| d.category == DocumentCategory::Listing);
                snapshot.leads = leads;
                snapshot.properties = properties;
                snapshot.listings = listings;
                snapshot.resources = resources;
                snapshot.cloud_connected = cloud_connected;
            }
        }
    }
}

/// Single owner of the mutable view
pub struct Workspace {
    tx: watch::Sender<Arc<Snapshot>>,
}

impl Workspace {
    pub fn new(initial: Snapshot) -> Self {
        let (tx, _rx) = watch::channel(Arc::new(initial));
        Self { tx }
    }

    /// Current snapshot
    pub fn snapshot(&self) -> Arc<Snapshot> {
        self.tx.borrow().clone()
    }

    /// Receive every snapshot published from now on
    pub fn subscribe(&self) -> watch::Receiver<Arc<Snapshot>> {
        self.tx.subscribe()
    }

    /// Apply one intent atomically and return the snapshot it produced
    pub fn apply(&self, intent: Intent) -> Arc<Snapshot> {
        let name = intent.name();
        let mut published = None;
        self.tx.send_modify(|current| {
            let mut next = Snapshot::clone(current);
            intent.apply_to(&mut next);
            next.version += 1;
            *current = Arc::new(next);
            published = Some(Arc::clone(current));
        });

        let snapshot = published.unwrap_or_else(|| self.snapshot());
        tracing::debug!("Applied {} (version {})", name, snapshot.version);
        snapshot
    }

    pub fn update_leads(&self, update: Update<Vec<Lead>>) -> Arc<Snapshot> {
        self.apply(Intent::Leads(update))
    }

    pub fn update_properties(&self, update: Update<Vec<Property>>) -> Arc<Snapshot> {
        self.apply(Intent::Properties(update))
    }
}

impl Default for Workspace {
    fn default() -> Self {
        Self::new(Snapshot::default())
    }
}
