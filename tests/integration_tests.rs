// Integration tests for EstateFlow sync

use async_trait::async_trait;
use estateflow_sync::core::{Library, Reconciler, StartupSync, SyncError, Workspace};
use estateflow_sync::core::workspace::Snapshot;
use estateflow_sync::models::defaults::{default_leads, default_properties};
use estateflow_sync::models::{Lead, LeadStatus, Property};
use estateflow_sync::services::{
    Collection, LocalCache, MemoryStore, Persistence, RowStore, SheetSource, SheetsClient,
    SheetsError, StoreError, SupabaseClient, SHEET_ID_CACHE_KEY, SHEET_ID_SETTING,
};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio::sync::Notify;
use tokio_test::{assert_err, assert_ok};

const SHEET_CSV: &str = "Name,Email,Status,Min,Max,Location,Beds,Baths,Type,Lifestyle,Features\n\
John,j@x.com,Qualified,500000,900000,Austin,3,2,House,Quiet,\"Pool, Garage\"\n\
Ana,ana@x.com,contacted,abc,750000,Denver,2,1.5,Condo,,\n";

struct Harness {
    store: Arc<MemoryStore>,
    persistence: Persistence,
    cache: Arc<LocalCache>,
    workspace: Arc<Workspace>,
    _dir: TempDir,
}

impl Harness {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(MemoryStore::new());
        Self {
            persistence: Persistence::new(store.clone()),
            store,
            cache: Arc::new(LocalCache::new(dir.path().join("cache.toml"), 16)),
            workspace: Arc::new(Workspace::new(Snapshot {
                leads: default_leads(),
                ..Snapshot::default()
            })),
            _dir: dir,
        }
    }

    fn reconciler(&self, source: Arc<dyn SheetSource>) -> Arc<Reconciler> {
        Arc::new(Reconciler::new(
            source,
            self.persistence.clone(),
            self.cache.clone(),
            self.workspace.clone(),
        ))
    }
}

fn sheets_client(server: &mockito::Server) -> Arc<SheetsClient> {
    Arc::new(SheetsClient::new(server.url(), Duration::from_secs(5)))
}

async fn mock_sheet(server: &mut mockito::Server, sheet_id: &str, status: usize, body: &str) -> mockito::Mock {
    server
        .mock("GET", format!("/{}/gviz/tq", sheet_id).as_str())
        .match_query(mockito::Matcher::UrlEncoded("tqx".into(), "out:csv".into()))
        .with_status(status)
        .with_body(body)
        .create_async()
        .await
}

#[tokio::test]
async fn test_interactive_sync_end_to_end() {
    let mut server = mockito::Server::new_async().await;
    let mock = mock_sheet(&mut server, "sheet-1", 200, SHEET_CSV).await;

    let harness = Harness::new();
    let reconciler = harness.reconciler(sheets_client(&server));

    let report = assert_ok!(reconciler.sync_interactive("sheet-1").await);
    mock.assert_async().await;

    assert_eq!(report.leads, 2);
    assert_eq!(report.inserted, 2);
    assert_eq!(report.upserted, 0);
    assert_eq!(report.failed, 0);

    // Published leads keep their synthetic ids
    let snapshot = harness.workspace.snapshot();
    let ids: Vec<_> = snapshot.leads.iter().map(|l| l.id.as_str()).collect();
    assert_eq!(ids, vec!["gs-0", "gs-1"]);
    assert_eq!(snapshot.leads[0].criteria.essential_features, vec!["Pool", "Garage"]);
    assert_eq!(snapshot.leads[1].status, LeadStatus::Contacted);
    assert_eq!(snapshot.leads[1].criteria.budget_min, 0.0);

    // Stored rows get identities assigned by the store
    let stored: Vec<Lead> = harness.persistence.list().await.unwrap();
    assert_eq!(stored.len(), 2);
    assert!(stored.iter().all(|l| !l.id.starts_with("gs-")));

    // The sheet id is remembered in both places
    assert_eq!(
        harness.store.get_setting(SHEET_ID_SETTING).await.unwrap().as_deref(),
        Some("sheet-1")
    );
    assert_eq!(
        harness.cache.get(SHEET_ID_CACHE_KEY).await.unwrap().as_deref(),
        Some("sheet-1")
    );

    let status = reconciler.status();
    assert!(!status.is_syncing);
    assert_eq!(status.sheet_id.as_deref(), Some("sheet-1"));
    assert!(status.last_synced.is_some());
    assert!(status.last_error.is_none());
}

#[tokio::test]
async fn test_ingestion_failure_keeps_prior_state() {
    let mut server = mockito::Server::new_async().await;
    mock_sheet(&mut server, "private", 403, "").await;

    let harness = Harness::new();
    let reconciler = harness.reconciler(sheets_client(&server));

    let err = assert_err!(reconciler.sync_interactive("private").await);
    assert!(matches!(err, SyncError::Ingestion(SheetsError::BadStatus(403))));

    assert_eq!(harness.workspace.snapshot().leads, default_leads());
    assert!(harness.store.is_empty(Collection::Leads));
    assert_eq!(harness.store.get_setting(SHEET_ID_SETTING).await.unwrap(), None);
    assert_eq!(harness.cache.get(SHEET_ID_CACHE_KEY).await.unwrap(), None);

    let status = reconciler.status();
    assert!(!status.is_syncing);
    assert!(status.last_error.is_some());
}

#[tokio::test]
async fn test_silent_sync_swallows_failures() {
    let mut server = mockito::Server::new_async().await;
    mock_sheet(&mut server, "gone", 404, "").await;

    let harness = Harness::new();
    let reconciler = harness.reconciler(sheets_client(&server));

    assert!(reconciler.sync_silent("gone").await.is_none());
    assert!(reconciler.status().last_error.is_none());
}

#[tokio::test]
async fn test_startup_prefers_remote_setting() {
    let mut server = mockito::Server::new_async().await;
    let remote = mock_sheet(&mut server, "remote-id", 200, SHEET_CSV).await;
    let local = server
        .mock("GET", "/local-id/gviz/tq")
        .match_query(mockito::Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let harness = Harness::new();
    harness.store.set_setting(SHEET_ID_SETTING, "remote-id").await.unwrap();
    harness.cache.set(SHEET_ID_CACHE_KEY, "local-id").await.unwrap();

    let reconciler = harness.reconciler(sheets_client(&server));
    let outcome = reconciler.restore().await;

    assert!(matches!(outcome, StartupSync::Remote(Some(ref r)) if r.sheet_id == "remote-id"));
    remote.assert_async().await;
    local.assert_async().await;
    assert_eq!(
        harness.cache.get(SHEET_ID_CACHE_KEY).await.unwrap().as_deref(),
        Some("remote-id")
    );
}

#[tokio::test]
async fn test_startup_copies_remote_id_even_when_sync_fails() {
    let mut server = mockito::Server::new_async().await;
    mock_sheet(&mut server, "remote-id", 500, "").await;

    let harness = Harness::new();
    harness.store.set_setting(SHEET_ID_SETTING, "remote-id").await.unwrap();

    let reconciler = harness.reconciler(sheets_client(&server));
    assert!(matches!(reconciler.restore().await, StartupSync::Remote(None)));
    assert_eq!(
        harness.cache.get(SHEET_ID_CACHE_KEY).await.unwrap().as_deref(),
        Some("remote-id")
    );
}

#[tokio::test]
async fn test_startup_falls_back_to_local_cache() {
    let mut server = mockito::Server::new_async().await;
    mock_sheet(&mut server, "local-id", 404, "").await;

    let harness = Harness::new();
    harness.cache.set(SHEET_ID_CACHE_KEY, "local-id").await.unwrap();

    let reconciler = harness.reconciler(sheets_client(&server));
    let outcome = reconciler.restore().await;

    // Interactive mode surfaces the failure
    assert!(matches!(outcome, StartupSync::Cached(Err(SyncError::Ingestion(_)))));
    assert!(reconciler.status().last_error.is_some());
}

#[tokio::test]
async fn test_startup_without_sheet_keeps_defaults() {
    let server = mockito::Server::new_async().await;
    let harness = Harness::new();

    let reconciler = harness.reconciler(sheets_client(&server));
    assert!(matches!(reconciler.restore().await, StartupSync::Defaults));
    assert_eq!(harness.workspace.snapshot().leads, default_leads());
}

/// Source that parks every fetch until released
#[derive(Default)]
struct GatedSource {
    started: Notify,
    release: Notify,
}

#[async_trait]
impl SheetSource for GatedSource {
    async fn fetch_csv(&self, _sheet_id: &str) -> Result<String, SheetsError> {
        self.started.notify_one();
        self.release.notified().await;
        Ok(SHEET_CSV.to_string())
    }
}

#[tokio::test]
async fn test_second_sync_is_rejected_while_one_is_in_flight() {
    let harness = Harness::new();
    let source = Arc::new(GatedSource::default());
    let reconciler = harness.reconciler(source.clone());

    let first = {
        let reconciler = reconciler.clone();
        tokio::spawn(async move { reconciler.sync_interactive("sheet-1").await })
    };

    source.started.notified().await;
    assert!(reconciler.status().is_syncing);

    let second = reconciler.sync_interactive("sheet-2").await;
    assert!(matches!(second, Err(SyncError::InProgress)));
    assert!(reconciler.sync_silent("sheet-2").await.is_none());

    source.release.notify_one();
    let report = first.await.unwrap().unwrap();
    assert_eq!(report.sheet_id, "sheet-1");
    assert_eq!(harness.store.len(Collection::Leads), 2);

    // The slot is free again
    source.release.notify_one();
    assert_ok!(reconciler.sync_interactive("sheet-1").await);
}

/// Store that is unreachable
struct DownStore;

#[async_trait]
impl RowStore for DownStore {
    async fn list(&self, _collection: Collection) -> Result<Vec<Value>, StoreError> {
        Err(StoreError::ApiError("connection refused".into()))
    }

    async fn upsert(&self, _collection: Collection, _row: Value) -> Result<(), StoreError> {
        Err(StoreError::ApiError("connection refused".into()))
    }

    async fn delete(&self, _collection: Collection, _id: &str) -> Result<(), StoreError> {
        Err(StoreError::ApiError("connection refused".into()))
    }

    async fn get_setting(&self, _key: &str) -> Result<Option<String>, StoreError> {
        Err(StoreError::Unauthorized)
    }

    async fn set_setting(&self, _key: &str, _value: &str) -> Result<(), StoreError> {
        Err(StoreError::Unauthorized)
    }
}

#[tokio::test]
async fn test_persistence_failures_do_not_fail_the_sync() {
    let mut server = mockito::Server::new_async().await;
    mock_sheet(&mut server, "sheet-1", 200, SHEET_CSV).await;

    let dir = tempfile::tempdir().unwrap();
    let cache = Arc::new(LocalCache::new(dir.path().join("cache.toml"), 16));
    let workspace = Arc::new(Workspace::default());
    let reconciler = Reconciler::new(
        sheets_client(&server),
        Persistence::new(Arc::new(DownStore)),
        cache.clone(),
        workspace.clone(),
    );

    let report = assert_ok!(reconciler.sync_interactive("sheet-1").await);
    assert_eq!(report.failed, 2);
    assert_eq!(report.inserted, 0);
    assert_eq!(workspace.snapshot().leads.len(), 2);
    // The local cache is still written
    assert_eq!(cache.get(SHEET_ID_CACHE_KEY).await.unwrap().as_deref(), Some("sheet-1"));
}

#[tokio::test]
async fn test_load_falls_back_when_store_is_down() {
    let library = Library::new(
        Arc::new(Workspace::default()),
        Persistence::new(Arc::new(DownStore)),
    );

    let snapshot = library.load().await;
    assert_eq!(snapshot.leads, default_leads());
    assert_eq!(snapshot.properties, default_properties());
    assert!(snapshot.listings.is_empty() && snapshot.resources.is_empty());
    assert!(!snapshot.cloud_connected);
}

#[tokio::test]
async fn test_upsert_by_identity_is_idempotent() {
    let store = Arc::new(MemoryStore::new());
    let persistence = Persistence::new(store.clone());

    let mut lead = default_leads().remove(0);
    assert_ok!(persistence.upsert(&lead).await);
    lead.name = "Renamed".to_string();
    lead.status = LeadStatus::Converted;
    assert_ok!(persistence.upsert(&lead).await);

    let stored: Vec<Lead> = persistence.list().await.unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].name, "Renamed");
    assert_eq!(stored[0].status, LeadStatus::Converted);
}

#[tokio::test]
async fn test_supabase_store_round_trip() {
    let mut server = mockito::Server::new_async().await;
    let list = server
        .mock("GET", "/rest/v1/properties")
        .match_query(mockito::Matcher::AllOf(vec![
            mockito::Matcher::UrlEncoded("select".into(), "*".into()),
            mockito::Matcher::UrlEncoded("order".into(), "created_at.desc".into()),
        ]))
        .match_header("apikey", "anon")
        .match_header("authorization", "Bearer anon")
        .with_status(200)
        .with_body(
            json!([{
                "id": 7,
                "name": "Harbor Loft",
                "price": 1200000,
                "location": "Austin",
                "type": "Condo",
                "bedrooms": 2,
                "bathrooms": 2.5,
                "sqft": 1500,
                "amenities": ["Gym"],
                "description": "Corner unit",
                "image_url": "https://img/loft.jpg",
                "created_at": "2024-01-01T00:00:00Z"
            }])
            .to_string(),
        )
        .create_async()
        .await;

    let upsert = server
        .mock("POST", "/rest/v1/leads")
        .match_query(mockito::Matcher::UrlEncoded("on_conflict".into(), "id".into()))
        .match_header("prefer", "resolution=merge-duplicates,return=minimal")
        .match_body(mockito::Matcher::PartialJson(json!({
            "id": "l1",
            "last_contacted": "2024-05-10"
        })))
        .with_status(201)
        .create_async()
        .await;

    let insert = server
        .mock("POST", "/rest/v1/leads")
        .match_header("prefer", "return=minimal")
        .with_status(201)
        .create_async()
        .await;

    let setting = server
        .mock("GET", "/rest/v1/settings")
        .match_query(mockito::Matcher::UrlEncoded("key".into(), "eq.google_sheet_id".into()))
        .with_status(200)
        .with_body(r#"[{"value":"sheet-9"}]"#)
        .create_async()
        .await;

    let client = SupabaseClient::new(server.url(), "anon".to_string(), Duration::from_secs(5));
    let persistence = Persistence::new(Arc::new(client));

    let properties: Vec<Property> = persistence.list().await.unwrap();
    assert_eq!(properties.len(), 1);
    assert_eq!(properties[0].id, "7");
    assert_eq!(properties[0].bathrooms, 2.5);
    assert_eq!(properties[0].image_url, "https://img/loft.jpg");

    let mut lead = default_leads().remove(0);
    lead.last_contacted = chrono::NaiveDate::from_ymd_opt(2024, 5, 10).unwrap();
    assert_ok!(persistence.upsert(&lead).await);

    lead.id = "gs-0".to_string();
    assert_ok!(persistence.insert(&lead).await);

    assert_eq!(
        persistence.setting(SHEET_ID_SETTING).await.unwrap().as_deref(),
        Some("sheet-9")
    );

    list.assert_async().await;
    upsert.assert_async().await;
    insert.assert_async().await;
    setting.assert_async().await;
}

#[tokio::test]
async fn test_supabase_unauthorized_is_typed() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/rest/v1/leads")
        .match_query(mockito::Matcher::Any)
        .with_status(401)
        .create_async()
        .await;

    let client = SupabaseClient::new(server.url(), "bad".to_string(), Duration::from_secs(5));
    let err = assert_err!(client.list(Collection::Leads).await);
    assert!(matches!(err, StoreError::Unauthorized));
}
