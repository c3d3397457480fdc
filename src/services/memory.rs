use async_trait::async_trait;
use chrono::Utc;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use crate::services::store::{Collection, RowStore, StoreError};

#[derive(Debug)]
struct StoredRow {
    sequence: u64,
    row: Map<String, Value>,
}

#[derive(Debug, Default)]
struct Tables {
    rows: HashMap<Collection, Vec<StoredRow>>,
    settings: HashMap<String, String>,
    sequence: u64,
}

/// Process-local row-store, used when no remote store is configured
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_tables<T>(&self, f: impl FnOnce(&mut Tables) -> T) -> T {
        let mut tables = self.tables.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut tables)
    }

    /// Number of rows currently held in `collection`
    pub fn len(&self, collection: Collection) -> usize {
        self.with_tables(|t| t.rows.get(&collection).map_or(0, Vec::len))
    }

    pub fn is_empty(&self, collection: Collection) -> bool {
        self.len(collection) == 0
    }
}

fn row_id(row: &Map<String, Value>) -> Option<String> {
    match row.get("id")? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[async_trait]
impl RowStore for MemoryStore {
    async fn list(&self, collection: Collection) -> Result<Vec<Value>, StoreError> {
        Ok(self.with_tables(|t| {
            let mut rows: Vec<&StoredRow> = t
                .rows
                .get(&collection)
                .map(|rows| rows.iter().collect())
                .unwrap_or_default();
            rows.sort_by(|a, b| b.sequence.cmp(&a.sequence));
            rows.into_iter().map(|r| Value::Object(r.row.clone())).collect()
        }))
    }

    async fn upsert(&self, collection: Collection, row: Value) -> Result<(), StoreError> {
        let Value::Object(mut object) = row else {
            return Err(StoreError::InvalidResponse("Row must be a JSON object".into()));
        };

        self.with_tables(|t| {
            let id = match row_id(&object) {
                Some(id) => id,
                None => {
                    let id = uuid::Uuid::new_v4().to_string();
                    object.insert("id".to_string(), Value::String(id.clone()));
                    id
                }
            };

            let rows = t.rows.entry(collection).or_default();
            if let Some(existing) = rows
                .iter_mut()
                .find(|r| row_id(&r.row).as_deref() == Some(id.as_str()))
            {
                if let Some(created_at) = existing.row.get("created_at").cloned() {
                    object.insert("created_at".to_string(), created_at);
                }
                existing.row = object;
                return;
            }

            t.sequence += 1;
            object
                .entry("created_at")
                .or_insert_with(|| Value::String(Utc::now().to_rfc3339()));
            rows.push(StoredRow {
                sequence: t.sequence,
                row: object,
            });
        });
        Ok(())
    }

    async fn delete(&self, collection: Collection, id: &str) -> Result<(), StoreError> {
        self.with_tables(|t| {
            if let Some(rows) = t.rows.get_mut(&collection) {
                rows.retain(|r| row_id(&r.row).as_deref() != Some(id));
            }
        });
        Ok(())
    }

    async fn get_setting(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.with_tables(|t| t.settings.get(key).cloned()))
    }

    async fn set_setting(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.with_tables(|t| {
            t.settings.insert(key.to_string(), value.to_string());
        });
        Ok(())
    }

    fn is_durable(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_insert_assigns_identity() {
        let store = MemoryStore::new();
        store
            .upsert(Collection::Leads, json!({ "name": "Ana" }))
            .await
            .unwrap();

        let rows = store.list(Collection::Leads).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert!(rows[0]["id"].as_str().is_some_and(|id| !id.is_empty()));
        assert!(rows[0].get("created_at").is_some());
    }

    #[tokio::test]
    async fn test_upsert_replaces_by_identity() {
        let store = MemoryStore::new();
        store
            .upsert(Collection::Leads, json!({ "id": "l1", "name": "Old" }))
            .await
            .unwrap();
        store
            .upsert(Collection::Leads, json!({ "id": "l1", "name": "New" }))
            .await
            .unwrap();

        let rows = store.list(Collection::Leads).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["name"], "New");
    }

    #[tokio::test]
    async fn test_list_is_newest_first() {
        let store = MemoryStore::new();
        for id in ["a", "b", "c"] {
            store
                .upsert(Collection::Properties, json!({ "id": id }))
                .await
                .unwrap();
        }
        store
            .upsert(Collection::Properties, json!({ "id": "a", "name": "updated" }))
            .await
            .unwrap();

        let ids: Vec<_> = store
            .list(Collection::Properties)
            .await
            .unwrap()
            .into_iter()
            .map(|r| r["id"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(ids, vec!["c", "b", "a"]);
    }

    #[tokio::test]
    async fn test_delete_and_settings() {
        let store = MemoryStore::new();
        store
            .upsert(Collection::Documents, json!({ "id": "d1" }))
            .await
            .unwrap();
        store.delete(Collection::Documents, "d1").await.unwrap();
        assert!(store.is_empty(Collection::Documents));

        assert_eq!(store.get_setting("google_sheet_id").await.unwrap(), None);
        store.set_setting("google_sheet_id", "abc").await.unwrap();
        assert_eq!(
            store.get_setting("google_sheet_id").await.unwrap().as_deref(),
            Some("abc")
        );
        assert!(!store.is_durable());
    }
}
