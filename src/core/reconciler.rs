//! Lead synchronization from a shared sheet.
//!
//! Both entry points funnel into one routine: fetch, parse, map, publish the
//! leads, then write each lead and the sheet id through to the stores. At most
//! one sync runs at a time; a second request is rejected while one is in flight.

use chrono::{DateTime, Local, Utc};
use serde::Serialize;
use std::sync::{Arc, Mutex, PoisonError};
use thiserror::Error;

use crate::core::workspace::{Intent, Workspace};
use crate::core::{csv, mapper};
use crate::services::cache::{LocalCache, SHEET_ID_CACHE_KEY};
use crate::services::sheets::{SheetSource, SheetsError};
use crate::services::store::{Persistence, SHEET_ID_SETTING};

/// Errors surfaced by a sync
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("A lead sync is already in progress")]
    InProgress,

    #[error("Failed to sync leads. Check that the sheet is shared with \"Anyone with the link\". ({0})")]
    Ingestion(#[from] SheetsError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncMode {
    /// User initiated; toggles the busy flag and surfaces failures
    Interactive,
    /// Startup initiated; failures are only logged
    Silent,
}

/// Outcome of one successful sync
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncReport {
    pub sheet_id: String,
    pub mode: SyncMode,
    pub leads: usize,
    pub inserted: usize,
    pub upserted: usize,
    pub failed: usize,
    pub synced_at: DateTime<Utc>,
    /// Local wall-clock time for display
    pub last_synced: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncStatus {
    pub is_syncing: bool,
    pub sheet_id: Option<String>,
    pub last_synced: Option<String>,
    pub last_error: Option<String>,
}

/// What the startup pass decided to do
#[derive(Debug)]
pub enum StartupSync {
    /// A remote setting existed; the silent sync result, if it succeeded
    Remote(Option<SyncReport>),
    /// Only the local cache had an id
    Cached(Result<SyncReport, SyncError>),
    /// No known sheet; the built-in leads stay in place
    Defaults,
}

pub struct Reconciler {
    source: Arc<dyn SheetSource>,
    persistence: Persistence,
    cache: Arc<LocalCache>,
    workspace: Arc<Workspace>,
    in_flight: tokio::sync::Mutex<()>,
    status: Mutex<SyncStatus>,
}

impl Reconciler {
    pub fn new(
        source: Arc<dyn SheetSource>,
        persistence: Persistence,
        cache: Arc<LocalCache>,
        workspace: Arc<Workspace>,
    ) -> Self {
        Self {
            source,
            persistence,
            cache,
            workspace,
            in_flight: tokio::sync::Mutex::new(()),
            status: Mutex::new(SyncStatus::default()),
        }
    }

    pub fn status(&self) -> SyncStatus {
        self.status
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn update_status(&self, f: impl FnOnce(&mut SyncStatus)) {
        f(&mut self.status.lock().unwrap_or_else(PoisonError::into_inner));
    }

    /// User-triggered sync; failures are returned and recorded in the status
    pub async fn sync_interactive(&self, sheet_id: &str) -> Result<SyncReport, SyncError> {
        let _guard = self.in_flight.try_lock().map_err(|_| {
            tracing::warn!("Rejected sync of {}: another sync is running", sheet_id);
            SyncError::InProgress
        })?;

        self.update_status(|s| s.is_syncing = true);
        let result = self.run(sheet_id, SyncMode::Interactive).await;
        self.update_status(|s| {
            s.is_syncing = false;
            s.last_error = result.as_ref().err().map(|e| e.to_string());
        });
        result
    }

    /// Background sync; failures are logged and dropped
    pub async fn sync_silent(&self, sheet_id: &str) -> Option<SyncReport> {
        let Ok(_guard) = self.in_flight.try_lock() else {
            tracing::warn!("Skipped silent sync of {}: another sync is running", sheet_id);
            return None;
        };

        match self.run(sheet_id, SyncMode::Silent).await {
            Ok(report) => Some(report),
            Err(e) => {
                tracing::error!("Silent sync of {} failed: {}", sheet_id, e);
                None
            }
        }
    }

    async fn run(&self, sheet_id: &str, mode: SyncMode) -> Result<SyncReport, SyncError> {
        tracing::info!("Starting {:?} sync of sheet {}", mode, sheet_id);

        let text = self.source.fetch_csv(sheet_id).await?;
        let rows = csv::parse(&text);
        let leads = mapper::map_leads(&rows, Utc::now().date_naive());

        self.workspace.apply(Intent::LeadsReplaced(leads.clone()));

        let (mut inserted, mut upserted, mut failed) = (0, 0, 0);
        for lead in &leads {
            let synthetic = mapper::is_synthetic_id(&lead.id);
            let result = if synthetic {
                self.persistence.insert(lead).await
            } else {
                self.persistence.upsert(lead).await
            };

            match result {
                Ok(()) if synthetic => inserted += 1,
                Ok(()) => upserted += 1,
                Err(e) => {
                    failed += 1;
                    tracing::warn!("Failed to persist lead {}: {}", lead.id, e);
                }
            }
        }

        if let Err(e) = self.persistence.set_setting(SHEET_ID_SETTING, sheet_id).await {
            tracing::warn!("Failed to store sheet id setting: {}", e);
        }
        if let Err(e) = self.cache.set(SHEET_ID_CACHE_KEY, sheet_id).await {
            tracing::warn!("Failed to cache sheet id locally: {}", e);
        }

        let synced_at = Utc::now();
        let last_synced = synced_at.with_timezone(&Local).format("%-I:%M:%S %p").to_string();
        self.update_status(|s| {
            s.sheet_id = Some(sheet_id.to_string());
            s.last_synced = Some(last_synced.clone());
        });

        tracing::info!(
            "Synced {} leads from {} ({} inserted, {} upserted, {} failed)",
            leads.len(),
            sheet_id,
            inserted,
            upserted,
            failed
        );

        Ok(SyncReport {
            sheet_id: sheet_id.to_string(),
            mode,
            leads: leads.len(),
            inserted,
            upserted,
            failed,
            synced_at,
            last_synced,
        })
    }

    /// Resume the last known sheet on startup
    ///
    /// A remote setting wins and is copied into the local cache before a silent
    /// sync. Failing that, a cached id starts an interactive sync.
    pub async fn restore(&self) -> StartupSync {
        let remote = self.persistence.setting(SHEET_ID_SETTING).await.unwrap_or_else(|e| {
            tracing::warn!("Failed to read sheet id setting: {}", e);
            None
        });

        if let Some(sheet_id) = remote {
            if let Err(e) = self.cache.set(SHEET_ID_CACHE_KEY, &sheet_id).await {
                tracing::warn!("Failed to cache sheet id locally: {}", e);
            }
            self.update_status(|s| s.sheet_id = Some(sheet_id.clone()));
            return StartupSync::Remote(self.sync_silent(&sheet_id).await);
        }

        let cached = self.cache.get(SHEET_ID_CACHE_KEY).await.unwrap_or_else(|e| {
            tracing::warn!("Failed to read cached sheet id: {}", e);
            None
        });

        match cached {
            Some(sheet_id) => StartupSync::Cached(self.sync_interactive(&sheet_id).await),
            None => {
                tracing::info!("No sheet configured; keeping built-in leads");
                StartupSync::Defaults
            }
        }
    }
}
