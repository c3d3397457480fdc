// Core pipeline exports
pub mod csv;
pub mod library;
pub mod mapper;
pub mod prompt;
pub mod ranker;
pub mod reconciler;
pub mod workspace;

pub use library::Library;
pub use mapper::map_leads;
pub use prompt::{InventorySource, MatchingRequest};
pub use ranker::{rank, SortOrder};
pub use reconciler::{Reconciler, StartupSync, SyncError, SyncMode, SyncReport, SyncStatus};
pub use workspace::{Intent, Snapshot, Update, Workspace};
