// Service exports
pub mod cache;
pub mod gemini;
pub mod memory;
pub mod sheets;
pub mod store;
pub mod supabase;

pub use cache::{CacheError, LocalCache, SHEET_ID_CACHE_KEY};
pub use gemini::{GeminiClient, MatchingError};
pub use memory::MemoryStore;
pub use sheets::{SheetSource, SheetsClient, SheetsError};
pub use store::{Collection, Persistence, Record, RowStore, StoreError, SHEET_ID_SETTING};
pub use supabase::SupabaseClient;
