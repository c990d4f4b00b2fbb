//! Organization-scoped, TTL-based cache for AI-generated answers.

pub mod clock;
pub mod key;
mod service;
pub mod sqlite;
pub mod store;


pub use clock::{Clock, ManualClock, SystemClock};
pub use key::{compose_key, normalize_parameter};
pub use service::{ResponseCache, MAX_TTL_HOURS};
pub use sqlite::SqliteCacheStore;
pub use store::{CacheEntry, CacheEntryId, CacheStore, MemoryCacheStore, StoreError};
