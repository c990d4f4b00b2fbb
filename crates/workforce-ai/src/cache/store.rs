use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::workforce::OrganizationId;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CacheEntryId(pub String);

impl CacheEntryId {
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }
}

/// One cached answer, unique per (`organization_id`, `cache_key`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    pub id: CacheEntryId,
    pub organization_id: OrganizationId,
    pub cache_key: String,
    pub content: String,
    pub expires_at: DateTime<Utc>,
}

impl CacheEntry {
    /// An entry whose expiry equals `now` is still served.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at < now
    }
}

/// Persistence seam for cached answers. Expiry is a plain field under the
/// caller's control; stores never evict on their own.
pub trait CacheStore: Send + Sync {
    fn find(
        &self,
        organization: &OrganizationId,
        cache_key: &str,
    ) -> Result<Option<CacheEntry>, StoreError>;

    fn find_by_id(&self, id: &CacheEntryId) -> Result<Option<CacheEntry>, StoreError>;

    /// Creates the entry or overwrites content and expiry of the existing one.
    fn upsert(
        &self,
        organization: &OrganizationId,
        cache_key: &str,
        content: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<CacheEntry, StoreError>;

    /// Deleting an id that no longer exists is not an error.
    fn delete(&self, id: &CacheEntryId) -> Result<(), StoreError>;
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("cache store unavailable: {0}")]
    Unavailable(String),
    #[error("cache database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Process-local store. Entries do not survive a restart and are not shared
/// between replicas.
#[derive(Debug, Default)]
pub struct MemoryCacheStore {
    entries: Mutex<HashMap<(OrganizationId, String), CacheEntry>>,
}

impl MemoryCacheStore {
    pub fn len(&self) -> usize {
        self.lock().map(|guard| guard.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<(OrganizationId, String), CacheEntry>>, StoreError> {
        self.entries
            .lock()
            .map_err(|_| StoreError::Unavailable("cache mutex poisoned".to_string()))
    }
}

impl CacheStore for MemoryCacheStore {
    fn find(
        &self,
        organization: &OrganizationId,
        cache_key: &str,
    ) -> Result<Option<CacheEntry>, StoreError> {
        let guard = self.lock()?;
        Ok(guard
            .get(&(organization.clone(), cache_key.to_string()))
            .cloned())
    }

    fn find_by_id(&self, id: &CacheEntryId) -> Result<Option<CacheEntry>, StoreError> {
        let guard = self.lock()?;
        Ok(guard.values().find(|entry| &entry.id == id).cloned())
    }

    fn upsert(
        &self,
        organization: &OrganizationId,
        cache_key: &str,
        content: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<CacheEntry, StoreError> {
        let mut guard = self.lock()?;
        let entry = guard
            .entry((organization.clone(), cache_key.to_string()))
            .and_modify(|existing| {
                existing.content = content.to_string();
                existing.expires_at = expires_at;
            })
            .or_insert_with(|| CacheEntry {
                id: CacheEntryId::generate(),
                organization_id: organization.clone(),
                cache_key: cache_key.to_string(),
                content: content.to_string(),
                expires_at,
            });
        Ok(entry.clone())
    }

    fn delete(&self, id: &CacheEntryId) -> Result<(), StoreError> {
        let mut guard = self.lock()?;
        guard.retain(|_, entry| &entry.id != id);
        Ok(())
    }
}
