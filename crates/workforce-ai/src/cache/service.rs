use std::future::Future;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, warn};

use super::clock::{Clock, SystemClock};
use super::store::{CacheStore, StoreError};
use crate::workforce::OrganizationId;

/// Longest TTL honoured by [`ResponseCache`]; larger values are clamped.
pub const MAX_TTL_HOURS: u32 = 24 * 366 * 10;

/// Read-through/write-through cache for generated answers, scoped per
/// organization.
///
/// Expiry is lazy: an entry is only checked, and removed, when it is read.
/// Concurrent misses on one key each run their generator and the last upsert
/// wins. Store calls run on the blocking thread pool.
#[derive(Clone)]
pub struct ResponseCache {
    store: Arc<dyn CacheStore>,
    clock: Arc<dyn Clock>,
}

impl ResponseCache {
    pub fn new(store: Arc<dyn CacheStore>) -> Self {
        Self::with_clock(store, Arc::new(SystemClock))
    }

    pub fn with_clock(store: Arc<dyn CacheStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Returns the cached content for (`organization`, `cache_key`) or runs
    /// `generate` and stores its output for `ttl_hours`.
    ///
    /// `force_refresh` skips the lookup entirely. Generator errors are returned
    /// untouched and nothing is written; store errors surface through `E`.
    /// `ttl_hours` is clamped to [`MAX_TTL_HOURS`].
    pub async fn get_or_compute<F, Fut, E>(
        &self,
        organization: &OrganizationId,
        cache_key: &str,
        ttl_hours: u32,
        force_refresh: bool,
        generate: F,
    ) -> Result<String, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<String, E>>,
        E: From<StoreError>,
    {
        if !force_refresh {
            if let Some(content) = self.lookup(organization, cache_key).await? {
                debug!(
                    target: "workforce::cache",
                    organization_id = %organization,
                    cache_key,
                    hit = true,
                    "serving cached response"
                );
                return Ok(content);
            }
        }

        debug!(
            target: "workforce::cache",
            organization_id = %organization,
            cache_key,
            hit = false,
            force_refresh,
            "generating response"
        );
        let content = generate().await?;

        let expires_at = expiry_after(self.clock.now(), ttl_hours);
        let (org, key, stored) = (organization.clone(), cache_key.to_string(), content.clone());
        self.on_store(move |store| store.upsert(&org, &key, &stored, expires_at))
            .await?;

        Ok(content)
    }

    async fn lookup(
        &self,
        organization: &OrganizationId,
        cache_key: &str,
    ) -> Result<Option<String>, StoreError> {
        let (org, key) = (organization.clone(), cache_key.to_string());
        let Some(entry) = self.on_store(move |store| store.find(&org, &key)).await? else {
            return Ok(None);
        };

        if entry.is_expired(self.clock.now()) {
            let id = entry.id.clone();
            if let Err(err) = self.on_store(move |store| store.delete(&id)).await {
                warn!(
                    target: "workforce::cache",
                    organization_id = %organization,
                    cache_key,
                    error = %err,
                    "failed to evict expired cache entry"
                );
            }
            return Ok(None);
        }

        Ok(Some(entry.content))
    }

    async fn on_store<T, F>(&self, op: F) -> Result<T, StoreError>
    where
        F: FnOnce(&dyn CacheStore) -> Result<T, StoreError> + Send + 'static,
        T: Send + 'static,
    {
        let store = Arc::clone(&self.store);
        tokio::task::spawn_blocking(move || op(store.as_ref()))
            .await
            .map_err(|err| StoreError::Unavailable(format!("cache store task failed: {err}")))?
    }
}

fn expiry_after(now: DateTime<Utc>, ttl_hours: u32) -> DateTime<Utc> {
    let ttl = Duration::hours(i64::from(ttl_hours.min(MAX_TTL_HOURS)));
    now.checked_add_signed(ttl).unwrap_or(DateTime::<Utc>::MAX_UTC)
}
