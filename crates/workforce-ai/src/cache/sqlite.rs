use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::debug;

use super::store::{CacheEntry, CacheEntryId, CacheStore, StoreError};
use crate::workforce::OrganizationId;

const CACHE_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS ai_response_cache (
    id TEXT PRIMARY KEY,
    organization_id TEXT NOT NULL,
    cache_key TEXT NOT NULL,
    content TEXT NOT NULL,
    expires_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    UNIQUE(organization_id, cache_key)
);
CREATE INDEX IF NOT EXISTS idx_ai_response_cache_expires_at
    ON ai_response_cache(expires_at);
"#;

const SELECT_COLUMNS: &str = "id, organization_id, cache_key, content, expires_at";

/// SQLite-backed cache store. A single connection is shared behind a mutex;
/// every statement is a short point lookup or write.
#[derive(Debug)]
pub struct SqliteCacheStore {
    conn: Mutex<Connection>,
}

impl SqliteCacheStore {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let path = path.as_ref();
        debug!(target: "workforce::cache", path = %path.display(), "opening cache database");
        Self::from_connection(Connection::open(path)?)
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch(CACHE_SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn connection(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn
            .lock()
            .map_err(|_| StoreError::Unavailable("cache connection mutex poisoned".to_string()))
    }
}

impl CacheStore for SqliteCacheStore {
    fn find(
        &self,
        organization: &OrganizationId,
        cache_key: &str,
    ) -> Result<Option<CacheEntry>, StoreError> {
        let conn = self.connection()?;
        let entry = conn
            .query_row(
                &format!(
                    "SELECT {SELECT_COLUMNS} FROM ai_response_cache \
                     WHERE organization_id = ?1 AND cache_key = ?2"
                ),
                params![organization.0, cache_key],
                map_entry,
            )
            .optional()?;
        Ok(entry)
    }

    fn find_by_id(&self, id: &CacheEntryId) -> Result<Option<CacheEntry>, StoreError> {
        let conn = self.connection()?;
        let entry = conn
            .query_row(
                &format!("SELECT {SELECT_COLUMNS} FROM ai_response_cache WHERE id = ?1"),
                params![id.0],
                map_entry,
            )
            .optional()?;
        Ok(entry)
    }

    fn upsert(
        &self,
        organization: &OrganizationId,
        cache_key: &str,
        content: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<CacheEntry, StoreError> {
        let conn = self.connection()?;
        conn.execute(
            r#"
            INSERT INTO ai_response_cache (
                id,
                organization_id,
                cache_key,
                content,
                expires_at,
                updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            ON CONFLICT(organization_id, cache_key) DO UPDATE SET
                content = excluded.content,
                expires_at = excluded.expires_at,
                updated_at = excluded.updated_at
            "#,
            params![
                CacheEntryId::generate().0,
                organization.0,
                cache_key,
                content,
                format_timestamp(expires_at),
                format_timestamp(Utc::now()),
            ],
        )?;

        let entry = conn.query_row(
            &format!(
                "SELECT {SELECT_COLUMNS} FROM ai_response_cache \
                 WHERE organization_id = ?1 AND cache_key = ?2"
            ),
            params![organization.0, cache_key],
            map_entry,
        )?;
        Ok(entry)
    }

    fn delete(&self, id: &CacheEntryId) -> Result<(), StoreError> {
        let conn = self.connection()?;
        conn.execute("DELETE FROM ai_response_cache WHERE id = ?1", params![id.0])?;
        Ok(())
    }
}

fn format_timestamp(value: DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn map_entry(row: &Row<'_>) -> rusqlite::Result<CacheEntry> {
    let expires_raw: String = row.get(4)?;
    let expires_at = DateTime::parse_from_rfc3339(&expires_raw)
        .map_err(|err| rusqlite::Error::FromSqlConversionFailure(4, Type::Text, Box::new(err)))?
        .with_timezone(&Utc);

    Ok(CacheEntry {
        id: CacheEntryId(row.get(0)?),
        organization_id: OrganizationId(row.get(1)?),
        cache_key: row.get(2)?,
        content: row.get(3)?,
        expires_at,
    })
}
