use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{Row, SqlitePool};

/// Key/value side channel with per-entry expiry. Callers must treat every
/// error as a miss.
#[async_trait]
pub trait Cache: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>>;
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<()>;
    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64>;
}

#[derive(Debug, Clone)]
struct CacheEntry {
    value: String,
    expires_at: DateTime<Utc>,
}

#[derive(Clone, Default)]
pub struct MemoryCache {
    entries: Arc<RwLock<HashMap<String, CacheEntry>>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

#[async_trait]
impl Cache for MemoryCache {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let now = Utc::now();
        {
            let entries = self.entries.read();
            match entries.get(key) {
                None => return Ok(None),
                Some(entry) if entry.expires_at > now => return Ok(Some(entry.value.clone())),
                Some(_) => {}
            }
        }

        let mut entries = self.entries.write();
        if entries.get(key).is_some_and(|entry| entry.expires_at <= now) {
            entries.remove(key);
        }
        Ok(None)
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<()> {
        let expires_at = expiry_after(ttl)?;
        self.entries.write().insert(
            key.to_string(),
            CacheEntry {
                value: value.to_string(),
                expires_at,
            },
        );
        Ok(())
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64> {
        let mut removed = 0_u64;
        self.entries.write().retain(|_, entry| {
            let keep = entry.expires_at > now;
            if !keep {
                removed += 1;
            }
            keep
        });

        Ok(removed)
    }
}

#[derive(Clone)]
pub struct SqliteCache {
    pool: SqlitePool,
}

impl SqliteCache {
    pub async fn connect(database_url: &str) -> Result<Self> {
        // every connection to `sqlite::memory:` opens its own database
        let max_connections = if database_url.contains(":memory:") { 1 } else { 5 };

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .with_context(|| format!("failed connecting to sqlite at {}", database_url))?;

        let cache = Self { pool };
        cache.ensure_schema().await?;
        Ok(cache)
    }

    async fn ensure_schema(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS cache_entries (
              cache_key TEXT PRIMARY KEY,
              value TEXT NOT NULL,
              expires_at INTEGER NOT NULL
            );
            "#,
        )
        .execute(&self.pool)
        .await
        .context("failed creating cache_entries table")?;

        Ok(())
    }
}

#[async_trait]
impl Cache for SqliteCache {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let row = sqlx::query(
            r#"
            SELECT value
            FROM cache_entries
            WHERE cache_key = ?1 AND expires_at > ?2
            "#,
        )
        .bind(key)
        .bind(Utc::now().timestamp())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|row| row.get::<String, _>("value")))
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<()> {
        let expires_at = expiry_after(ttl)?;

        sqlx::query(
            r#"
            INSERT INTO cache_entries (cache_key, value, expires_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(cache_key) DO UPDATE SET
              value=excluded.value,
              expires_at=excluded.expires_at
            "#,
        )
        .bind(key)
        .bind(value)
        .bind(expires_at.timestamp())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64> {
        let result = sqlx::query("DELETE FROM cache_entries WHERE expires_at <= ?1")
            .bind(now.timestamp())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}

#[derive(Clone)]
pub enum CacheStore {
    Memory(MemoryCache),
    Sqlite(SqliteCache),
}

impl CacheStore {
    pub fn memory() -> Self {
        Self::Memory(MemoryCache::new())
    }

    pub async fn sqlite(database_url: &str) -> Result<Self> {
        let sqlite = SqliteCache::connect(database_url).await?;
        Ok(Self::Sqlite(sqlite))
    }

    pub fn backend(&self) -> &'static str {
        match self {
            CacheStore::Memory(_) => "memory",
            CacheStore::Sqlite(_) => "sqlite",
        }
    }
}

#[async_trait]
impl Cache for CacheStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        match self {
            CacheStore::Memory(cache) => cache.get(key).await,
            CacheStore::Sqlite(cache) => cache.get(key).await,
        }
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<()> {
        match self {
            CacheStore::Memory(cache) => cache.set(key, value, ttl).await,
            CacheStore::Sqlite(cache) => cache.set(key, value, ttl).await,
        }
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64> {
        match self {
            CacheStore::Memory(cache) => cache.purge_expired(now).await,
            CacheStore::Sqlite(cache) => cache.purge_expired(now).await,
        }
    }
}

fn expiry_after(ttl: Duration) -> Result<DateTime<Utc>> {
    let ttl = chrono::Duration::from_std(ttl).context("cache ttl out of range")?;
    Ok(Utc::now() + ttl)
}

#[cfg(test)]
mod tests {
    use super::*;

    const DAY: Duration = Duration::from_secs(24 * 60 * 60);

    #[tokio::test]
    async fn memory_cache_round_trip() {
        let cache = MemoryCache::new();
        cache.set("hotel:tokyo:3", r#"{"price":6000}"#, DAY).await.unwrap();

        assert_eq!(
            cache.get("hotel:tokyo:3").await.unwrap().as_deref(),
            Some(r#"{"price":6000}"#)
        );
        assert!(cache.get("hotel:osaka:3").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn expired_entries_are_hidden_and_purged() {
        let cache = MemoryCache::new();
        cache.set("weather:tokyo:june", "{}", Duration::ZERO).await.unwrap();
        cache.set("weather:tokyo:july", "{}", DAY).await.unwrap();

        cache.set("weather:tokyo:may", "{}", Duration::ZERO).await.unwrap();

        assert!(cache.get("weather:tokyo:june").await.unwrap().is_none());
        assert_eq!(cache.len(), 2, "expired entry is evicted on read");
        assert_eq!(cache.purge_expired(Utc::now()).await.unwrap(), 1);
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn sqlite_cache_upserts() {
        let cache = CacheStore::sqlite("sqlite::memory:").await.unwrap();
        assert_eq!(cache.backend(), "sqlite");

        cache.set("fare:bkk:nrt:2026-11-16", "first", DAY).await.unwrap();
        cache.set("fare:bkk:nrt:2026-11-16", "second", DAY).await.unwrap();

        assert_eq!(
            cache.get("fare:bkk:nrt:2026-11-16").await.unwrap().as_deref(),
            Some("second")
        );
    }

    #[tokio::test]
    async fn sqlite_cache_ignores_expired_rows() {
        let cache = SqliteCache::connect("sqlite::memory:").await.unwrap();
        cache.set("visa:th:jp:tourism", "{}", Duration::ZERO).await.unwrap();

        assert!(cache.get("visa:th:jp:tourism").await.unwrap().is_none());
        assert_eq!(cache.purge_expired(Utc::now()).await.unwrap(), 1);
    }
}
