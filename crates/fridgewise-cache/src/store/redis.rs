//! Redis-backed cache store.
//!
//! The connection is opened lazily on first use. A failed attempt leaves
//! the store unconnected so the next call tries again.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use redis::{AsyncCommands, Client, RedisResult, aio::ConnectionManager};
use tokio::sync::OnceCell;
use tracing::{debug, error, info, instrument};

use super::{CacheError, CacheStore};

/// Redis cache store with a lazily established connection manager.
pub struct RedisStore {
    client: Client,
    conn: OnceCell<ConnectionManager>,
    connect_timeout: Duration,
    command_timeout: Duration,
}

impl std::fmt::Debug for RedisStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisStore")
            .field("connected", &self.conn.initialized())
            .field("connect_timeout", &self.connect_timeout)
            .field("command_timeout", &self.command_timeout)
            .finish_non_exhaustive()
    }
}

impl RedisStore {
    /// Creates a store for `redis_url` without connecting.
    ///
    /// # Errors
    ///
    /// Returns `CacheError::Connection` if the URL cannot be parsed.
    pub fn new(
        redis_url: &str,
        connect_timeout: Duration,
        command_timeout: Duration,
    ) -> Result<Self, CacheError> {
        let client = Client::open(redis_url)?;

        Ok(Self {
            client,
            conn: OnceCell::new(),
            connect_timeout,
            command_timeout,
        })
    }

    async fn connection(&self) -> Result<ConnectionManager, CacheError> {
        let conn = self
            .conn
            .get_or_try_init(|| async {
                let connect = ConnectionManager::new(self.client.clone());
                let manager = tokio::time::timeout(self.connect_timeout, connect)
                    .await
                    .map_err(|_| CacheError::Timeout("connect"))??;
                info!("Connected to Redis");
                Ok::<_, CacheError>(manager)
            })
            .await?;

        Ok(conn.clone())
    }

    async fn run<T, F>(&self, op: &'static str, fut: F) -> Result<T, CacheError>
    where
        F: Future<Output = RedisResult<T>>,
    {
        tokio::time::timeout(self.command_timeout, fut)
            .await
            .map_err(|_| CacheError::Timeout(op))?
            .map_err(CacheError::from)
    }

    async fn try_get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let mut conn = self.connection().await?;
        self.run("GET", conn.get::<_, Option<String>>(key)).await
    }

    async fn try_set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError> {
        let mut conn = self.connection().await?;
        let secs = ttl.as_secs().max(1);
        self.run("SETEX", conn.set_ex::<_, _, ()>(key, value, secs))
            .await
    }

    async fn try_delete(&self, key: &str) -> Result<u64, CacheError> {
        let mut conn = self.connection().await?;
        self.run("DEL", conn.del::<_, u64>(key)).await
    }

    async fn try_delete_pattern(&self, pattern: &str) -> Result<u64, CacheError> {
        let mut conn = self.connection().await?;
        let mut cursor: u64 = 0;
        let mut deleted: u64 = 0;

        loop {
            let (next_cursor, keys): (u64, Vec<String>) = self
                .run(
                    "SCAN",
                    redis::cmd("SCAN")
                        .arg(cursor)
                        .arg("MATCH")
                        .arg(pattern)
                        .arg("COUNT")
                        .arg(100)
                        .query_async(&mut conn),
                )
                .await?;

            if !keys.is_empty() {
                let count: u64 = self.run("DEL", conn.del(&keys)).await?;
                deleted += count;
            }

            cursor = next_cursor;
            if cursor == 0 {
                break;
            }
        }

        Ok(deleted)
    }

    async fn try_exists(&self, key: &str) -> Result<bool, CacheError> {
        let mut conn = self.connection().await?;
        self.run("EXISTS", conn.exists::<_, bool>(key)).await
    }

    async fn try_ttl(&self, key: &str) -> Result<i64, CacheError> {
        let mut conn = self.connection().await?;
        self.run("TTL", conn.ttl::<_, i64>(key)).await
    }
}

#[async_trait]
impl CacheStore for RedisStore {
    #[instrument(skip(self), fields(cache.operation = "GET"))]
    async fn get(&self, key: &str) -> Option<String> {
        match self.try_get(key).await {
            Ok(Some(value)) => {
                debug!(cache.key = %key, "Cache hit");
                Some(value)
            }
            Ok(None) => {
                debug!(cache.key = %key, "Cache miss");
                None
            }
            Err(e) => {
                error!(cache.key = %key, error = %e, "Redis GET error");
                None
            }
        }
    }

    #[instrument(skip(self, value), fields(cache.operation = "SETEX"))]
    async fn set_with_expiry(&self, key: &str, value: &str, ttl: Duration) -> bool {
        match self.try_set(key, value, ttl).await {
            Ok(()) => {
                debug!(cache.key = %key, cache.ttl_secs = %ttl.as_secs().max(1), "Cache set");
                true
            }
            Err(e) => {
                error!(cache.key = %key, error = %e, "Redis SETEX error");
                false
            }
        }
    }

    #[instrument(skip(self), fields(cache.operation = "DEL"))]
    async fn delete(&self, key: &str) -> bool {
        match self.try_delete(key).await {
            Ok(_) => {
                debug!(cache.key = %key, "Cache invalidated");
                true
            }
            Err(e) => {
                error!(cache.key = %key, error = %e, "Redis DEL error");
                false
            }
        }
    }

    /// Uses cursor-based SCAN, which is safe for production but may be slow
    /// with many keys. Keys deleted before a failure stay deleted.
    #[instrument(skip(self), fields(cache.operation = "SCAN_DEL"))]
    async fn delete_by_pattern(&self, pattern: &str) -> Option<u64> {
        match self.try_delete_pattern(pattern).await {
            Ok(deleted) => {
                debug!(cache.pattern = %pattern, cache.deleted = %deleted, "Pattern invalidation complete");
                Some(deleted)
            }
            Err(e) => {
                error!(cache.pattern = %pattern, error = %e, "Redis pattern invalidation error");
                None
            }
        }
    }

    #[instrument(skip(self), fields(cache.operation = "EXISTS"))]
    async fn exists(&self, key: &str) -> bool {
        match self.try_exists(key).await {
            Ok(exists) => exists,
            Err(e) => {
                error!(cache.key = %key, error = %e, "Redis EXISTS error");
                false
            }
        }
    }

    #[instrument(skip(self), fields(cache.operation = "TTL"))]
    async fn ttl_of(&self, key: &str) -> Option<u64> {
        match self.try_ttl(key).await {
            Ok(ttl) if ttl >= 0 => Some(ttl as u64),
            Ok(_) => None, // -1 (no expiry) or -2 (doesn't exist)
            Err(e) => {
                error!(cache.key = %key, error = %e, "Redis TTL error");
                None
            }
        }
    }
}
