//! Key-value store adapter.
//!
//! [`CacheStore`] is the fail-open contract the middleware is written
//! against: every operation degrades to an "absent" value on failure and
//! logs the cause instead of returning an error.

mod memory;
mod redis;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Serialize, de::DeserializeOwned};
use tracing::{error, info};

use crate::config::{CacheConfig, StoreBackend};

pub use self::memory::MemoryStore;
pub use self::redis::RedisStore;

/// How often the in-memory backend drops expired entries.
const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Error type for cache store operations.
///
/// These never cross the [`CacheStore`] boundary; they are logged and
/// collapsed to absence values.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("Redis connection error: {0}")]
    Connection(#[from] ::redis::RedisError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Redis {0} timed out")]
    Timeout(&'static str),

    #[error("Invalid key pattern: {0}")]
    Pattern(#[from] regex::Error),
}

/// Best-effort key-value store with per-entry expiry.
///
/// Values are raw serialized strings; callers own the encoding.
#[async_trait]
pub trait CacheStore: Send + Sync + std::fmt::Debug {
    /// Returns the stored value, or `None` when absent, expired or unreachable.
    async fn get(&self, key: &str) -> Option<String>;

    /// Stores `value` under `key`, expiring after `ttl`. Returns `false` on failure.
    async fn set_with_expiry(&self, key: &str, value: &str, ttl: Duration) -> bool;

    /// Removes `key`. Returns `false` only when the store could not be reached.
    async fn delete(&self, key: &str) -> bool;

    /// Removes every key matching the glob `pattern`.
    ///
    /// Returns the number of deleted keys, or `None` on failure.
    async fn delete_by_pattern(&self, pattern: &str) -> Option<u64>;

    async fn exists(&self, key: &str) -> bool;

    /// Remaining lifetime of `key` in whole seconds.
    ///
    /// `None` when the key is absent, has no expiry, or the store failed.
    async fn ttl_of(&self, key: &str) -> Option<u64>;
}

/// Typed JSON helpers on top of the raw string interface.
#[async_trait]
pub trait CacheStoreExt: CacheStore {
    async fn get_json<T>(&self, key: &str) -> Option<T>
    where
        T: DeserializeOwned + Send,
    {
        let raw = self.get(key).await?;
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                error!(cache.key = %key, error = %e, "Failed to deserialize cached value");
                None
            }
        }
    }

    async fn set_json<T>(&self, key: &str, value: &T, ttl: Duration) -> bool
    where
        T: Serialize + Send + Sync,
    {
        match serde_json::to_string(value) {
            Ok(raw) => self.set_with_expiry(key, &raw, ttl).await,
            Err(e) => {
                error!(cache.key = %key, error = %e, "Failed to serialize value for cache");
                false
            }
        }
    }
}

impl<S: CacheStore + ?Sized> CacheStoreExt for S {}

/// Builds the store selected by `config.backend`.
///
/// Redis connects lazily, so this only fails on a malformed URL. The memory
/// backend starts its expiry sweeper when called inside a Tokio runtime.
pub fn build_store(config: &CacheConfig) -> Result<Arc<dyn CacheStore>, CacheError> {
    match config.backend {
        StoreBackend::Redis => {
            let store = RedisStore::new(
                &config.redis_url,
                config.connect_timeout,
                config.command_timeout,
            )?;
            info!(redis.url = %config.redis_url, "Using Redis cache store");
            Ok(Arc::new(store))
        }
        StoreBackend::Memory => {
            let store = Arc::new(MemoryStore::new());
            if tokio::runtime::Handle::try_current().is_ok() {
                MemoryStore::spawn_sweeper(&store, SWEEP_INTERVAL);
            }
            info!("Using in-memory cache store");
            Ok(store)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Recipe {
        id: u32,
        title: String,
    }

    #[tokio::test]
    async fn test_json_helpers_round_trip() {
        let store: Arc<dyn CacheStore> = Arc::new(MemoryStore::new());
        let recipe = Recipe {
            id: 7,
            title: "Shakshuka".into(),
        };

        assert!(
            store
                .set_json("recipes:7", &recipe, Duration::from_secs(60))
                .await
        );
        let loaded: Option<Recipe> = store.get_json("recipes:7").await;
        assert_eq!(loaded, Some(recipe));
    }

    #[tokio::test]
    async fn test_get_json_treats_garbage_as_absent() {
        let store = MemoryStore::new();
        store
            .set_with_expiry("recipes:bad", "{not json", Duration::from_secs(60))
            .await;

        let loaded: Option<Recipe> = store.get_json("recipes:bad").await;
        assert!(loaded.is_none());
    }

    #[tokio::test]
    async fn test_build_memory_store() {
        let store = build_store(&CacheConfig::in_memory()).unwrap();
        assert!(store.set_with_expiry("k", "v", Duration::from_secs(5)).await);
        assert_eq!(store.get("k").await.as_deref(), Some("v"));
    }

    #[test]
    fn test_build_redis_store_rejects_bad_url() {
        let config = CacheConfig {
            redis_url: "not a url".into(),
            ..CacheConfig::default()
        };
        assert!(build_store(&config).is_err());
    }
}
