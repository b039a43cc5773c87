//! HTTP response caching middleware.
//!
//! [`ResponseCache`] is built once at startup and hands out per-route
//! layers:
//!
//! - [`ResponseCache::cache_for`] serves stored responses and records new
//!   ones ([`ReadThroughLayer`])
//! - [`ResponseCache::invalidate_on`] evicts key namespaces after a
//!   successful mutation ([`InvalidateLayer`])
//! - [`cache_stats_middleware`] counts hits and misses and reports them in
//!   `X-Cache-Stats`
//!
//! # Example
//!
//! ```ignore
//! use axum::{Router, middleware, routing::{get, post}};
//! use fridgewise_cache::{CacheOptions, ContentType, ResponseCache, cache_stats_middleware};
//!
//! let routes = Router::new()
//!     .route(
//!         "/ingredients/categories",
//!         get(categories).layer(cache.cache_for(ContentType::Ingredients, CacheOptions::shared())),
//!     )
//!     .route(
//!         "/ingredients/custom-add",
//!         post(add).layer(cache.invalidate_on(["ingredients:*"])),
//!     )
//!     .layer(middleware::from_fn_with_state(cache.stats(), cache_stats_middleware));
//! ```

mod invalidate;
mod read_through;
mod stats;

use std::sync::Arc;
use std::time::Duration;

use crate::config::CacheConfig;
use crate::policy::{CachePolicyTable, ContentType};
use crate::stats::{CacheStats, StatsSnapshot};
use crate::store::{CacheError, CacheStore, build_store};

pub use self::invalidate::{Invalidate, InvalidateLayer};
pub use self::read_through::{ReadThrough, ReadThroughLayer};
pub use self::stats::cache_stats_middleware;

/// `HIT` or `MISS`.
pub const CACHE_STATUS_HEADER: &str = "x-cache";
/// The key the response was looked up under.
pub const CACHE_KEY_HEADER: &str = "x-cache-key";
/// JSON statistics snapshot.
pub const CACHE_STATS_HEADER: &str = "x-cache-stats";

/// Identity of the authenticated caller, used to scope cache keys.
///
/// Authentication middleware inserts this as a request extension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheUser(pub String);

/// Per-route key scoping and policy overrides.
#[derive(Debug, Clone, Default)]
pub struct CacheOptions {
    /// Leave the user out of the key so every caller shares one entry.
    pub ignore_user: bool,
    pub ttl: Option<Duration>,
    pub prefix: Option<String>,
    /// Include the route's path parameters in the key.
    pub include_path_params: bool,
    /// Extra parts appended at the end of the key.
    pub custom_parts: Vec<String>,
}

impl CacheOptions {
    /// Options for content that is identical for every caller.
    pub fn shared() -> Self {
        Self {
            ignore_user: true,
            ..Self::default()
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    pub fn with_path_params(mut self) -> Self {
        self.include_path_params = true;
        self
    }

    pub fn with_part(mut self, part: impl Into<String>) -> Self {
        self.custom_parts.push(part.into());
        self
    }
}

#[derive(Debug, Clone)]
struct CacheSettings {
    route_base: String,
    max_body_bytes: usize,
}

/// Shared response cache: store, policies, statistics and settings.
///
/// Cloning is cheap; all clones share the same statistics.
#[derive(Debug, Clone)]
pub struct ResponseCache {
    store: Arc<dyn CacheStore>,
    policies: Arc<CachePolicyTable>,
    stats: Arc<CacheStats>,
    settings: Arc<CacheSettings>,
}

impl ResponseCache {
    pub fn new(store: Arc<dyn CacheStore>, policies: CachePolicyTable) -> Self {
        let defaults = CacheConfig::default();
        Self {
            store,
            policies: Arc::new(policies),
            stats: Arc::new(CacheStats::new()),
            settings: Arc::new(CacheSettings {
                route_base: defaults.route_base,
                max_body_bytes: defaults.max_body_bytes,
            }),
        }
    }

    /// Builds the configured store and policy table.
    ///
    /// # Errors
    ///
    /// Returns `CacheError::Connection` if the Redis URL is malformed.
    /// Connectivity itself is not checked here.
    pub fn from_config(config: &CacheConfig) -> Result<Self, CacheError> {
        let store = build_store(config)?;
        let cache = Self::new(store, CachePolicyTable::from_config(config))
            .with_route_base(config.route_base.clone())
            .with_max_body_bytes(config.max_body_bytes);
        Ok(cache)
    }

    /// Prefix stripped from matched routes before they enter a key.
    pub fn with_route_base(mut self, route_base: impl Into<String>) -> Self {
        Arc::make_mut(&mut self.settings).route_base = route_base.into();
        self
    }

    pub fn with_max_body_bytes(mut self, limit: usize) -> Self {
        Arc::make_mut(&mut self.settings).max_body_bytes = limit;
        self
    }

    pub fn store(&self) -> Arc<dyn CacheStore> {
        self.store.clone()
    }

    pub fn policies(&self) -> &CachePolicyTable {
        &self.policies
    }

    pub fn stats(&self) -> Arc<CacheStats> {
        self.stats.clone()
    }

    pub fn stats_snapshot(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    /// Read-through caching for one route, using the policy of `content_type`.
    pub fn cache_for(&self, content_type: ContentType, options: CacheOptions) -> ReadThroughLayer {
        let policy = self.policies.resolve(content_type);
        let ttl = options
            .ttl
            .unwrap_or_else(|| Duration::from_secs(policy.ttl_seconds));
        let prefix = options
            .prefix
            .clone()
            .unwrap_or_else(|| policy.key_prefix.clone());

        ReadThroughLayer::new(self.clone(), content_type, prefix, ttl, options)
    }

    /// Evicts every key matching `patterns` after a 2xx response.
    pub fn invalidate_on<I, S>(&self, patterns: I) -> InvalidateLayer
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        InvalidateLayer::new(
            self.store.clone(),
            self.stats.clone(),
            patterns.into_iter().map(Into::into).collect(),
        )
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::time::Duration;

    use axum::{body::Body, http::Request};
    use http_body_util::BodyExt;

    use crate::store::CacheStore;

    pub async fn body_string(body: Body) -> String {
        let bytes = body.collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    pub fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    pub fn post_json(uri: &str, json: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(json.to_owned()))
            .unwrap()
    }

    /// Background writes are detached; poll until one lands.
    pub async fn wait_for_key(store: &dyn CacheStore, key: &str) -> bool {
        for _ in 0..200 {
            if store.exists(key).await {
                return true;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        false
    }

    pub async fn wait_for_absence(store: &dyn CacheStore, key: &str) -> bool {
        for _ in 0..200 {
            if !store.exists(key).await {
                return true;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn cache() -> ResponseCache {
        ResponseCache::new(Arc::new(MemoryStore::new()), CachePolicyTable::default())
    }

    #[test]
    fn test_cache_for_uses_policy() {
        let layer = cache().cache_for(ContentType::Ingredients, CacheOptions::default());
        assert_eq!(layer.prefix(), "ingredients");
        assert_eq!(layer.ttl(), Duration::from_secs(43_200));
    }

    #[test]
    fn test_cache_for_overrides() {
        let layer = cache().cache_for(
            ContentType::AiResults,
            CacheOptions::default()
                .with_ttl(Duration::from_secs(30))
                .with_prefix("vision"),
        );
        assert_eq!(layer.prefix(), "vision");
        assert_eq!(layer.ttl(), Duration::from_secs(30));
    }

    #[test]
    fn test_clones_share_stats() {
        let a = cache();
        let b = a.clone().with_route_base("/v1");
        a.stats().record_request();
        assert_eq!(b.stats_snapshot().total_requests, 1);
    }

    #[test]
    fn test_options_builders() {
        let options = CacheOptions::shared().with_path_params().with_part("v2");
        assert!(options.ignore_user);
        assert!(options.include_path_params);
        assert_eq!(options.custom_parts, vec!["v2".to_string()]);
    }
}
