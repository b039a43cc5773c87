//! # FridgeWise Cache
//!
//! Redis-backed HTTP response caching for the FridgeWise API.
//!
//! This crate provides:
//! - A fail-open key-value store adapter ([`CacheStore`]) with Redis and
//!   in-memory implementations
//! - Deterministic cache key generation from route, user, query and body
//! - Canonical request-body fingerprints
//! - Read-through caching and pattern-based invalidation as `tower` layers
//! - Process-wide hit/miss statistics
//!
//! # Example
//!
//! ```ignore
//! use fridgewise_cache::{CacheConfig, CacheOptions, ContentType, ResponseCache};
//!
//! let cache = ResponseCache::from_config(&CacheConfig::from_env())?;
//!
//! let router = Router::new()
//!     .route(
//!         "/ingredients/search",
//!         get(search).layer(cache.cache_for(ContentType::Ingredients, CacheOptions::default())),
//!     )
//!     .route(
//!         "/ingredients/custom-add",
//!         post(add).layer(cache.invalidate_on(["ingredients:*"])),
//!     );
//! ```

pub mod config;
pub mod fingerprint;
pub mod keys;
pub mod middleware;
pub mod policy;
pub mod stats;
pub mod store;


pub use config::{CacheConfig, StoreBackend};
pub use fingerprint::{
    UNKNOWN_FINGERPRINT, canonicalize, fingerprint, fingerprint_bytes, fingerprint_serializable,
    request_body_fingerprint,
};
pub use keys::{CacheKeyBuilder, normalize_route};
pub use middleware::{
    CACHE_KEY_HEADER, CACHE_STATS_HEADER, CACHE_STATUS_HEADER, CacheOptions, CacheUser,
    InvalidateLayer, ReadThroughLayer, ResponseCache, cache_stats_middleware,
};
pub use policy::{CachePolicy, CachePolicyTable, ContentType};
pub use stats::{CacheStats, StatsSnapshot};
pub use store::{CacheError, CacheStore, CacheStoreExt, MemoryStore, RedisStore, build_store};
