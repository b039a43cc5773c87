//! Response cache configuration.
//!
//! This module provides configuration for the cache store backend, Redis
//! connection settings and per-content-type TTL overrides, loaded from
//! environment variables.

use std::collections::HashMap;
use std::env;
use std::time::Duration;

use crate::policy::ContentType;

/// Which store implementation backs the response cache.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StoreBackend {
    Redis,
    Memory,
}

impl StoreBackend {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "redis" => Some(Self::Redis),
            "memory" => Some(Self::Memory),
            _ => None,
        }
    }
}

/// Response cache configuration loaded from environment variables.
///
/// # Environment Variables
///
/// - `CACHE_BACKEND`: `redis` or `memory` (default: `redis`)
/// - `REDIS_URL`: Redis connection URL (default: `redis://127.0.0.1:6379`)
/// - `REDIS_CONNECT_TIMEOUT_MS`: connect timeout (default: `2000`)
/// - `REDIS_COMMAND_TIMEOUT_MS`: per-command timeout (default: `1000`)
/// - `CACHE_ROUTE_BASE`: prefix stripped from route templates (default: `/api`)
/// - `CACHE_MAX_BODY_BYTES`: largest request body buffered for fingerprinting
///   (default: 10 MiB)
/// - `CACHE_DEFAULT_TTL_SECONDS`: TTL of the fallback policy (default: `3600`)
/// - `CACHE_TTL_<TAG>`: TTL override for one content type, e.g.
///   `CACHE_TTL_AI_RESULTS=600`
#[derive(Clone, Debug)]
pub struct CacheConfig {
    pub backend: StoreBackend,

    /// Redis connection URL.
    pub redis_url: String,

    pub connect_timeout: Duration,
    pub command_timeout: Duration,

    /// Mount prefix removed from matched routes before they enter a key.
    pub route_base: String,

    pub max_body_bytes: usize,

    /// TTL of the fallback policy used for unknown content types.
    pub default_ttl_seconds: u64,

    /// Per-content-type TTL overrides.
    pub ttl_overrides: HashMap<ContentType, u64>,
}

impl CacheConfig {
    /// Load configuration from environment variables.
    ///
    /// Unparseable values fall back to their defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let ttl_overrides = ContentType::ALL
            .iter()
            .filter_map(|ct| {
                env_parse::<u64>(&format!("CACHE_TTL_{}", ct.env_suffix())).map(|ttl| (*ct, ttl))
            })
            .collect();

        Self {
            backend: env::var("CACHE_BACKEND")
                .ok()
                .and_then(|v| StoreBackend::parse(&v))
                .unwrap_or(defaults.backend),
            redis_url: env::var("REDIS_URL").unwrap_or(defaults.redis_url),
            connect_timeout: env_parse("REDIS_CONNECT_TIMEOUT_MS")
                .map(Duration::from_millis)
                .unwrap_or(defaults.connect_timeout),
            command_timeout: env_parse("REDIS_COMMAND_TIMEOUT_MS")
                .map(Duration::from_millis)
                .unwrap_or(defaults.command_timeout),
            route_base: env::var("CACHE_ROUTE_BASE").unwrap_or(defaults.route_base),
            max_body_bytes: env_parse("CACHE_MAX_BODY_BYTES").unwrap_or(defaults.max_body_bytes),
            default_ttl_seconds: env_parse("CACHE_DEFAULT_TTL_SECONDS")
                .unwrap_or(defaults.default_ttl_seconds),
            ttl_overrides,
        }
    }

    /// In-memory configuration with default settings, used by tests and the
    /// `memory` backend.
    pub fn in_memory() -> Self {
        Self {
            backend: StoreBackend::Memory,
            ..Self::default()
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::Redis,
            redis_url: "redis://127.0.0.1:6379".into(),
            connect_timeout: Duration::from_millis(2000),
            command_timeout: Duration::from_millis(1000),
            route_base: "/api".into(),
            max_body_bytes: 10 * 1024 * 1024,
            default_ttl_seconds: 3600,
            ttl_overrides: HashMap::new(),
        }
    }
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.trim().parse().ok())
}
