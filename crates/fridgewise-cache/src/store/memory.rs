//! In-process cache store.
//!
//! Honors the same contract as the Redis store: expiry is enforced on read
//! and pattern deletion understands Redis glob syntax (`*`, `?`, `[...]`,
//! `\`). Used by the `memory` backend and throughout the tests.

use std::collections::HashMap;
use std::sync::{Arc, Weak};
use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, error, info};

use super::{CacheError, CacheStore};

#[derive(Debug, Clone)]
struct Entry {
    value: String,
    expires_at: Instant,
}

impl Entry {
    fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

/// Thread-safe in-memory store with per-entry TTL.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, Entry>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live entries.
    pub async fn len(&self) -> usize {
        let now = Instant::now();
        let entries = self.entries.read().await;
        entries.values().filter(|e| !e.is_expired(now)).count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Drops every expired entry and returns how many were removed.
    pub async fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired(now));
        before - entries.len()
    }

    /// Spawns a background task that purges expired entries every
    /// `interval`. The task ends once the store is dropped.
    pub fn spawn_sweeper(store: &Arc<Self>, interval: Duration) -> JoinHandle<()> {
        let weak: Weak<Self> = Arc::downgrade(store);

        tokio::spawn(async move {
            info!(
                interval_secs = interval.as_secs(),
                "Starting cache expiry sweeper"
            );

            loop {
                tokio::time::sleep(interval).await;

                let Some(store) = weak.upgrade() else {
                    debug!("Cache store dropped; stopping expiry sweeper");
                    break;
                };

                let removed = store.purge_expired().await;
                if removed > 0 {
                    debug!(cache.removed = removed, "Purged expired cache entries");
                }
            }
        })
    }

    async fn try_delete_pattern(&self, pattern: &str) -> Result<u64, CacheError> {
        let matcher = glob_to_regex(pattern)?;
        let now = Instant::now();
        let mut entries = self.entries.write().await;
        let before = entries.len();
        let mut expired = 0;

        entries.retain(|key, entry| {
            if entry.is_expired(now) {
                expired += 1;
                return false;
            }
            !matcher.is_match(key)
        });

        Ok((before - entries.len() - expired) as u64)
    }
}

#[async_trait]
impl CacheStore for MemoryStore {
    async fn get(&self, key: &str) -> Option<String> {
        let entries = self.entries.read().await;
        entries
            .get(key)
            .filter(|entry| !entry.is_expired(Instant::now()))
            .map(|entry| entry.value.clone())
    }

    async fn set_with_expiry(&self, key: &str, value: &str, ttl: Duration) -> bool {
        let ttl = ttl.max(Duration::from_secs(1));
        let entry = Entry {
            value: value.to_owned(),
            expires_at: Instant::now() + ttl,
        };
        self.entries.write().await.insert(key.to_owned(), entry);
        debug!(cache.key = %key, cache.ttl_secs = ttl.as_secs(), "Cache set");
        true
    }

    async fn delete(&self, key: &str) -> bool {
        self.entries.write().await.remove(key);
        true
    }

    async fn delete_by_pattern(&self, pattern: &str) -> Option<u64> {
        match self.try_delete_pattern(pattern).await {
            Ok(deleted) => {
                debug!(cache.pattern = %pattern, cache.deleted = %deleted, "Pattern invalidation complete");
                Some(deleted)
            }
            Err(e) => {
                error!(cache.pattern = %pattern, error = %e, "Pattern invalidation failed");
                None
            }
        }
    }

    async fn exists(&self, key: &str) -> bool {
        self.get(key).await.is_some()
    }

    async fn ttl_of(&self, key: &str) -> Option<u64> {
        let now = Instant::now();
        let entries = self.entries.read().await;
        let entry = entries.get(key).filter(|e| !e.is_expired(now))?;
        let remaining = entry.expires_at - now;
        let secs = remaining.as_secs() + u64::from(remaining.subsec_nanos() > 0);
        Some(secs)
    }
}

/// Compiles a Redis glob pattern into an anchored regex.
fn glob_to_regex(pattern: &str) -> Result<Regex, regex::Error> {
    let chars: Vec<char> = pattern.chars().collect();
    let mut out = String::with_capacity(pattern.len() * 2 + 6);
    out.push_str("(?s)^");

    let mut i = 0;
    while i < chars.len() {
        match chars[i] {
            '*' => out.push_str(".*"),
            '?' => out.push('.'),
            '\\' if i + 1 < chars.len() => {
                i += 1;
                out.push_str(&regex::escape(&chars[i].to_string()));
            }
            '[' => match chars[i + 1..].iter().position(|c| *c == ']') {
                Some(offset) if offset > 0 => {
                    let class = &chars[i + 1..i + 1 + offset];
                    out.push('[');
                    for (n, c) in class.iter().enumerate() {
                        match c {
                            '^' if n == 0 => out.push('^'),
                            '-' if n > 0 && n + 1 < class.len() => out.push('-'),
                            c => out.push_str(&regex::escape(&c.to_string())),
                        }
                    }
                    out.push(']');
                    i += offset + 1;
                }
                _ => out.push_str(r"\["),
            },
            c => out.push_str(&regex::escape(&c.to_string())),
        }
        i += 1;
    }

    out.push('$');
    Regex::new(&out)
}
