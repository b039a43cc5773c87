//! Per-content-type cache policies.
//!
//! Every cached route names a [`ContentType`]; the policy table maps it to
//! the TTL and key prefix its entries are written with.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::config::CacheConfig;

/// Content-type tag of a cached response.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ContentType {
    Nutrition,
    Ingredients,
    Recipes,
    AiResults,
    Images,
    StaticData,
    UserSessions,
    PopularCombos,
}

impl ContentType {
    pub const ALL: [ContentType; 8] = [
        ContentType::Nutrition,
        ContentType::Ingredients,
        ContentType::Recipes,
        ContentType::AiResults,
        ContentType::Images,
        ContentType::StaticData,
        ContentType::UserSessions,
        ContentType::PopularCombos,
    ];

    /// The tag as written in configuration and metrics labels.
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::Nutrition => "nutrition",
            ContentType::Ingredients => "ingredients",
            ContentType::Recipes => "recipes",
            ContentType::AiResults => "aiResults",
            ContentType::Images => "images",
            ContentType::StaticData => "staticData",
            ContentType::UserSessions => "userSessions",
            ContentType::PopularCombos => "popularCombos",
        }
    }

    /// Suffix of the `CACHE_TTL_<TAG>` override variable.
    pub fn env_suffix(&self) -> &'static str {
        match self {
            ContentType::Nutrition => "NUTRITION",
            ContentType::Ingredients => "INGREDIENTS",
            ContentType::Recipes => "RECIPES",
            ContentType::AiResults => "AI_RESULTS",
            ContentType::Images => "IMAGES",
            ContentType::StaticData => "STATIC_DATA",
            ContentType::UserSessions => "USER_SESSIONS",
            ContentType::PopularCombos => "POPULAR_COMBOS",
        }
    }

    /// Built-in policy for this content type.
    pub fn default_policy(&self) -> CachePolicy {
        let (ttl_seconds, key_prefix) = match self {
            ContentType::Nutrition => (86_400, "nutrition"),
            ContentType::Ingredients => (43_200, "ingredients"),
            ContentType::Recipes => (3_600, "recipes"),
            ContentType::AiResults => (7_200, "ai"),
            ContentType::Images => (604_800, "images"),
            ContentType::StaticData => (2_592_000, "static"),
            ContentType::UserSessions => (7_200, "session"),
            ContentType::PopularCombos => (604_800, "popular"),
        };
        CachePolicy::new(ttl_seconds, key_prefix)
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContentType {
    type Err = String;

    /// Accepts both the camelCase tag (`aiResults`) and kebab/snake spellings
    /// (`ai-results`, `ai_results`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| *c != '-' && *c != '_')
            .collect::<String>()
            .to_ascii_lowercase();

        ContentType::ALL
            .iter()
            .find(|ct| ct.as_str().to_ascii_lowercase() == normalized)
            .copied()
            .ok_or_else(|| format!("unknown content type: {s}"))
    }
}

/// TTL and key prefix for one content type.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CachePolicy {
    pub ttl_seconds: u64,
    pub key_prefix: String,
}

impl CachePolicy {
    pub fn new(ttl_seconds: u64, key_prefix: impl Into<String>) -> Self {
        Self {
            ttl_seconds,
            key_prefix: key_prefix.into(),
        }
    }
}

/// Static mapping from content type to policy.
///
/// Content types without an entry resolve to the fallback policy.
#[derive(Clone, Debug)]
pub struct CachePolicyTable {
    policies: HashMap<ContentType, CachePolicy>,
    fallback: CachePolicy,
}

impl CachePolicyTable {
    /// Table with every built-in policy and the given fallback TTL.
    pub fn new(default_ttl_seconds: u64) -> Self {
        let policies = ContentType::ALL
            .iter()
            .map(|ct| (*ct, ct.default_policy()))
            .collect();

        Self {
            policies,
            fallback: CachePolicy::new(default_ttl_seconds, "recipes"),
        }
    }

    /// Table with built-in policies plus the configured TTL overrides.
    pub fn from_config(config: &CacheConfig) -> Self {
        let mut table = Self::new(config.default_ttl_seconds);
        for (ct, ttl) in &config.ttl_overrides {
            if let Some(policy) = table.policies.get_mut(ct) {
                policy.ttl_seconds = *ttl;
            }
        }
        table
    }

    /// Table with no per-type entries; everything resolves to the fallback.
    pub fn empty(fallback: CachePolicy) -> Self {
        Self {
            policies: HashMap::new(),
            fallback,
        }
    }

    pub fn insert(&mut self, content_type: ContentType, policy: CachePolicy) {
        self.policies.insert(content_type, policy);
    }

    pub fn resolve(&self, content_type: ContentType) -> &CachePolicy {
        self.policies.get(&content_type).unwrap_or(&self.fallback)
    }

    pub fn fallback(&self) -> &CachePolicy {
        &self.fallback
    }

    /// All entries, ordered as [`ContentType::ALL`].
    pub fn entries(&self) -> Vec<(ContentType, &CachePolicy)> {
        ContentType::ALL
            .iter()
            .map(|ct| (*ct, self.resolve(*ct)))
            .collect()
    }
}

impl Default for CachePolicyTable {
    fn default() -> Self {
        Self::new(3600)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_policies() {
        let table = CachePolicyTable::default();
        assert_eq!(
            table.resolve(ContentType::Ingredients),
            &CachePolicy::new(43_200, "ingredients")
        );
        assert_eq!(
            table.resolve(ContentType::AiResults),
            &CachePolicy::new(7_200, "ai")
        );
        assert_eq!(
            table.resolve(ContentType::StaticData),
            &CachePolicy::new(2_592_000, "static")
        );
    }

    #[test]
    fn test_missing_entry_falls_back() {
        let table = CachePolicyTable::empty(CachePolicy::new(60, "recipes"));
        assert_eq!(
            table.resolve(ContentType::Nutrition),
            &CachePolicy::new(60, "recipes")
        );
    }

    #[test]
    fn test_overrides_apply() {
        let mut config = CacheConfig::default();
        config.ttl_overrides.insert(ContentType::AiResults, 600);
        config.default_ttl_seconds = 120;

        let table = CachePolicyTable::from_config(&config);
        assert_eq!(table.resolve(ContentType::AiResults).ttl_seconds, 600);
        assert_eq!(table.resolve(ContentType::AiResults).key_prefix, "ai");
        assert_eq!(table.resolve(ContentType::Recipes).ttl_seconds, 3_600);
        assert_eq!(table.fallback().ttl_seconds, 120);
    }

    #[test]
    fn test_content_type_parse() {
        assert_eq!("aiResults".parse(), Ok(ContentType::AiResults));
        assert_eq!("ai-results".parse(), Ok(ContentType::AiResults));
        assert_eq!("STATIC_DATA".parse(), Ok(ContentType::StaticData));
        assert!("weather".parse::<ContentType>().is_err());
    }

    #[test]
    fn test_serde_tag() {
        let json = serde_json::to_string(&ContentType::PopularCombos).unwrap();
        assert_eq!(json, "\"popularCombos\"");
    }

    #[test]
    fn test_entries_cover_all_types() {
        let table = CachePolicyTable::default();
        assert_eq!(table.entries().len(), ContentType::ALL.len());
    }
}
