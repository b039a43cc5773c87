//! # FridgeWise CLI
//!
//! Helpers behind the `fridgewise-cli` binary: offline key computation,
//! policy listing and entry inspection against any [`CacheStore`].
//!
//! ## Usage
//!
//! ```ignore
//! use fridgewise_cli::{KeyRequest, compute_key};
//! use fridgewise_cache::{CachePolicyTable, ContentType};
//!
//! let request = KeyRequest::new(ContentType::Ingredients, "/api/ingredients/search")
//!     .with_user("U1")
//!     .with_query("q", "tomato");
//! let key = compute_key(&CachePolicyTable::default(), "/api", &request)?;
//! ```

use anyhow::{Context, bail};
use fridgewise_cache::{
    CacheKeyBuilder, CachePolicyTable, CacheStore, ContentType, normalize_route,
    request_body_fingerprint,
};

/// Inputs for computing a cache key without a running server.
#[derive(Debug, Clone)]
pub struct KeyRequest {
    pub content_type: ContentType,
    /// Route template as mounted, e.g. `/api/ingredients/{id}`
    pub route: String,
    pub user: Option<String>,
    pub query: Vec<(String, String)>,
    pub params: Vec<(String, String)>,
    /// Raw request body
    pub body: Option<String>,
}

impl KeyRequest {
    pub fn new(content_type: ContentType, route: impl Into<String>) -> Self {
        Self {
            content_type,
            route: route.into(),
            user: None,
            query: Vec::new(),
            params: Vec::new(),
            body: None,
        }
    }

    pub fn with_user(mut self, user: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self
    }

    pub fn with_query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((name.into(), value.into()));
        self
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }
}

/// Computes the key the read-through layer would use for `request`.
///
/// Bodies follow the request rules: empty objects, arrays and primitives do
/// not contribute, and non-JSON bodies are hashed over their bytes.
pub fn compute_key(
    policies: &CachePolicyTable,
    route_base: &str,
    request: &KeyRequest,
) -> anyhow::Result<String> {
    if !request.route.starts_with('/') {
        bail!("Route must start with '/': {}", request.route);
    }

    let policy = policies.resolve(request.content_type);
    let body = request
        .body
        .as_deref()
        .and_then(|b| request_body_fingerprint(b.as_bytes()));

    Ok(CacheKeyBuilder::new(
        policy.key_prefix.clone(),
        normalize_route(route_base, &request.route),
    )
    .user(request.user.as_deref())
    .query(request.query.iter().cloned())
    .params(request.params.iter().cloned())
    .body_fingerprint(body)
    .build())
}

/// Parses a `name=value` argument.
pub fn parse_pair(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((name, value)) if !name.is_empty() => Ok((name.to_string(), value.to_string())),
        _ => Err(format!("expected name=value, got '{}'", raw)),
    }
}

pub fn parse_content_type(raw: &str) -> Result<ContentType, String> {
    raw.parse()
}

/// Pattern that matches every entry of one content type.
pub fn pattern_for(policies: &CachePolicyTable, content_type: ContentType) -> String {
    format!("{}:*", policies.resolve(content_type).key_prefix)
}

/// Policy table as aligned text, one content type per line.
pub fn render_policies(policies: &CachePolicyTable) -> String {
    let mut out = format!("{:<14} {:>10}  {}\n", "CONTENT TYPE", "TTL (s)", "PREFIX");
    for (content_type, policy) in policies.entries() {
        out.push_str(&format!(
            "{:<14} {:>10}  {}\n",
            content_type.as_str(),
            policy.ttl_seconds,
            policy.key_prefix
        ));
    }
    out.push_str(&format!(
        "{:<14} {:>10}  {}\n",
        "(fallback)",
        policies.fallback().ttl_seconds,
        policies.fallback().key_prefix
    ));
    out
}

/// Stored value, pretty-printed when it is JSON.
pub fn pretty(raw: &str) -> String {
    serde_json::from_str::<serde_json::Value>(raw)
        .ok()
        .and_then(|v| serde_json::to_string_pretty(&v).ok())
        .unwrap_or_else(|| raw.to_string())
}

/// Value and remaining TTL of one entry, `None` when it is absent.
pub async fn inspect(
    store: &dyn CacheStore,
    key: &str,
) -> anyhow::Result<Option<(String, Option<u64>)>> {
    match store.get(key).await {
        Some(value) => Ok(Some((value, store.ttl_of(key).await))),
        None => Ok(None),
    }
}

/// Deletes every key matching `pattern` and returns how many were removed.
pub async fn flush(store: &dyn CacheStore, pattern: &str) -> anyhow::Result<u64> {
    store
        .delete_by_pattern(pattern)
        .await
        .context("Cache store unavailable; nothing was deleted")
}

#[cfg(test)]
mod tests {
    use super::*;
    use fridgewise_cache::MemoryStore;
    use std::time::Duration;

    #[test]
    fn test_compute_search_key() {
        let request = KeyRequest::new(ContentType::Ingredients, "/api/ingredients/search")
            .with_user("U1")
            .with_query("q", "tomato");

        let key = compute_key(&CachePolicyTable::default(), "/api", &request).unwrap();
        assert_eq!(key, "ingredients:_ingredients_search:user_U1:query_q_tomato");
    }

    #[test]
    fn test_compute_key_with_body() {
        let a = KeyRequest::new(ContentType::AiResults, "/api/recipes/generate-ai")
            .with_body(r#"{"ingredients":["egg"],"servings":2}"#);
        let b = KeyRequest::new(ContentType::AiResults, "/api/recipes/generate-ai")
            .with_body(r#"{"servings":2,"ingredients":["egg"]}"#);

        let table = CachePolicyTable::default();
        let key_a = compute_key(&table, "/api", &a).unwrap();
        assert!(key_a.starts_with("ai:_recipes_generate-ai:body_"));
        assert_eq!(key_a, compute_key(&table, "/api", &b).unwrap());

        let empty = KeyRequest::new(ContentType::AiResults, "/api/recipes/generate-ai")
            .with_body("{}");
        assert_eq!(
            compute_key(&table, "/api", &empty).unwrap(),
            "ai:_recipes_generate-ai"
        );
    }

    #[test]
    fn test_compute_key_rejects_relative_route() {
        let request = KeyRequest::new(ContentType::Recipes, "recipes/suggest");
        assert!(compute_key(&CachePolicyTable::default(), "/api", &request).is_err());
    }

    #[test]
    fn test_parse_pair() {
        assert_eq!(
            parse_pair("q=tomato"),
            Ok(("q".to_string(), "tomato".to_string()))
        );
        assert_eq!(parse_pair("q="), Ok(("q".to_string(), String::new())));
        assert!(parse_pair("tomato").is_err());
        assert!(parse_pair("=tomato").is_err());
    }

    #[test]
    fn test_pattern_for_uses_prefix() {
        let table = CachePolicyTable::default();
        assert_eq!(pattern_for(&table, ContentType::AiResults), "ai:*");
        assert_eq!(pattern_for(&table, ContentType::StaticData), "static:*");
    }

    #[test]
    fn test_render_policies_lists_every_type() {
        let rendered = render_policies(&CachePolicyTable::default());
        for ct in ContentType::ALL {
            assert!(rendered.contains(ct.as_str()));
        }
        assert!(rendered.contains("604800"));
        assert!(rendered.contains("(fallback)"));
    }

    #[test]
    fn test_pretty_leaves_plain_text() {
        assert_eq!(pretty("not json"), "not json");
        assert_eq!(pretty(r#"{"a":1}"#), "{\n  \"a\": 1\n}");
    }

    #[tokio::test]
    async fn test_inspect_and_flush() {
        let store = MemoryStore::new();
        store
            .set_with_expiry("ingredients:_ingredients_categories", "{}", Duration::from_secs(60))
            .await;
        store
            .set_with_expiry("recipes:_recipes_suggest", "{}", Duration::from_secs(60))
            .await;

        let (value, ttl) = inspect(&store, "ingredients:_ingredients_categories")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(value, "{}");
        assert!(ttl.is_some_and(|t| t <= 60));
        assert!(inspect(&store, "missing").await.unwrap().is_none());

        assert_eq!(flush(&store, "ingredients:*").await.unwrap(), 1);
        assert!(store.exists("recipes:_recipes_suggest").await);
    }
}
