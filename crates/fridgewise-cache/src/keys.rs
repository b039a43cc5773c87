//! Cache key generation.
//!
//! Keys are built from a fixed sequence of `:`-separated parts:
//!
//! ```text
//! {prefix}:{route}[:user_{id}][:query_{k}_{v}...][:params_{k}_{v}...][:body_{hex}][:{custom}...]
//! ```
//!
//! Query and path parameters are sorted by name, so requests that differ
//! only in parameter order share a key.

use std::collections::BTreeMap;

/// Turns a route template into a single key part.
///
/// `route_base` is stripped when it prefixes the template, then `/`, `:`,
/// `{` and `}` are rewritten to `_` so the template cannot introduce key
/// separators.
///
/// ```
/// use fridgewise_cache::normalize_route;
///
/// assert_eq!(normalize_route("/api", "/api/ingredients/search"), "_ingredients_search");
/// assert_eq!(normalize_route("/api", "/api/ingredients/{id}"), "_ingredients__id_");
/// ```
pub fn normalize_route(route_base: &str, template: &str) -> String {
    let base = route_base.trim_end_matches('/');
    let stripped = match template.strip_prefix(base) {
        Some(rest) if !base.is_empty() && (rest.is_empty() || rest.starts_with('/')) => rest,
        _ => template,
    };
    let stripped = if stripped.is_empty() { "/" } else { stripped };

    stripped
        .chars()
        .map(|c| match c {
            '/' | ':' | '{' | '}' => '_',
            c => c,
        })
        .collect()
}

/// Collects name/value pairs into sorted names, keeping repeated values in
/// arrival order.
fn group_pairs<I, K, V>(pairs: I) -> BTreeMap<String, Vec<String>>
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
{
    let mut grouped: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for (name, value) in pairs {
        grouped.entry(name.into()).or_default().push(value.into());
    }
    grouped
}

fn render_pairs(label: &str, grouped: &BTreeMap<String, Vec<String>>) -> Option<String> {
    if grouped.is_empty() {
        return None;
    }
    let joined = grouped
        .iter()
        .map(|(name, values)| format!("{}_{}", name, values.join(",")))
        .collect::<Vec<_>>()
        .join("_");
    Some(format!("{label}_{joined}"))
}

/// Builder for cache keys.
///
/// Parts may be supplied in any order; [`build`](Self::build) always
/// assembles them in the documented sequence.
#[derive(Debug, Clone, Default)]
pub struct CacheKeyBuilder {
    prefix: String,
    route: String,
    user: Option<String>,
    query: BTreeMap<String, Vec<String>>,
    params: BTreeMap<String, Vec<String>>,
    body: Option<String>,
    custom: Vec<String>,
}

impl CacheKeyBuilder {
    /// Starts a key for `route`, which must already be normalized
    /// (see [`normalize_route`]).
    pub fn new(prefix: impl Into<String>, route: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            route: route.into(),
            ..Self::default()
        }
    }

    /// Scopes the key to a user. `None` leaves the key shared.
    ///
    /// `:` in the id is rewritten to `_`, so a subject cannot forge the
    /// parts that follow it.
    pub fn user(mut self, user_id: Option<&str>) -> Self {
        self.user = user_id.map(|id| id.replace(':', "_"));
        self
    }

    pub fn query<I, K, V>(mut self, pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.query = group_pairs(pairs);
        self
    }

    pub fn params<I, K, V>(mut self, pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.params = group_pairs(pairs);
        self
    }

    /// Adds a body fingerprint (see [`crate::fingerprint`]).
    pub fn body_fingerprint(mut self, fingerprint: Option<String>) -> Self {
        self.body = fingerprint;
        self
    }

    pub fn custom<I, S>(mut self, parts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.custom.extend(parts.into_iter().map(Into::into));
        self
    }

    pub fn build(self) -> String {
        let mut parts = vec![self.prefix, self.route];

        if let Some(user) = self.user {
            parts.push(format!("user_{user}"));
        }
        parts.extend(render_pairs("query", &self.query));
        parts.extend(render_pairs("params", &self.params));
        if let Some(body) = self.body {
            parts.push(format!("body_{body}"));
        }
        parts.extend(self.custom);

        parts.join(":")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_key() {
        let key = CacheKeyBuilder::new("ingredients", normalize_route("/api", "/api/ingredients/search"))
            .user(Some("U1"))
            .query([("q", "tomato")])
            .build();
        assert_eq!(key, "ingredients:_ingredients_search:user_U1:query_q_tomato");
    }

    #[test]
    fn test_shared_key_has_no_user() {
        let key = CacheKeyBuilder::new("ingredients", normalize_route("/api", "/api/ingredients/categories"))
            .user(None)
            .build();
        assert_eq!(key, "ingredients:_ingredients_categories");
    }

    #[test]
    fn test_query_sorted_and_repeats_joined() {
        let key = CacheKeyBuilder::new("recipes", "_recipes")
            .query([("tag", "quick"), ("cuisine", "thai"), ("tag", "vegan")])
            .build();
        assert_eq!(key, "recipes:_recipes:query_cuisine_thai_tag_quick,vegan");
    }

    #[test]
    fn test_part_order_is_fixed() {
        let key = CacheKeyBuilder::new("ai", "_recipes_generate-ai")
            .custom(["v2"])
            .body_fingerprint(Some("1f3a".into()))
            .params([("id", "42")])
            .query([("lang", "en")])
            .user(Some("7"))
            .build();
        assert_eq!(
            key,
            "ai:_recipes_generate-ai:user_7:query_lang_en:params_id_42:body_1f3a:v2"
        );
    }

    #[test]
    fn test_user_cannot_forge_later_parts() {
        let route = normalize_route("/api", "/api/ingredients/categories");
        let forged = CacheKeyBuilder::new("ingredients", route.clone())
            .user(Some("U1:query_q_tomato"))
            .build();
        let real = CacheKeyBuilder::new("ingredients", route)
            .user(Some("U1"))
            .query([("q", "tomato")])
            .build();

        assert_eq!(forged, "ingredients:_ingredients_categories:user_U1_query_q_tomato");
        assert_ne!(forged, real);
    }

    #[test]
    fn test_normalize_route() {
        assert_eq!(normalize_route("/api", "/api/ingredients/{id}"), "_ingredients__id_");
        assert_eq!(normalize_route("/api/", "/api/recipes/{id}/rate"), "_recipes__id__rate");
        assert_eq!(normalize_route("/api", "/apiary/hives"), "_apiary_hives");
        assert_eq!(normalize_route("/api", "/api"), "_");
        assert_eq!(normalize_route("", "/health"), "_health");
        assert_eq!(normalize_route("/api", "/legacy/:id"), "_legacy__id");
    }
}
