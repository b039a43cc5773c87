use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::HeaderValue,
    middleware::Next,
    response::Response,
};

use super::{CACHE_STATS_HEADER, CACHE_STATUS_HEADER};
use crate::stats::CacheStats;

/// Counts every request, classifies it by the `X-Cache` marker the
/// read-through layer set, and attaches the resulting snapshot as
/// `X-Cache-Stats`.
///
/// # Example
///
/// ```ignore
/// let app = Router::new()
///     .merge(ingredient_routes)
///     .layer(axum::middleware::from_fn_with_state(cache.stats(), cache_stats_middleware));
/// ```
pub async fn cache_stats_middleware(
    State(stats): State<Arc<CacheStats>>,
    request: Request,
    next: Next,
) -> Response {
    stats.record_request();

    let mut response = next.run(request).await;

    match response
        .headers()
        .get(CACHE_STATUS_HEADER)
        .and_then(|v| v.to_str().ok())
    {
        Some("HIT") => stats.record_hit(),
        Some("MISS") => stats.record_miss(),
        _ => {}
    }

    if let Ok(value) = HeaderValue::from_str(&stats.snapshot().to_header_json()) {
        response.headers_mut().insert(CACHE_STATS_HEADER, value);
    }

    response
}

#[cfg(test)]
mod tests {
    use axum::{Json, Router, middleware, routing::get};
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use super::*;
    use crate::middleware::test_support::{get as get_req, wait_for_key};
    use crate::middleware::{CacheOptions, ResponseCache};
    use crate::policy::{CachePolicyTable, ContentType};
    use crate::store::MemoryStore;

    async fn categories() -> Json<Value> {
        Json(json!({"success": true, "data": ["dairy", "grains"]}))
    }

    async fn health() -> &'static str {
        "ok"
    }

    fn app(cache: &ResponseCache) -> Router {
        Router::new()
            .route(
                "/api/ingredients/categories",
                get(categories).layer(cache.cache_for(ContentType::Ingredients, CacheOptions::shared())),
            )
            .route("/api/ingredients/ping", get(health))
            .layer(middleware::from_fn_with_state(
                cache.stats(),
                cache_stats_middleware,
            ))
    }

    fn stats_header(response: &Response) -> Value {
        let raw = response.headers()[CACHE_STATS_HEADER].to_str().unwrap();
        serde_json::from_str(raw).unwrap()
    }

    #[tokio::test]
    async fn test_stats_track_hits_and_misses() {
        let cache = ResponseCache::new(Arc::new(MemoryStore::new()), CachePolicyTable::default());
        let app = app(&cache);

        let first = app
            .clone()
            .oneshot(get_req("/api/ingredients/categories"))
            .await
            .unwrap();
        assert_eq!(
            stats_header(&first),
            json!({"hitRate": 0.0, "totalRequests": 1, "hits": 0, "misses": 1, "errors": 0})
        );

        assert!(
            wait_for_key(
                cache.store().as_ref(),
                "ingredients:_ingredients_categories"
            )
            .await
        );

        let second = app
            .clone()
            .oneshot(get_req("/api/ingredients/categories"))
            .await
            .unwrap();
        assert_eq!(
            stats_header(&second),
            json!({"hitRate": 0.5, "totalRequests": 2, "hits": 1, "misses": 1, "errors": 0})
        );

        let third = app.oneshot(get_req("/api/ingredients/ping")).await.unwrap();
        let snapshot = stats_header(&third);
        assert_eq!(snapshot["totalRequests"], 3);
        assert_eq!(snapshot["hits"], 1);
        assert_eq!(snapshot["misses"], 1);
    }

    #[tokio::test]
    async fn test_snapshot_matches_counter() {
        let cache = ResponseCache::new(Arc::new(MemoryStore::new()), CachePolicyTable::default());
        app(&cache)
            .oneshot(get_req("/api/ingredients/ping"))
            .await
            .unwrap();

        let snapshot = cache.stats_snapshot();
        assert_eq!(snapshot.total_requests, 1);
        assert_eq!(snapshot.hit_rate, 0.0);
    }
}
