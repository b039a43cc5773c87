use std::convert::Infallible;
use std::sync::Arc;
use std::task::{Context, Poll};

use axum::{extract::Request, response::Response};
use futures_util::future::BoxFuture;
use tower::{Layer, Service};
use tracing::{info, warn};

use crate::stats::CacheStats;
use crate::store::CacheStore;

/// Layer produced by [`ResponseCache::invalidate_on`](super::ResponseCache::invalidate_on).
#[derive(Clone)]
pub struct InvalidateLayer {
    store: Arc<dyn CacheStore>,
    stats: Arc<CacheStats>,
    patterns: Arc<[String]>,
}

impl InvalidateLayer {
    pub(super) fn new(
        store: Arc<dyn CacheStore>,
        stats: Arc<CacheStats>,
        patterns: Vec<String>,
    ) -> Self {
        Self {
            store,
            stats,
            patterns: patterns.into(),
        }
    }

    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    /// Deletes every bound pattern in a detached task.
    fn spawn_invalidation(&self) {
        let store = self.store.clone();
        let stats = self.stats.clone();
        let patterns = self.patterns.clone();

        tokio::spawn(async move {
            for pattern in patterns.iter() {
                match store.delete_by_pattern(pattern).await {
                    Some(deleted) => {
                        info!(cache.pattern = %pattern, cache.deleted = deleted, "Invalidated cache pattern");
                        metrics::counter!("cache_invalidations_total", "status" => "ok").increment(1);
                    }
                    None => {
                        warn!(cache.pattern = %pattern, "Cache invalidation failed");
                        metrics::counter!("cache_invalidations_total", "status" => "error")
                            .increment(1);
                        stats.record_error();
                    }
                }
            }
        });
    }
}

impl<S> Layer<S> for InvalidateLayer {
    type Service = Invalidate<S>;

    fn layer(&self, inner: S) -> Self::Service {
        Invalidate {
            inner,
            layer: self.clone(),
        }
    }
}

/// Runs the inner service and, if it succeeded, evicts the bound key
/// patterns without delaying the response.
#[derive(Clone)]
pub struct Invalidate<S> {
    inner: S,
    layer: InvalidateLayer,
}

impl<S> Service<Request> for Invalidate<S>
where
    S: Service<Request, Response = Response, Error = Infallible> + Clone + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = Response;
    type Error = Infallible;
    type Future = BoxFuture<'static, Result<Response, Infallible>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, request: Request) -> Self::Future {
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);
        let layer = self.layer.clone();

        Box::pin(async move {
            let response = inner.call(request).await?;
            if response.status().is_success() {
                layer.spawn_invalidation();
            }
            Ok(response)
        })
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use axum::{
        Json, Router,
        http::StatusCode,
        routing::post,
    };
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use super::*;
    use crate::middleware::ResponseCache;
    use crate::middleware::test_support::{post_json, wait_for_absence};
    use crate::policy::CachePolicyTable;
    use crate::store::MemoryStore;

    const HOUR: Duration = Duration::from_secs(3600);

    async fn created() -> (StatusCode, Json<Value>) {
        (StatusCode::CREATED, Json(json!({"success": true})))
    }

    async fn rejected() -> (StatusCode, Json<Value>) {
        (StatusCode::BAD_REQUEST, Json(json!({"success": false})))
    }

    async fn seeded_cache() -> ResponseCache {
        let store = Arc::new(MemoryStore::new());
        for key in [
            "ingredients:_ingredients_search:user_U1:query_q_tomato",
            "ingredients:_ingredients_categories",
            "recipes:_recipes_suggest:user_U1:body_1f",
            "static:_categories",
        ] {
            store.set_with_expiry(key, "{}", HOUR).await;
        }
        ResponseCache::new(store, CachePolicyTable::default())
    }

    fn app(cache: &ResponseCache) -> Router {
        Router::new()
            .route(
                "/ingredients/custom-add",
                post(created).layer(cache.invalidate_on(["ingredients:*"])),
            )
            .route(
                "/ingredients/rejected",
                post(rejected).layer(cache.invalidate_on(["ingredients:*"])),
            )
            .route(
                "/ingredients/seed-dev",
                post(created).layer(cache.invalidate_on(["ingredients:*", "static:*"])),
            )
    }

    #[tokio::test]
    async fn test_success_invalidates_matching_keys_only() {
        let cache = seeded_cache().await;
        let store = cache.store();

        let response = app(&cache)
            .oneshot(post_json(
                "/ingredients/custom-add",
                r#"{"name":"kale","category":"vegetables"}"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        assert!(
            wait_for_absence(
                store.as_ref(),
                "ingredients:_ingredients_search:user_U1:query_q_tomato"
            )
            .await
        );
        assert!(wait_for_absence(store.as_ref(), "ingredients:_ingredients_categories").await);
        assert!(store.exists("recipes:_recipes_suggest:user_U1:body_1f").await);
        assert!(store.exists("static:_categories").await);
    }

    #[tokio::test]
    async fn test_failure_keeps_cache() {
        let cache = seeded_cache().await;

        let response = app(&cache)
            .oneshot(post_json("/ingredients/rejected", r#"{"name":""}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(
            cache
                .store()
                .exists("ingredients:_ingredients_categories")
                .await
        );
    }

    #[tokio::test]
    async fn test_multiple_patterns() {
        let cache = seeded_cache().await;
        let store = cache.store();

        app(&cache)
            .oneshot(post_json("/ingredients/seed-dev", ""))
            .await
            .unwrap();

        assert!(wait_for_absence(store.as_ref(), "static:_categories").await);
        assert!(wait_for_absence(store.as_ref(), "ingredients:_ingredients_categories").await);
        assert!(store.exists("recipes:_recipes_suggest:user_U1:body_1f").await);
    }

    #[tokio::test]
    async fn test_failed_patterns_count_errors_and_do_not_stop_the_rest() {
        #[derive(Debug, Default)]
        struct BrokenStore {
            attempted: std::sync::Mutex<Vec<String>>,
        }

        #[async_trait::async_trait]
        impl CacheStore for BrokenStore {
            async fn get(&self, _key: &str) -> Option<String> {
                None
            }
            async fn set_with_expiry(&self, _key: &str, _value: &str, _ttl: Duration) -> bool {
                false
            }
            async fn delete(&self, _key: &str) -> bool {
                false
            }
            async fn delete_by_pattern(&self, pattern: &str) -> Option<u64> {
                self.attempted.lock().unwrap().push(pattern.to_owned());
                None
            }
            async fn exists(&self, _key: &str) -> bool {
                false
            }
            async fn ttl_of(&self, _key: &str) -> Option<u64> {
                None
            }
        }

        let store = Arc::new(BrokenStore::default());
        let cache = ResponseCache::new(store.clone(), CachePolicyTable::default());

        let response = app(&cache)
            .oneshot(post_json("/ingredients/seed-dev", ""))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        for _ in 0..200 {
            if cache.stats_snapshot().errors == 2 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        assert_eq!(cache.stats_snapshot().errors, 2);
        assert_eq!(
            *store.attempted.lock().unwrap(),
            ["ingredients:*", "static:*"]
        );
    }

    #[test]
    fn test_patterns_kept_in_order() {
        let cache = ResponseCache::new(Arc::new(MemoryStore::new()), CachePolicyTable::default());
        let layer = cache.invalidate_on(["ingredients:*", "static:*"]);
        assert_eq!(layer.patterns(), ["ingredients:*", "static:*"]);
    }
}
