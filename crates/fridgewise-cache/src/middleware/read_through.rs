use std::convert::Infallible;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;

use axum::{
    body::{Body, Bytes},
    extract::{FromRequestParts, MatchedPath, Query, RawPathParams, Request},
    http::{
        HeaderValue, Method, StatusCode,
        header::CONTENT_TYPE,
        request::Parts,
    },
    response::{IntoResponse, Response},
};
use futures_util::future::BoxFuture;
use http_body_util::{BodyExt, LengthLimitError, Limited};
use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};
use serde::de::IgnoredAny;
use tower::{Layer, Service};
use tracing::{debug, error, info, warn};

use super::{CACHE_KEY_HEADER, CACHE_STATUS_HEADER, CacheOptions, CacheUser, ResponseCache};
use crate::fingerprint::request_body_fingerprint;
use crate::keys::{CacheKeyBuilder, normalize_route};
use crate::policy::ContentType;

/// Layer produced by [`ResponseCache::cache_for`].
#[derive(Clone)]
pub struct ReadThroughLayer {
    cache: ResponseCache,
    content_type: ContentType,
    prefix: Arc<str>,
    ttl: Duration,
    options: Arc<CacheOptions>,
}

impl ReadThroughLayer {
    pub(super) fn new(
        cache: ResponseCache,
        content_type: ContentType,
        prefix: String,
        ttl: Duration,
        options: CacheOptions,
    ) -> Self {
        Self {
            cache,
            content_type,
            prefix: prefix.into(),
            ttl,
            options: Arc::new(options),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }
}

impl<S> Layer<S> for ReadThroughLayer {
    type Service = ReadThrough<S>;

    fn layer(&self, inner: S) -> Self::Service {
        ReadThrough {
            inner,
            layer: self.clone(),
        }
    }
}

/// Serves stored responses; on a miss runs the inner service and stores a
/// successful JSON response in the background.
#[derive(Clone)]
pub struct ReadThrough<S> {
    inner: S,
    layer: ReadThroughLayer,
}

impl<S> Service<Request> for ReadThrough<S>
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
        let inner = std::mem::replace(&mut self.inner, clone);
        let layer = self.layer.clone();

        Box::pin(async move { Ok(layer.handle(inner, request).await) })
    }
}

fn fingerprints_body(method: &Method) -> bool {
    matches!(
        *method,
        Method::POST | Method::PUT | Method::PATCH | Method::DELETE
    )
}

/// Control bytes and `%` are escaped; non-ASCII bytes always are.
const HEADER_UNSAFE: &AsciiSet = &CONTROLS.add(b'%');

/// Sets `name` to `value`, percent-encoding anything a header cannot carry
/// (`ingredients:...:query_q_jalape%C3%B1o`).
fn set_header(response: &mut Response, name: &'static str, value: &str) {
    let encoded = utf8_percent_encode(value, HEADER_UNSAFE).to_string();
    match HeaderValue::from_str(&encoded) {
        Ok(value) => {
            response.headers_mut().insert(name, value);
        }
        Err(e) => warn!(header = name, error = %e, "Skipping unencodable header value"),
    }
}

impl ReadThroughLayer {
    async fn cache_key(&self, parts: &mut Parts, body: &[u8]) -> String {
        let template = parts
            .extensions
            .get::<MatchedPath>()
            .map(|path| path.as_str().to_owned())
            .unwrap_or_else(|| parts.uri.path().to_owned());
        let route = normalize_route(&self.cache.settings.route_base, &template);

        let user = if self.options.ignore_user {
            None
        } else {
            parts.extensions.get::<CacheUser>().map(|u| u.0.clone())
        };

        let query = Query::<Vec<(String, String)>>::try_from_uri(&parts.uri)
            .map(|Query(pairs)| pairs)
            .unwrap_or_default();

        let params: Vec<(String, String)> = if self.options.include_path_params {
            match RawPathParams::from_request_parts(parts, &()).await {
                Ok(params) => params
                    .iter()
                    .map(|(name, value)| (name.to_owned(), value.to_owned()))
                    .collect(),
                Err(_) => Vec::new(),
            }
        } else {
            Vec::new()
        };

        let body = if fingerprints_body(&parts.method) {
            request_body_fingerprint(body)
        } else {
            None
        };

        CacheKeyBuilder::new(self.prefix.as_ref(), route)
            .user(user.as_deref())
            .query(query)
            .params(params)
            .body_fingerprint(body)
            .custom(self.options.custom_parts.iter().cloned())
            .build()
    }

    async fn handle<S>(self, mut inner: S, request: Request) -> Response
    where
        S: Service<Request, Response = Response, Error = Infallible>,
    {
        let (mut parts, body) = request.into_parts();

        let (body, bytes) = if fingerprints_body(&parts.method) {
            let limit = self.cache.settings.max_body_bytes;
            match Limited::new(body, limit).collect().await {
                Ok(collected) => {
                    let bytes = collected.to_bytes();
                    (Body::from(bytes.clone()), bytes)
                }
                Err(e) if e.is::<LengthLimitError>() => {
                    warn!(limit, "Request body exceeds cache fingerprint limit");
                    return StatusCode::PAYLOAD_TOO_LARGE.into_response();
                }
                Err(e) => {
                    warn!(error = %e, "Failed to read request body");
                    return StatusCode::BAD_REQUEST.into_response();
                }
            }
        } else {
            (body, Bytes::new())
        };

        let key = self.cache_key(&mut parts, &bytes).await;
        self.respond(&mut inner, Request::from_parts(parts, body), key)
            .await
    }

    async fn respond<S>(&self, inner: &mut S, request: Request, key: String) -> Response
    where
        S: Service<Request, Response = Response, Error = Infallible>,
    {
        let content_type = self.content_type.as_str();

        if let Some(cached) = self.cache.store.get(&key).await {
            info!(cache.key = %key, "Cache HIT");
            metrics::counter!("cache_lookups_total", "content_type" => content_type, "result" => "hit")
                .increment(1);

            let mut response = (
                StatusCode::OK,
                [(CONTENT_TYPE, HeaderValue::from_static("application/json"))],
                cached,
            )
                .into_response();
            response
                .headers_mut()
                .insert(CACHE_STATUS_HEADER, HeaderValue::from_static("HIT"));
            set_header(&mut response, CACHE_KEY_HEADER, &key);
            return response;
        }

        info!(cache.key = %key, "Cache MISS");
        metrics::counter!("cache_lookups_total", "content_type" => content_type, "result" => "miss")
            .increment(1);

        let mut response = match inner.call(request).await {
            Ok(response) => response,
            Err(never) => match never {},
        };
        response
            .headers_mut()
            .insert(CACHE_STATUS_HEADER, HeaderValue::from_static("MISS"));
        set_header(&mut response, CACHE_KEY_HEADER, &key);

        if !response.status().is_success() {
            return response;
        }

        let (parts, body) = response.into_parts();
        let bytes = match body.collect().await {
            Ok(collected) => collected.to_bytes(),
            Err(e) => {
                error!(cache.key = %key, error = %e, "Failed to buffer response body");
                return (parts, Body::empty()).into_response();
            }
        };

        self.schedule_write(key, &bytes);
        Response::from_parts(parts, Body::from(bytes))
    }

    /// Stores `bytes` under `key` in a detached task when they are JSON.
    fn schedule_write(&self, key: String, bytes: &Bytes) {
        let payload = match std::str::from_utf8(bytes) {
            Ok(text) if serde_json::from_str::<IgnoredAny>(text).is_ok() => text.to_owned(),
            _ => {
                debug!(cache.key = %key, "Response body is not JSON; not caching");
                return;
            }
        };

        let store = self.cache.store.clone();
        let stats = self.cache.stats.clone();
        let ttl = self.ttl;

        tokio::spawn(async move {
            if store.set_with_expiry(&key, &payload, ttl).await {
                metrics::counter!("cache_writes_total", "status" => "ok").increment(1);
            } else {
                error!(cache.key = %key, "Background caching failed");
                metrics::counter!("cache_writes_total", "status" => "error").increment(1);
                stats.record_error();
            }
        });
    }
}
