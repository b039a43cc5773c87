use std::sync::OnceLock;
use std::time::{Duration, Instant};

use axum::{
    Router,
    extract::{MatchedPath, Request},
    middleware::Next,
    response::Response,
    routing::get,
};
use metrics::{Unit, counter, describe_counter, describe_histogram, gauge, histogram};
use metrics_exporter_prometheus::{BuildError, Matcher, PrometheusBuilder, PrometheusHandle};
use tracing::{error, info};

static OBSERVABILITY_ENABLED: OnceLock<bool> = OnceLock::new();

/// Sub-millisecond cache hits up to minute-long AI misses.
const LATENCY_BUCKETS: &[f64] = &[
    0.0005, 0.001, 0.0025, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0,
    60.0,
];

/// `OBSERVABILITY_ENABLED=false` (or `0`) turns metrics and OTLP export off.
pub fn is_observability_enabled() -> bool {
    *OBSERVABILITY_ENABLED.get_or_init(|| {
        std::env::var("OBSERVABILITY_ENABLED")
            .map(|v| v.to_lowercase() != "false" && v != "0")
            .unwrap_or(true)
    })
}

fn install_recorder() -> Result<PrometheusHandle, BuildError> {
    PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Suffix("_duration_seconds".to_string()),
            LATENCY_BUCKETS,
        )?
        .install_recorder()
}

fn describe_metrics() {
    describe_counter!(
        "http_requests_total",
        "HTTP requests by method, route, status and cache outcome"
    );
    describe_histogram!(
        "http_request_duration_seconds",
        Unit::Seconds,
        "Time to produce a response, cache hits included"
    );
    describe_counter!(
        "cache_lookups_total",
        "Response cache lookups by content type and result"
    );
    describe_counter!(
        "cache_writes_total",
        "Background response cache writes by status"
    );
    describe_counter!(
        "cache_invalidations_total",
        "Pattern invalidations triggered by writes"
    );
    describe_counter!("ai_requests_total", "AI provider calls by operation");
    describe_counter!("jwt_validations_total", "Bearer token checks by outcome");
}

/// Installs the Prometheus recorder and starts its upkeep task.
///
/// Returns `None` when observability is off or a recorder is already
/// installed.
pub fn init_metrics() -> Option<PrometheusHandle> {
    if !is_observability_enabled() {
        return None;
    }

    let handle = match install_recorder() {
        Ok(handle) => handle,
        Err(e) => {
            error!(error = %e, "Failed to install Prometheus recorder");
            return None;
        }
    };
    describe_metrics();
    info!("Prometheus recorder installed");

    let upkeep = handle.clone();
    tokio::spawn(async move {
        loop {
            tokio::time::sleep(Duration::from_secs(5)).await;
            upkeep.run_upkeep();
        }
    });

    Some(handle)
}

/// Records request count and latency per route template.
///
/// The `cache` label carries the `X-Cache` outcome set by the response
/// cache, or `none` for routes that are not cached.
pub async fn metrics_middleware(req: Request, next: Next) -> Response {
    if !is_observability_enabled() {
        return next.run(req).await;
    }

    let start = Instant::now();
    let method = req.method().as_str().to_owned();
    let route = req
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_owned())
        .unwrap_or_else(|| "unmatched".to_owned());

    gauge!("http_requests_active").increment(1.0);
    let response = next.run(req).await;
    gauge!("http_requests_active").decrement(1.0);

    let cache = match response
        .headers()
        .get("x-cache")
        .and_then(|v| v.to_str().ok())
    {
        Some("HIT") => "hit",
        Some("MISS") => "miss",
        _ => "none",
    };

    counter!(
        "http_requests_total",
        "method" => method.clone(),
        "route" => route.clone(),
        "status" => response.status().as_u16().to_string(),
        "cache" => cache
    )
    .increment(1);
    histogram!(
        "http_request_duration_seconds",
        "method" => method,
        "route" => route,
        "cache" => cache
    )
    .record(start.elapsed().as_secs_f64());

    response
}

/// Router served on the metrics port.
pub fn metrics_app(handle: PrometheusHandle) -> Router {
    Router::new().route("/metrics", get(move || async move { handle.render() }))
}

pub fn track_jwt_validation(success: bool) {
    if !is_observability_enabled() {
        return;
    }
    let status = if success { "valid" } else { "invalid" };
    counter!("jwt_validations_total", "status" => status).increment(1);
}

/// Counts AI provider calls, e.g. `track_ai_request("detect_ingredients", "ollama", true)`.
pub fn track_ai_request(operation: &str, provider: &str, success: bool) {
    if !is_observability_enabled() {
        return;
    }
    let status = if success { "success" } else { "error" };
    counter!(
        "ai_requests_total",
        "operation" => operation.to_string(),
        "provider" => provider.to_string(),
        "status" => status
    )
    .increment(1);
}
