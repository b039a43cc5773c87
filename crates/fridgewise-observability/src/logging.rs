use std::time::Instant;

use axum::{
    extract::{MatchedPath, Request},
    middleware::Next,
    response::Response,
};
use opentelemetry::{KeyValue, global, trace::TraceError};
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::{
    Resource,
    propagation::TraceContextPropagator,
    runtime,
    trace::{RandomIdGenerator, Sampler, Tracer},
};
use opentelemetry_semantic_conventions::resource::{SERVICE_NAME, SERVICE_VERSION};
use tracing::{Instrument, error, info, info_span, warn};
use tracing_subscriber::{EnvFilter, Layer, layer::SubscriberExt, util::SubscriberInitExt};

use crate::basic_logging::init_basic_console_logging;
use crate::metrics::is_observability_enabled;

const DEFAULT_LOG_DIR: &str = "storage/logs";

fn log_dir() -> String {
    std::env::var("LOG_DIR").unwrap_or_else(|_| DEFAULT_LOG_DIR.to_string())
}

/// Wraps each request in an `http_request` span carrying a fresh request
/// id and the route template, then logs the outcome at a level matching
/// the status class.
pub async fn logging_middleware(req: Request, next: Next) -> Response {
    let route = req
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| req.uri().path().to_string());
    let span = info_span!(
        "http_request",
        request_id = %uuid::Uuid::new_v4(),
        method = %req.method(),
        route = %route,
    );

    async move {
        let start = Instant::now();
        let response = next.run(req).await;
        let latency_ms = start.elapsed().as_millis() as u64;
        let status = response.status().as_u16();
        let cache = response
            .headers()
            .get("x-cache")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("-");

        if response.status().is_server_error() {
            error!(status, cache, latency_ms, "Server error");
        } else if response.status().is_client_error() {
            warn!(status, cache, latency_ms, "Client error");
        } else {
            info!(status, cache, latency_ms, "Request completed");
        }

        response
    }
    .instrument(span)
    .await
}

fn init_tracer() -> Result<Tracer, TraceError> {
    let otlp_endpoint = std::env::var("OTEL_EXPORTER_OTLP_ENDPOINT")
        .unwrap_or_else(|_| "http://localhost:4317".to_string());

    info!(endpoint = %otlp_endpoint, "Initializing OpenTelemetry tracer");

    global::set_text_map_propagator(TraceContextPropagator::new());

    let resource = Resource::new(vec![
        KeyValue::new(SERVICE_NAME, "fridgewise"),
        KeyValue::new(SERVICE_VERSION, env!("CARGO_PKG_VERSION")),
        KeyValue::new(
            "environment",
            std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
        ),
    ]);

    let otlp_exporter = opentelemetry_otlp::new_exporter()
        .tonic()
        .with_endpoint(otlp_endpoint);

    opentelemetry_otlp::new_pipeline()
        .tracing()
        .with_exporter(otlp_exporter)
        .with_trace_config(
            opentelemetry_sdk::trace::Config::default()
                .with_sampler(Sampler::AlwaysOn)
                .with_id_generator(RandomIdGenerator::default())
                .with_resource(resource),
        )
        .install_batch(runtime::Tokio)
}

/// Installs the global subscriber: compact console output, daily-rolling
/// error and JSON files under `LOG_DIR` (default `storage/logs`), and an
/// OTLP exporter when one can be built. Falls back to console-only logging when
/// `OBSERVABILITY_ENABLED=false`.
pub fn init_tracing() {
    use tracing_appender::rolling::{RollingFileAppender, Rotation};
    use tracing_subscriber::fmt;

    if !is_observability_enabled() {
        init_basic_console_logging();
        return;
    }

    let log_dir = log_dir();
    if let Err(e) = std::fs::create_dir_all(&log_dir) {
        eprintln!("Failed to create {log_dir}: {e}. Using console logging only");
        init_basic_console_logging();
        return;
    }

    let console_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(
            "fridgewise=info,fridgewise_cache=info,tower_http=warn,hyper=info,tonic=info",
        )
    });

    let console_layer = fmt::layer()
        .with_target(false)
        .with_file(true)
        .with_line_number(true)
        .compact()
        .with_filter(console_filter);

    let file_appender = RollingFileAppender::new(Rotation::DAILY, &log_dir, "fridgewise.log");
    let file_layer = fmt::layer()
        .with_writer(file_appender)
        .with_target(false)
        .with_file(true)
        .with_line_number(true)
        .with_ansi(false)
        .with_filter(EnvFilter::new("error"));

    // Structured logs for Loki
    let json_appender = RollingFileAppender::new(Rotation::DAILY, &log_dir, "fridgewise.json");
    let json_layer = fmt::layer()
        .json()
        .with_writer(json_appender)
        .with_current_span(true)
        .with_span_list(true)
        .with_filter(EnvFilter::new("info"));

    match init_tracer() {
        Ok(tracer) => {
            let otel_layer = tracing_opentelemetry::layer().with_tracer(tracer);

            tracing_subscriber::registry()
                .with(console_layer)
                .with(file_layer)
                .with(json_layer)
                .with(otel_layer)
                .init();

            info!("Tracing initialized with OpenTelemetry and file logging");
        }
        Err(e) => {
            eprintln!(
                "Failed to initialize OpenTelemetry: {}. Continuing without tracing...",
                e
            );

            tracing_subscriber::registry()
                .with(console_layer)
                .with(file_layer)
                .with(json_layer)
                .init();

            warn!("Tracing initialized without OpenTelemetry (file logging only)");
        }
    }
}

pub async fn shutdown_tracer() {
    info!("Shutting down OpenTelemetry tracer...");
    global::shutdown_tracer_provider();
}
