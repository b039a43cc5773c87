//! Logging, tracing and Prometheus metrics for the FridgeWise API.
//!
//! With the default `observability` feature the server gets JSON logs,
//! optional OTLP trace export and a Prometheus endpoint whose request
//! metrics are labelled with the response cache outcome. Setting
//! `OBSERVABILITY_ENABLED=false` at runtime, or building without the
//! feature, falls back to [`init_basic_console_logging`] and no-op metric
//! hooks, so call sites never need their own `cfg` gates.
//!
//! ```no_run
//! use fridgewise_observability::{init_tracing, shutdown_tracer};
//!
//! #[tokio::main]
//! async fn main() {
//!     init_tracing();
//!     // serve...
//!     shutdown_tracer().await;
//! }
//! ```

pub mod basic_logging;
#[cfg(feature = "observability")]
pub mod logging;
#[cfg(feature = "observability")]
pub mod metrics;

pub use basic_logging::init_basic_console_logging;

#[cfg(feature = "observability")]
pub use logging::{init_tracing, logging_middleware, shutdown_tracer};
#[cfg(feature = "observability")]
pub use metrics::{
    init_metrics, is_observability_enabled, metrics_app, metrics_middleware, track_ai_request,
    track_jwt_validation,
};
#[cfg(feature = "observability")]
pub use metrics_exporter_prometheus::PrometheusHandle;

#[cfg(not(feature = "observability"))]
mod disabled {
    use axum::{Router, extract::Request, middleware::Next, response::Response};

    pub fn is_observability_enabled() -> bool {
        false
    }

    pub fn init_tracing() {
        super::init_basic_console_logging();
    }

    pub async fn shutdown_tracer() {}

    pub async fn logging_middleware(req: Request, next: Next) -> Response {
        next.run(req).await
    }

    pub async fn metrics_middleware(req: Request, next: Next) -> Response {
        next.run(req).await
    }

    pub fn init_metrics() -> Option<()> {
        None
    }

    pub fn metrics_app(_handle: ()) -> Router {
        Router::new()
    }

    pub fn track_jwt_validation(_success: bool) {}

    pub fn track_ai_request(_operation: &str, _provider: &str, _success: bool) {}
}

#[cfg(not(feature = "observability"))]
pub use disabled::*;
