use axum::http::{HeaderValue, Method, StatusCode, Uri, header};
use axum::{Json, Router, middleware};
use fridgewise_observability::{logging_middleware, metrics_middleware};
use serde_json::{Value, json};
use tower_http::cors::{AllowOrigin, CorsLayer};
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable as _};

use crate::docs::ApiDoc;
use crate::modules::health::init_health_router;
use crate::modules::ingredients::init_ingredients_router;
use crate::modules::recipes::init_recipes_router;
use crate::state::AppState;

pub fn init_router(state: AppState) -> Router {
    Router::new()
        .merge(Scalar::with_url("/scalar", ApiDoc::openapi()))
        .merge(init_health_router())
        .nest(
            "/api",
            Router::new()
                .nest("/ingredients", init_ingredients_router(&state))
                .nest("/recipes", init_recipes_router(&state)),
        )
        .fallback(route_not_found)
        .with_state(state.clone())
        .layer(cors_layer(&state))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(middleware::from_fn(logging_middleware))
}

fn cors_layer(state: &AppState) -> CorsLayer {
    let origins = if state.cors_config.allows_any() {
        AllowOrigin::mirror_request()
    } else {
        let allowed_origins: Vec<HeaderValue> = state
            .cors_config
            .allowed_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();
        AllowOrigin::list(allowed_origins)
    };

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
        .expose_headers([
            header::HeaderName::from_static(fridgewise_cache::CACHE_STATUS_HEADER),
            header::HeaderName::from_static(fridgewise_cache::CACHE_KEY_HEADER),
            header::HeaderName::from_static(fridgewise_cache::CACHE_STATS_HEADER),
        ])
        .allow_credentials(true)
}

async fn route_not_found(uri: Uri) -> (StatusCode, Json<Value>) {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "success": false,
            "error": "Route not found",
            "path": uri.path(),
        })),
    )
}
