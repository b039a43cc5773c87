use axum::{
    Router, middleware,
    routing::{get, post},
};
use fridgewise_cache::{CacheOptions, ContentType, cache_stats_middleware};

use crate::middleware::auth::require_auth;
use crate::state::AppState;

use super::controller::{generate_recipe, get_recipe, rate_recipe, suggest_recipes};

/// Every recipe route requires authentication.
pub fn init_recipes_router(state: &AppState) -> Router<AppState> {
    let cache = &state.cache;

    Router::new()
        .route(
            "/suggest",
            post(suggest_recipes)
                .layer(cache.cache_for(ContentType::Recipes, CacheOptions::default())),
        )
        .route(
            "/generate-ai",
            post(generate_recipe)
                .layer(cache.cache_for(ContentType::AiResults, CacheOptions::default())),
        )
        .route(
            "/{id}",
            get(get_recipe).layer(
                cache.cache_for(ContentType::Recipes, CacheOptions::default().with_path_params()),
            ),
        )
        .route(
            "/{id}/rate",
            post(rate_recipe).layer(cache.invalidate_on(["recipes:*"])),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth))
        .layer(middleware::from_fn_with_state(
            cache.stats(),
            cache_stats_middleware,
        ))
}
