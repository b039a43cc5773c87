use axum::{
    Router, middleware,
    routing::{get, post},
};
use fridgewise_cache::{CacheOptions, ContentType, cache_stats_middleware};

use crate::middleware::auth::require_auth;
use crate::state::AppState;

use super::controller::{
    add_custom_ingredient, detect_from_image, get_categories, get_ingredient_by_id,
    get_total_count, search_ingredients, seed_ingredients,
};

pub fn init_ingredients_router(state: &AppState) -> Router<AppState> {
    let cache = &state.cache;

    let public = Router::new()
        .route(
            "/categories",
            get(get_categories)
                .layer(cache.cache_for(ContentType::Ingredients, CacheOptions::shared())),
        )
        .route(
            "/total-count",
            get(get_total_count)
                .layer(cache.cache_for(ContentType::Ingredients, CacheOptions::shared())),
        )
        .route(
            "/seed-dev",
            post(seed_ingredients).layer(cache.invalidate_on(["ingredients:*", "static:*"])),
        );

    let protected = Router::new()
        .route(
            "/detect-from-image",
            post(detect_from_image)
                .layer(cache.cache_for(ContentType::AiResults, CacheOptions::default())),
        )
        .route(
            "/search",
            get(search_ingredients)
                .layer(cache.cache_for(ContentType::Ingredients, CacheOptions::default())),
        )
        .route(
            "/custom-add",
            post(add_custom_ingredient).layer(cache.invalidate_on(["ingredients:*"])),
        )
        .route(
            "/{id}",
            get(get_ingredient_by_id).layer(cache.cache_for(
                ContentType::Ingredients,
                CacheOptions::default().with_path_params(),
            )),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    public.merge(protected).layer(middleware::from_fn_with_state(
        cache.stats(),
        cache_stats_middleware,
    ))
}
