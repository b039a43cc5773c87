use fridgewise_auth::Claims;
use fridgewise_models::{
    CategoryCount, CreateCustomIngredientDto, CustomIngredientResponse, DetectIngredientsDto,
    DetectedIngredient, DetectionResult, Difficulty, EstimatedNutrition, GenerateRecipeDto,
    GeneratedIngredient, GeneratedRecipe, Ingredient, IngredientCategory, IngredientResponse,
    IngredientSearchResponse, MatchedIngredient, MissingIngredient, Nutrition, PageInfo,
    ProviderInfo, RateRecipeDto, Rating, RatingResponse, Recipe, RecipeFilters,
    RecipeIngredient, RecipeResponse, RecipeSuggestions, SeedResponse, SeededIngredient,
    StorageType, SuggestRecipesDto, SuggestRecipesResponse, SuggestedRecipe, TotalCountResponse,
};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::modules::health::controller::HealthResponse;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::modules::health::controller::health,
        crate::modules::ingredients::controller::get_categories,
        crate::modules::ingredients::controller::get_total_count,
        crate::modules::ingredients::controller::seed_ingredients,
        crate::modules::ingredients::controller::detect_from_image,
        crate::modules::ingredients::controller::search_ingredients,
        crate::modules::ingredients::controller::add_custom_ingredient,
        crate::modules::ingredients::controller::get_ingredient_by_id,
        crate::modules::recipes::controller::suggest_recipes,
        crate::modules::recipes::controller::generate_recipe,
        crate::modules::recipes::controller::get_recipe,
        crate::modules::recipes::controller::rate_recipe,
    ),
    components(
        schemas(
            Claims,
            HealthResponse,
            Ingredient,
            IngredientCategory,
            StorageType,
            Nutrition,
            EstimatedNutrition,
            CategoryCount,
            TotalCountResponse,
            IngredientSearchResponse,
            IngredientResponse,
            CreateCustomIngredientDto,
            CustomIngredientResponse,
            SeedResponse,
            SeededIngredient,
            DetectIngredientsDto,
            DetectedIngredient,
            MatchedIngredient,
            ProviderInfo,
            DetectionResult,
            Recipe,
            RecipeIngredient,
            Difficulty,
            Rating,
            RecipeFilters,
            SuggestRecipesDto,
            SuggestedRecipe,
            MissingIngredient,
            PageInfo,
            RecipeSuggestions,
            SuggestRecipesResponse,
            GenerateRecipeDto,
            GeneratedIngredient,
            GeneratedRecipe,
            RateRecipeDto,
            RatingResponse,
            RecipeResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Liveness and cache statistics"),
        (name = "Ingredients", description = "Ingredient catalogue, search and photo detection"),
        (name = "Recipes", description = "Recipe suggestions, AI generation and ratings")
    ),
    info(
        title = "FridgeWise API",
        version = "0.1.0",
        description = "Recipe suggestions from what is in your fridge. Successful responses are wrapped as `{ \"success\": true, \"data\": ... }`; read endpoints are served through a Redis response cache and report `X-Cache`, `X-Cache-Key` and `X-Cache-Stats` headers.",
        license(
            name = "MIT"
        )
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spec_lists_cached_routes() {
        let spec = ApiDoc::openapi();
        let paths = &spec.paths.paths;

        assert!(paths.contains_key("/health"));
        assert!(paths.contains_key("/api/ingredients/search"));
        assert!(paths.contains_key("/api/ingredients/{id}"));
        assert!(paths.contains_key("/api/recipes/{id}/rate"));
        assert!(
            spec.components
                .as_ref()
                .is_some_and(|c| c.security_schemes.contains_key("bearer_auth"))
        );
    }
}
