use axum::extract::{Path, State};
use fridgewise_core::{ApiResponse, AppError};
use fridgewise_models::{
    GenerateRecipeDto, GeneratedRecipe, RateRecipeDto, RatingResponse, RecipeResponse,
    SuggestRecipesDto, SuggestRecipesResponse,
};
use tracing::{info, instrument};

use crate::middleware::auth::AuthUser;
use crate::modules::recipes::service::RecipeService;
use crate::state::AppState;
use crate::validator::ValidatedJson;

#[utoipa::path(
    post,
    path = "/api/recipes/suggest",
    request_body = SuggestRecipesDto,
    responses(
        (status = 200, description = "Matching recipes, or one generated recipe when nothing matched", body = SuggestRecipesResponse),
        (status = 401, description = "Unauthorized"),
        (status = 422, description = "Invalid ingredients or filters"),
        (status = 502, description = "No match and the AI fallback failed"),
        (status = 503, description = "No match and the AI provider is unavailable"),
        (status = 504, description = "No match and the AI provider timed out")
    ),
    tag = "Recipes",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn suggest_recipes(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<SuggestRecipesDto>,
) -> Result<ApiResponse<SuggestRecipesResponse>, AppError> {
    let suggestions = RecipeService::suggest(
        state.recipes.as_ref(),
        state.ingredients.as_ref(),
        state.ai.as_ref(),
        dto,
    )
    .await?;
    Ok(ApiResponse::ok(suggestions))
}

#[utoipa::path(
    post,
    path = "/api/recipes/generate-ai",
    request_body = GenerateRecipeDto,
    responses(
        (status = 200, description = "Recipe generated from the given ingredient names", body = GeneratedRecipe),
        (status = 401, description = "Unauthorized"),
        (status = 422, description = "Ingredients array required"),
        (status = 502, description = "AI provider failed"),
        (status = 503, description = "AI provider unavailable"),
        (status = 504, description = "AI provider timed out")
    ),
    tag = "Recipes",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn generate_recipe(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<GenerateRecipeDto>,
) -> Result<ApiResponse<GeneratedRecipe>, AppError> {
    let recipe = RecipeService::generate(state.ai.as_ref(), dto).await?;
    Ok(ApiResponse::ok(recipe))
}

#[utoipa::path(
    get,
    path = "/api/recipes/{id}",
    params(
        ("id" = String, Path, description = "Recipe ID")
    ),
    responses(
        (status = 200, description = "Recipe found", body = RecipeResponse),
        (status = 400, description = "Malformed ID"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Recipe not found")
    ),
    tag = "Recipes",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_recipe(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<ApiResponse<RecipeResponse>, AppError> {
    let recipe = RecipeService::get_by_id(state.recipes.as_ref(), &id).await?;
    Ok(ApiResponse::ok(RecipeResponse { recipe }))
}

#[utoipa::path(
    post,
    path = "/api/recipes/{id}/rate",
    params(
        ("id" = String, Path, description = "Recipe ID")
    ),
    request_body = RateRecipeDto,
    responses(
        (status = 200, description = "Rating recorded", body = RatingResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Recipe not found"),
        (status = 422, description = "Rating must be between 1 and 5")
    ),
    tag = "Recipes",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn rate_recipe(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<String>,
    ValidatedJson(dto): ValidatedJson<RateRecipeDto>,
) -> Result<ApiResponse<RatingResponse>, AppError> {
    let rated = RecipeService::rate(state.recipes.as_ref(), &id, dto).await?;
    info!(user.id = auth_user.user_id(), recipe.id = %id, "Recipe rated");
    Ok(ApiResponse::ok(rated))
}
