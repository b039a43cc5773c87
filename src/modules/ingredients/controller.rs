use axum::extract::{Path, Query, State};
use fridgewise_core::{ApiResponse, AppError};
use fridgewise_models::{
    CategoryCount, CreateCustomIngredientDto, CustomIngredientResponse, DetectIngredientsDto,
    DetectionResult, IngredientResponse, IngredientSearchParams, IngredientSearchResponse,
    SeedResponse, TotalCountResponse,
};
use tracing::{info, instrument};

use crate::middleware::auth::AuthUser;
use crate::modules::ingredients::service::{CustomAdd, IngredientService};
use crate::state::AppState;
use crate::validator::ValidatedJson;

#[utoipa::path(
    get,
    path = "/api/ingredients/categories",
    responses(
        (status = 200, description = "Every category with its ingredient count", body = Vec<CategoryCount>)
    ),
    tag = "Ingredients"
)]
#[instrument(skip(state))]
pub async fn get_categories(
    State(state): State<AppState>,
) -> Result<ApiResponse<Vec<CategoryCount>>, AppError> {
    let categories = IngredientService::categories(state.ingredients.as_ref()).await?;
    Ok(ApiResponse::ok(categories))
}

#[utoipa::path(
    get,
    path = "/api/ingredients/total-count",
    responses(
        (status = 200, description = "Number of stored ingredients", body = TotalCountResponse)
    ),
    tag = "Ingredients"
)]
#[instrument(skip(state))]
pub async fn get_total_count(
    State(state): State<AppState>,
) -> Result<ApiResponse<TotalCountResponse>, AppError> {
    let total = IngredientService::total_count(state.ingredients.as_ref()).await?;
    Ok(ApiResponse::ok(total))
}

#[utoipa::path(
    post,
    path = "/api/ingredients/seed-dev",
    responses(
        (status = 200, description = "Catalogue replaced with the sample ingredients", body = SeedResponse),
        (status = 403, description = "Not running in development")
    ),
    tag = "Ingredients"
)]
#[instrument(skip(state))]
pub async fn seed_ingredients(
    State(state): State<AppState>,
) -> Result<ApiResponse<SeedResponse>, AppError> {
    let seeded =
        IngredientService::seed(state.ingredients.as_ref(), state.server_config.environment)
            .await?;
    Ok(ApiResponse::ok(seeded))
}

#[utoipa::path(
    post,
    path = "/api/ingredients/detect-from-image",
    request_body = DetectIngredientsDto,
    responses(
        (status = 200, description = "Detected ingredients split into matched and unknown", body = DetectionResult),
        (status = 401, description = "Unauthorized"),
        (status = 422, description = "Invalid image URL or confidence"),
        (status = 502, description = "AI provider failed"),
        (status = 503, description = "AI provider unavailable"),
        (status = 504, description = "AI provider timed out")
    ),
    tag = "Ingredients",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn detect_from_image(
    State(state): State<AppState>,
    auth_user: AuthUser,
    ValidatedJson(dto): ValidatedJson<DetectIngredientsDto>,
) -> Result<ApiResponse<DetectionResult>, AppError> {
    info!(user.id = auth_user.user_id(), image.url = %dto.image_url, "Detecting ingredients");
    let result =
        IngredientService::detect(state.ingredients.as_ref(), state.ai.as_ref(), dto).await?;
    Ok(ApiResponse::ok(result))
}

#[utoipa::path(
    get,
    path = "/api/ingredients/search",
    params(IngredientSearchParams),
    responses(
        (status = 200, description = "Ingredients ranked by relevance", body = IngredientSearchResponse),
        (status = 400, description = "Query shorter than 2 characters"),
        (status = 401, description = "Unauthorized")
    ),
    tag = "Ingredients",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn search_ingredients(
    State(state): State<AppState>,
    Query(params): Query<IngredientSearchParams>,
) -> Result<ApiResponse<IngredientSearchResponse>, AppError> {
    let results = IngredientService::search(state.ingredients.as_ref(), params).await?;
    Ok(ApiResponse::ok(results))
}

#[utoipa::path(
    post,
    path = "/api/ingredients/custom-add",
    request_body = CreateCustomIngredientDto,
    responses(
        (status = 201, description = "Custom ingredient added", body = CustomIngredientResponse),
        (status = 200, description = "Ingredient already exists", body = CustomIngredientResponse),
        (status = 401, description = "Unauthorized"),
        (status = 422, description = "Invalid name")
    ),
    tag = "Ingredients",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn add_custom_ingredient(
    State(state): State<AppState>,
    auth_user: AuthUser,
    ValidatedJson(dto): ValidatedJson<CreateCustomIngredientDto>,
) -> Result<ApiResponse<CustomIngredientResponse>, AppError> {
    match IngredientService::add_custom(state.ingredients.as_ref(), dto).await? {
        CustomAdd::Created(response) => {
            info!(user.id = auth_user.user_id(), "User added a custom ingredient");
            Ok(ApiResponse::created(response))
        }
        CustomAdd::Existing(response) => Ok(ApiResponse::ok(response)),
    }
}

#[utoipa::path(
    get,
    path = "/api/ingredients/{id}",
    params(
        ("id" = String, Path, description = "Ingredient ID")
    ),
    responses(
        (status = 200, description = "Ingredient found", body = IngredientResponse),
        (status = 400, description = "Malformed ID"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Ingredient not found")
    ),
    tag = "Ingredients",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_ingredient_by_id(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<ApiResponse<IngredientResponse>, AppError> {
    let ingredient = IngredientService::get_by_id(state.ingredients.as_ref(), &id).await?;
    Ok(ApiResponse::ok(IngredientResponse { ingredient }))
}
