use std::collections::HashSet;

use anyhow::anyhow;
use fridgewise_core::AppError;
use fridgewise_db::{IngredientStore, RecipeQuery, RecipeStore};
use fridgewise_models::{
    GenerateRecipeDto, GeneratedRecipe, IngredientId, MissingIngredient, PageInfo,
    RateRecipeDto, RatingResponse, Recipe, RecipeId, RecipeSuggestions, SuggestRecipesDto,
    SuggestRecipesResponse, SuggestedRecipe,
};
use fridgewise_observability::track_ai_request;
use tracing::{info, instrument};

use crate::ai::{AiError, AiProvider};

pub const DEFAULT_MIN_MATCH_PERCENTAGE: u32 = 50;
pub const DEFAULT_PAGE_SIZE: usize = 20;

pub struct RecipeService;

impl RecipeService {
    /// Corpus recipes that share ingredients with the request, best match
    /// first. When none qualifies, asks the AI provider for one recipe built
    /// from the same ingredients.
    #[instrument(skip(recipes, ingredients, ai))]
    pub async fn suggest(
        recipes: &dyn RecipeStore,
        ingredients: &dyn IngredientStore,
        ai: &dyn AiProvider,
        dto: SuggestRecipesDto,
    ) -> Result<SuggestRecipesResponse, AppError> {
        let limit = dto.limit.unwrap_or(DEFAULT_PAGE_SIZE);
        let page = dto.page.unwrap_or(1);
        let mut filters = dto.filters.clone();
        let min_match = *filters
            .min_match_percentage
            .get_or_insert(DEFAULT_MIN_MATCH_PERCENTAGE);

        let found = recipes
            .find_by_ingredients(&RecipeQuery {
                ingredients: dto.ingredients.clone(),
                filters: dto.filters.clone(),
                limit,
                page,
            })
            .await?;

        let mut scored: Vec<(u32, Recipe)> = found
            .into_iter()
            .map(|recipe| (recipe.match_percentage(&dto.ingredients), recipe))
            .filter(|(score, _)| *score >= min_match)
            .collect();
        scored.sort_by(|(a_score, a), (b_score, b)| {
            b_score
                .cmp(a_score)
                .then_with(|| b.rating.average.total_cmp(&a.rating.average))
        });

        let mut suggested = Vec::with_capacity(scored.len());
        for (match_percentage, recipe) in scored {
            let missing_ingredients =
                missing_ingredients(ingredients, &recipe, &dto.ingredients).await?;
            suggested.push(SuggestedRecipe {
                recipe,
                match_percentage,
                missing_ingredients,
            });
        }

        let recipes = if suggested.is_empty() {
            Self::fallback(ingredients, ai, &dto).await?
        } else {
            RecipeSuggestions::Matched(suggested)
        };

        info!(
            suggestions = recipes.len(),
            generated = matches!(recipes, RecipeSuggestions::Generated(_)),
            "Recipe suggestions ready"
        );

        Ok(SuggestRecipesResponse {
            pagination: PageInfo {
                page,
                limit,
                total: recipes.len(),
            },
            recipes,
            filters,
        })
    }

    async fn fallback(
        ingredients: &dyn IngredientStore,
        ai: &dyn AiProvider,
        dto: &SuggestRecipesDto,
    ) -> Result<RecipeSuggestions, AppError> {
        let mut names = Vec::with_capacity(dto.ingredients.len());
        for id in &dto.ingredients {
            if let Some(ingredient) = ingredients.find_by_id(*id).await? {
                names.push(ingredient.name);
            }
        }
        if names.is_empty() {
            return Ok(RecipeSuggestions::Matched(Vec::new()));
        }

        let request = GenerateRecipeDto {
            ingredients: names,
            servings: dto.servings,
            max_prep_time: dto.filters.max_prep_time,
            difficulty: dto.filters.difficulty,
        };

        // Provider errors keep their status.
        let recipe = Self::generate(ai, request).await?;
        Ok(RecipeSuggestions::Generated(vec![recipe]))
    }

    #[instrument(skip(ai))]
    pub async fn generate(
        ai: &dyn AiProvider,
        request: GenerateRecipeDto,
    ) -> Result<GeneratedRecipe, AppError> {
        let generated = ai.generate_recipe(&request).await;
        track_ai_request("generate_recipe", ai.name(), generated.is_ok());
        generated.map_err(AiError::into_app_error)
    }

    #[instrument(skip(recipes))]
    pub async fn get_by_id(recipes: &dyn RecipeStore, id: &str) -> Result<Recipe, AppError> {
        let id = parse_recipe_id(id)?;
        recipes
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow!("Recipe not found")))
    }

    #[instrument(skip(recipes))]
    pub async fn rate(
        recipes: &dyn RecipeStore,
        id: &str,
        dto: RateRecipeDto,
    ) -> Result<RatingResponse, AppError> {
        let id = parse_recipe_id(id)?;
        let rating = recipes
            .rate(id, dto.rating)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow!("Recipe not found")))?;

        Ok(RatingResponse {
            rating,
            message: "Recipe rated successfully".to_string(),
        })
    }
}

fn parse_recipe_id(id: &str) -> Result<RecipeId, AppError> {
    id.parse()
        .map_err(|_| AppError::bad_request(anyhow!("Invalid recipe ID")))
}

async fn missing_ingredients(
    store: &dyn IngredientStore,
    recipe: &Recipe,
    available: &[IngredientId],
) -> Result<Vec<MissingIngredient>, AppError> {
    let available: HashSet<&IngredientId> = available.iter().collect();
    let mut missing = Vec::new();

    for item in recipe
        .ingredients
        .iter()
        .filter(|i| !available.contains(&i.ingredient_id))
    {
        if let Some(ingredient) = store.find_by_id(item.ingredient_id).await? {
            missing.push(MissingIngredient {
                name: ingredient.name,
                quantity: item.quantity,
                unit: item.unit.clone(),
                required: item.required,
            });
        }
    }
    Ok(missing)
}
