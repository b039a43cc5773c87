//! Recipe domain models and DTOs.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;
use utoipa::ToSchema;
use validator::Validate;

use crate::ids::{IngredientId, RecipeId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecipeIngredient {
    pub ingredient_id: IngredientId,
    pub quantity: f64,
    pub unit: String,
    /// Optional ingredients weigh less in the match percentage
    pub required: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, ToSchema)]
pub struct Rating {
    pub average: f64,
    pub count: u32,
}

impl Rating {
    /// Folds one more score into the running average, rounded to one decimal.
    pub fn add(&mut self, score: u8) {
        let total = self.average * f64::from(self.count) + f64::from(score);
        self.count += 1;
        self.average = (total / f64::from(self.count) * 10.0).round() / 10.0;
    }
}

/// A stored recipe document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    pub id: RecipeId,
    pub title: String,
    pub description: String,
    pub ingredients: Vec<RecipeIngredient>,
    pub instructions: Vec<String>,
    /// Minutes
    pub prep_time: u32,
    /// Minutes
    pub cook_time: u32,
    pub servings: u32,
    pub difficulty: Difficulty,
    pub cuisine: String,
    pub tags: Vec<String>,
    pub rating: Rating,
    pub source: String,
}

impl Recipe {
    /// Share of the recipe covered by `available`, 0-100. Required
    /// ingredients carry 80% of the weight and optional ones 20%.
    pub fn match_percentage(&self, available: &[IngredientId]) -> u32 {
        let available: HashSet<&IngredientId> = available.iter().collect();
        let (required, optional): (Vec<_>, Vec<_>) =
            self.ingredients.iter().partition(|i| i.required);

        let share = |items: &[&RecipeIngredient]| {
            let matched = items
                .iter()
                .filter(|i| available.contains(&i.ingredient_id))
                .count();
            matched as f64 / items.len() as f64
        };

        let required_part = if required.is_empty() {
            0.8
        } else {
            share(&required) * 0.8
        };
        let optional_part = if optional.is_empty() {
            0.0
        } else {
            share(&optional) * 0.2
        };

        ((required_part + optional_part) * 100.0).round() as u32
    }

    pub fn uses_any(&self, ids: &[IngredientId]) -> bool {
        self.ingredients
            .iter()
            .any(|i| ids.contains(&i.ingredient_id))
    }
}

/// Search filters shared by the suggest request and response.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecipeFilters {
    pub cuisine: Option<String>,
    pub difficulty: Option<Difficulty>,
    #[validate(range(min = 1, max = 480))]
    pub max_prep_time: Option<u32>,
    pub tags: Option<Vec<String>>,
    #[validate(range(max = 100))]
    pub min_match_percentage: Option<u32>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SuggestRecipesDto {
    #[validate(length(min = 1, message = "At least one ingredient is required"))]
    pub ingredients: Vec<IngredientId>,
    #[serde(flatten)]
    #[validate(nested)]
    pub filters: RecipeFilters,
    pub servings: Option<u32>,
    #[validate(range(min = 1, max = 100))]
    pub limit: Option<usize>,
    #[validate(range(min = 1))]
    pub page: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MissingIngredient {
    pub name: String,
    pub quantity: f64,
    pub unit: String,
    pub required: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SuggestedRecipe {
    #[serde(flatten)]
    pub recipe: Recipe,
    pub match_percentage: u32,
    pub missing_ingredients: Vec<MissingIngredient>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PageInfo {
    pub page: usize,
    pub limit: usize,
    pub total: usize,
}

/// Either corpus matches or, when none qualified, a single generated recipe.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum RecipeSuggestions {
    Matched(Vec<SuggestedRecipe>),
    Generated(Vec<GeneratedRecipe>),
}

impl RecipeSuggestions {
    pub fn len(&self) -> usize {
        match self {
            RecipeSuggestions::Matched(r) => r.len(),
            RecipeSuggestions::Generated(r) => r.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SuggestRecipesResponse {
    pub recipes: RecipeSuggestions,
    pub pagination: PageInfo,
    pub filters: RecipeFilters,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRecipeDto {
    /// Ingredient names
    #[validate(length(min = 1, message = "Ingredients array required"))]
    pub ingredients: Vec<String>,
    #[validate(range(min = 1, max = 20))]
    pub servings: Option<u32>,
    #[validate(range(min = 1, max = 480))]
    pub max_prep_time: Option<u32>,
    pub difficulty: Option<Difficulty>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct GeneratedIngredient {
    pub name: String,
    /// Free-form amount as produced by the model (`2`, `"1/2"`, ...)
    #[schema(value_type = Object)]
    pub amount: Option<Value>,
    #[serde(default)]
    pub unit: String,
}

/// A recipe produced by an AI provider. Not stored; the `ai-` prefixed id
/// marks it as transient.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedRecipe {
    pub id: String,
    pub title: String,
    pub description: String,
    pub ingredients: Vec<GeneratedIngredient>,
    pub instructions: Vec<String>,
    pub servings: u32,
    /// Minutes
    pub cooking_time: u32,
    pub difficulty: String,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct RateRecipeDto {
    #[validate(range(min = 1, max = 5, message = "Rating must be between 1 and 5"))]
    pub rating: u8,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RatingResponse {
    pub rating: Rating,
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RecipeResponse {
    pub recipe: Recipe,
}
