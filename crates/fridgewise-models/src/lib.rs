//! # FridgeWise Models
//!
//! Domain models and DTOs for the FridgeWise API.
//!
//! # Modules
//!
//! - [`ids`]: Strongly-typed document IDs
//! - [`ingredients`]: Ingredient documents, categories and search DTOs
//! - [`recipes`]: Recipe documents, suggestion and rating DTOs
//! - [`detection`]: Photo ingredient detection
//!
//! All JSON shapes are camelCase.

pub mod detection;
pub mod ids;
pub mod ingredients;
pub mod recipes;

pub use detection::{
    DetectIngredientsDto, DetectedIngredient, Detection, DetectionResult, MatchedIngredient,
    ProviderInfo,
};
pub use ids::{IngredientId, RecipeId};
pub use ingredients::{
    CategoryCount, CreateCustomIngredientDto, CustomIngredientResponse, EstimatedNutrition,
    Ingredient, IngredientCategory, IngredientResponse, IngredientSearchParams,
    IngredientSearchResponse, NewIngredient, Nutrition, SeedResponse, SeededIngredient,
    StorageType, TotalCountResponse,
};
pub use recipes::{
    Difficulty, GenerateRecipeDto, GeneratedIngredient, GeneratedRecipe, MissingIngredient,
    PageInfo, RateRecipeDto, Rating, RatingResponse, Recipe, RecipeFilters, RecipeIngredient,
    RecipeResponse, RecipeSuggestions, SuggestRecipesDto, SuggestRecipesResponse,
    SuggestedRecipe,
};
