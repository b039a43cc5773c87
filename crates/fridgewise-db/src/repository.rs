//! Repository traits over the document store.

use std::collections::HashMap;

use async_trait::async_trait;
use fridgewise_models::{
    Ingredient, IngredientCategory, IngredientId, NewIngredient, Rating, Recipe, RecipeFilters,
    RecipeId,
};

use crate::error::StoreError;

/// Text search over ingredient names and common names.
#[derive(Debug, Clone)]
pub struct IngredientSearch {
    pub text: String,
    pub category: Option<IngredientCategory>,
    pub limit: usize,
}

/// Recipes containing at least one of `ingredients`, narrowed by `filters`.
#[derive(Debug, Clone)]
pub struct RecipeQuery {
    pub ingredients: Vec<IngredientId>,
    pub filters: RecipeFilters,
    pub limit: usize,
    pub page: usize,
}

#[async_trait]
pub trait IngredientStore: Send + Sync {
    /// Matches ordered by relevance, best first.
    async fn search(&self, search: &IngredientSearch) -> Result<Vec<Ingredient>, StoreError>;

    async fn find_by_id(&self, id: IngredientId) -> Result<Option<Ingredient>, StoreError>;

    /// Looks up by name or common name, case-insensitively.
    async fn find_by_name(&self, name: &str) -> Result<Option<Ingredient>, StoreError>;

    async fn count(&self) -> Result<u64, StoreError>;

    async fn count_by_category(&self) -> Result<HashMap<IngredientCategory, u64>, StoreError>;

    async fn insert(&self, ingredient: NewIngredient) -> Result<Ingredient, StoreError>;

    /// Drops every ingredient and stores `ingredients` in their place.
    async fn replace_all(
        &self,
        ingredients: Vec<NewIngredient>,
    ) -> Result<Vec<Ingredient>, StoreError>;
}

#[async_trait]
pub trait RecipeStore: Send + Sync {
    /// Ordered by rating, highest first.
    async fn find_by_ingredients(&self, query: &RecipeQuery) -> Result<Vec<Recipe>, StoreError>;

    async fn find_by_id(&self, id: RecipeId) -> Result<Option<Recipe>, StoreError>;

    /// Adds a score to the recipe's rating. `None` if the recipe is absent.
    async fn rate(&self, id: RecipeId, score: u8) -> Result<Option<Rating>, StoreError>;

    async fn insert(&self, recipe: Recipe) -> Result<Recipe, StoreError>;
}
