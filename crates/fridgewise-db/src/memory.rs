use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use fridgewise_models::{
    Ingredient, IngredientCategory, IngredientId, NewIngredient, Rating, Recipe, RecipeId,
};
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::error::StoreError;
use crate::repository::{IngredientSearch, IngredientStore, RecipeQuery, RecipeStore};
use crate::seed;

const NAME_WEIGHT: u32 = 10;
const COMMON_NAME_WEIGHT: u32 = 5;

/// In-process document store implementing both repositories.
#[derive(Debug, Default)]
pub struct MemoryDocumentStore {
    ingredients: RwLock<Vec<Ingredient>>,
    recipes: RwLock<Vec<Recipe>>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store preloaded with the sample ingredients and recipes.
    pub fn seeded() -> Self {
        let ingredients: Vec<Ingredient> = seed::sample_ingredients()
            .into_iter()
            .map(|new| materialize(IngredientId::new(), new))
            .collect();
        let recipes = seed::sample_recipes(&ingredients);

        Self {
            ingredients: RwLock::new(ingredients),
            recipes: RwLock::new(recipes),
        }
    }
}

fn materialize(id: IngredientId, new: NewIngredient) -> Ingredient {
    Ingredient {
        id,
        name: new.name,
        category: new.category,
        nutrition_per_100g: new.nutrition_per_100g,
        common_names: new.common_names,
        shelf_life: new.shelf_life,
        storage_type: new.storage_type,
        image_url: None,
        is_verified: new.is_verified,
        created_at: Utc::now(),
    }
}

/// Weighted token match: name hits count double common-name hits.
fn relevance(ingredient: &Ingredient, text: &str) -> u32 {
    text.split_whitespace()
        .map(|token| {
            let token = token.to_lowercase();
            let mut score = 0;
            if ingredient.name.contains(&token) {
                score += NAME_WEIGHT;
            }
            if ingredient.common_names.iter().any(|n| n.contains(&token)) {
                score += COMMON_NAME_WEIGHT;
            }
            score
        })
        .sum()
}

#[async_trait]
impl IngredientStore for MemoryDocumentStore {
    async fn search(&self, search: &IngredientSearch) -> Result<Vec<Ingredient>, StoreError> {
        let ingredients = self.ingredients.read().await;

        let mut scored: Vec<(u32, &Ingredient)> = ingredients
            .iter()
            .filter(|i| search.category.is_none_or(|c| i.category == c))
            .map(|i| (relevance(i, &search.text), i))
            .filter(|(score, _)| *score > 0)
            .collect();
        scored.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.name.cmp(&b.1.name)));

        Ok(scored
            .into_iter()
            .take(search.limit)
            .map(|(_, i)| i.clone())
            .collect())
    }

    async fn find_by_id(&self, id: IngredientId) -> Result<Option<Ingredient>, StoreError> {
        let ingredients = self.ingredients.read().await;
        Ok(ingredients.iter().find(|i| i.id == id).cloned())
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Ingredient>, StoreError> {
        let ingredients = self.ingredients.read().await;
        Ok(ingredients.iter().find(|i| i.answers_to(name)).cloned())
    }

    async fn count(&self) -> Result<u64, StoreError> {
        Ok(self.ingredients.read().await.len() as u64)
    }

    async fn count_by_category(&self) -> Result<HashMap<IngredientCategory, u64>, StoreError> {
        let ingredients = self.ingredients.read().await;
        let mut counts = HashMap::new();
        for ingredient in ingredients.iter() {
            *counts.entry(ingredient.category).or_insert(0) += 1;
        }
        Ok(counts)
    }

    async fn insert(&self, ingredient: NewIngredient) -> Result<Ingredient, StoreError> {
        let mut ingredients = self.ingredients.write().await;
        if ingredients.iter().any(|i| i.name == ingredient.name) {
            return Err(StoreError::Duplicate {
                entity: "ingredient",
                name: ingredient.name,
            });
        }

        let stored = materialize(IngredientId::new(), ingredient);
        debug!(ingredient.id = %stored.id, ingredient.name = %stored.name, "Inserted ingredient");
        ingredients.push(stored.clone());
        Ok(stored)
    }

    async fn replace_all(
        &self,
        replacement: Vec<NewIngredient>,
    ) -> Result<Vec<Ingredient>, StoreError> {
        let mut ingredients = self.ingredients.write().await;

        // Names that survive a reseed keep their id so recipe references stay valid.
        let previous: HashMap<String, IngredientId> =
            ingredients.iter().map(|i| (i.name.clone(), i.id)).collect();

        let stored: Vec<Ingredient> = replacement
            .into_iter()
            .map(|new| {
                let id = previous
                    .get(&new.name)
                    .copied()
                    .unwrap_or_else(IngredientId::new);
                materialize(id, new)
            })
            .collect();

        info!(
            removed = ingredients.len(),
            inserted = stored.len(),
            "Replaced ingredient collection"
        );
        *ingredients = stored.clone();
        Ok(stored)
    }
}

#[async_trait]
impl RecipeStore for MemoryDocumentStore {
    async fn find_by_ingredients(&self, query: &RecipeQuery) -> Result<Vec<Recipe>, StoreError> {
        let recipes = self.recipes.read().await;
        let filters = &query.filters;

        let mut found: Vec<&Recipe> = recipes
            .iter()
            .filter(|r| r.uses_any(&query.ingredients))
            .filter(|r| filters.cuisine.as_ref().is_none_or(|c| r.cuisine == *c))
            .filter(|r| filters.difficulty.is_none_or(|d| r.difficulty == d))
            .filter(|r| filters.max_prep_time.is_none_or(|max| r.prep_time <= max))
            .filter(|r| {
                filters
                    .tags
                    .as_ref()
                    .is_none_or(|tags| tags.is_empty() || r.tags.iter().any(|t| tags.contains(t)))
            })
            .collect();
        found.sort_by(|a, b| b.rating.average.total_cmp(&a.rating.average));

        let skip = query.page.saturating_sub(1) * query.limit;
        Ok(found
            .into_iter()
            .skip(skip)
            .take(query.limit)
            .cloned()
            .collect())
    }

    async fn find_by_id(&self, id: RecipeId) -> Result<Option<Recipe>, StoreError> {
        let recipes = self.recipes.read().await;
        Ok(recipes.iter().find(|r| r.id == id).cloned())
    }

    async fn rate(&self, id: RecipeId, score: u8) -> Result<Option<Rating>, StoreError> {
        let mut recipes = self.recipes.write().await;
        Ok(recipes.iter_mut().find(|r| r.id == id).map(|recipe| {
            recipe.rating.add(score);
            recipe.rating
        }))
    }

    async fn insert(&self, recipe: Recipe) -> Result<Recipe, StoreError> {
        let mut recipes = self.recipes.write().await;
        if recipes.iter().any(|r| r.id == recipe.id) {
            return Err(StoreError::Duplicate {
                entity: "recipe",
                name: recipe.title,
            });
        }
        recipes.push(recipe.clone());
        Ok(recipe)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fridgewise_models::{CreateCustomIngredientDto, Difficulty, RecipeFilters};

    fn search(text: &str) -> IngredientSearch {
        IngredientSearch {
            text: text.to_string(),
            category: None,
            limit: 20,
        }
    }

    fn query(ingredients: Vec<IngredientId>) -> RecipeQuery {
        RecipeQuery {
            ingredients,
            filters: RecipeFilters::default(),
            limit: 20,
            page: 1,
        }
    }

    #[tokio::test]
    async fn test_seeded_counts() {
        let store = MemoryDocumentStore::seeded();
        assert_eq!(IngredientStore::count(&store).await.unwrap(), 8);

        let counts = store.count_by_category().await.unwrap();
        assert_eq!(counts.get(&IngredientCategory::Vegetables), Some(&2));
        assert_eq!(counts.get(&IngredientCategory::Seafood), None);
    }

    #[tokio::test]
    async fn test_search_ranks_name_matches_first() {
        let store = MemoryDocumentStore::seeded();

        let results = store.search(&search("chicken")).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].name, "chicken breast");

        let results = store.search(&search("rice oil")).await.unwrap();
        let names: Vec<_> = results.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["olive oil", "rice"]);
    }

    #[tokio::test]
    async fn test_search_category_and_limit() {
        let store = MemoryDocumentStore::seeded();

        let mut params = search("a");
        params.category = Some(IngredientCategory::Fruits);
        let results = store.search(&params).await.unwrap();
        assert!(results.iter().all(|i| i.category == IngredientCategory::Fruits));
        assert_eq!(results.len(), 2);

        params.limit = 1;
        assert_eq!(store.search(&params).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_find_by_name_uses_common_names() {
        let store = MemoryDocumentStore::seeded();
        let found = store.find_by_name("Carrots").await.unwrap().unwrap();
        assert_eq!(found.name, "carrot");
        assert!(store.find_by_name("kale").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_insert_rejects_duplicates() {
        let store = MemoryDocumentStore::new();
        let kale = || {
            NewIngredient::custom(CreateCustomIngredientDto {
                name: "Kale".into(),
                category: IngredientCategory::Vegetables,
                estimated_nutrition: None,
            })
        };

        let stored = IngredientStore::insert(&store, kale()).await.unwrap();
        assert_eq!(stored.name, "kale");
        assert!(matches!(
            IngredientStore::insert(&store, kale()).await,
            Err(StoreError::Duplicate { .. })
        ));
    }

    #[tokio::test]
    async fn test_replace_all_keeps_ids_for_known_names() {
        let store = MemoryDocumentStore::seeded();
        let before = store.find_by_name("rice").await.unwrap().unwrap();

        let stored = store.replace_all(seed::sample_ingredients()).await.unwrap();
        assert_eq!(stored.len(), 8);

        let after = store.find_by_name("rice").await.unwrap().unwrap();
        assert_eq!(before.id, after.id);
    }

    #[tokio::test]
    async fn test_find_recipes_by_ingredients_and_filters() {
        let store = MemoryDocumentStore::seeded();
        let carrot = store.find_by_name("carrot").await.unwrap().unwrap();

        let recipes = store
            .find_by_ingredients(&query(vec![carrot.id]))
            .await
            .unwrap();
        assert_eq!(recipes.len(), 2);

        let mut narrowed = query(vec![carrot.id]);
        narrowed.filters.max_prep_time = Some(10);
        narrowed.filters.difficulty = Some(Difficulty::Easy);
        let recipes = store.find_by_ingredients(&narrowed).await.unwrap();
        assert_eq!(recipes.len(), 1);
        assert_eq!(recipes[0].title, "Glazed Carrots");

        let none = store
            .find_by_ingredients(&query(vec![IngredientId::new()]))
            .await
            .unwrap();
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn test_rate_updates_average() {
        let store = MemoryDocumentStore::seeded();
        let id = RecipeId::from_u128(0x101);

        store.rate(id, 5).await.unwrap();
        let rating = store.rate(id, 4).await.unwrap().unwrap();
        assert_eq!(rating.count, 2);
        assert_eq!(rating.average, 4.5);

        assert!(store.rate(RecipeId::new(), 5).await.unwrap().is_none());
    }
}
