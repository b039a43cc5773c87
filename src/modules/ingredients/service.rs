use anyhow::anyhow;
use fridgewise_config::Environment;
use fridgewise_core::AppError;
use fridgewise_db::{IngredientSearch, IngredientStore, StoreError, seed};
use fridgewise_models::{
    CategoryCount, CreateCustomIngredientDto, CustomIngredientResponse, DetectIngredientsDto,
    DetectionResult, Ingredient, IngredientCategory, IngredientId, IngredientSearchParams,
    IngredientSearchResponse, MatchedIngredient, NewIngredient, ProviderInfo, SeedResponse,
    SeededIngredient, TotalCountResponse,
};
use fridgewise_observability::track_ai_request;
use tracing::{info, instrument};

use crate::ai::{AiError, AiProvider};

pub const DEFAULT_SEARCH_LIMIT: usize = 20;
pub const MAX_SEARCH_LIMIT: usize = 100;
const MIN_QUERY_CHARS: usize = 2;

/// Outcome of adding a custom ingredient.
#[derive(Debug)]
pub enum CustomAdd {
    Created(CustomIngredientResponse),
    Existing(CustomIngredientResponse),
}

pub struct IngredientService;

impl IngredientService {
    /// Every category with its ingredient count, zero included.
    #[instrument(skip(store))]
    pub async fn categories(store: &dyn IngredientStore) -> Result<Vec<CategoryCount>, AppError> {
        let counts = store.count_by_category().await?;

        Ok(IngredientCategory::ALL
            .iter()
            .map(|category| CategoryCount {
                name: *category,
                count: counts.get(category).copied().unwrap_or(0),
            })
            .collect())
    }

    #[instrument(skip(store))]
    pub async fn total_count(store: &dyn IngredientStore) -> Result<TotalCountResponse, AppError> {
        Ok(TotalCountResponse {
            total_count: store.count().await?,
        })
    }

    /// Replaces the catalogue with the sample set. Development only.
    #[instrument(skip(store))]
    pub async fn seed(
        store: &dyn IngredientStore,
        environment: Environment,
    ) -> Result<SeedResponse, AppError> {
        if !environment.is_development() {
            return Err(AppError::forbidden(anyhow!(
                "Seeding is only allowed in development environment"
            )));
        }

        let stored = store.replace_all(seed::sample_ingredients()).await?;
        info!(ingredients = stored.len(), "Ingredient catalogue reseeded");

        Ok(SeedResponse {
            message: "Database seeded successfully".to_string(),
            ingredients_added: stored.len(),
            ingredients: stored
                .into_iter()
                .map(|i| SeededIngredient {
                    name: i.name,
                    category: i.category,
                })
                .collect(),
        })
    }

    #[instrument(skip(store))]
    pub async fn search(
        store: &dyn IngredientStore,
        params: IngredientSearchParams,
    ) -> Result<IngredientSearchResponse, AppError> {
        let query = params.q.unwrap_or_default();
        if query.trim().chars().count() < MIN_QUERY_CHARS {
            return Err(AppError::bad_request(anyhow!(
                "Query must be at least 2 characters long"
            )));
        }

        let ingredients = store
            .search(&IngredientSearch {
                text: query.trim().to_string(),
                category: params.category,
                limit: params
                    .limit
                    .unwrap_or(DEFAULT_SEARCH_LIMIT)
                    .clamp(1, MAX_SEARCH_LIMIT),
            })
            .await?;

        Ok(IngredientSearchResponse {
            count: ingredients.len(),
            ingredients,
            query,
        })
    }

    /// Stores a user-supplied ingredient unless one already answers to the
    /// name.
    #[instrument(skip(store))]
    pub async fn add_custom(
        store: &dyn IngredientStore,
        dto: CreateCustomIngredientDto,
    ) -> Result<CustomAdd, AppError> {
        if let Some(existing) = store.find_by_name(&dto.name).await? {
            return Ok(CustomAdd::Existing(CustomIngredientResponse {
                ingredient: existing,
                message: "Ingredient already exists in database".to_string(),
            }));
        }

        let ingredient = store
            .insert(NewIngredient::custom(dto))
            .await
            .map_err(|e| match e {
                StoreError::Duplicate { .. } => AppError::new(axum::http::StatusCode::CONFLICT, e),
                other => AppError::from(other),
            })?;

        info!(ingredient.id = %ingredient.id, ingredient.name = %ingredient.name, "Custom ingredient added");
        Ok(CustomAdd::Created(CustomIngredientResponse {
            ingredient,
            message: "Custom ingredient added successfully".to_string(),
        }))
    }

    #[instrument(skip(store))]
    pub async fn get_by_id(store: &dyn IngredientStore, id: &str) -> Result<Ingredient, AppError> {
        let id: IngredientId = id
            .parse()
            .map_err(|_| AppError::bad_request(anyhow!("Invalid ingredient ID")))?;

        store
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow!("Ingredient not found")))
    }

    /// Runs the AI detector and splits its findings into catalogue matches
    /// and unknown names.
    #[instrument(skip(store, ai))]
    pub async fn detect(
        store: &dyn IngredientStore,
        ai: &dyn AiProvider,
        dto: DetectIngredientsDto,
    ) -> Result<DetectionResult, AppError> {
        let detection = ai.detect_ingredients(&dto.image_url, dto.confidence()).await;
        track_ai_request("detect_ingredients", ai.name(), detection.is_ok());
        let detection = detection.map_err(AiError::into_app_error)?;

        let total_detected = detection.ingredients.len();
        let mut matched = Vec::new();
        let mut unknown = Vec::new();

        for detected in detection.ingredients {
            match store.find_by_name(&detected.name).await? {
                Some(ingredient) => matched.push(MatchedIngredient {
                    detected,
                    ingredient_id: ingredient.id,
                    nutrition_per_100g: ingredient.nutrition_per_100g,
                    storage_type: ingredient.storage_type,
                    shelf_life: ingredient.shelf_life,
                }),
                None => unknown.push(detected),
            }
        }

        info!(
            detected = total_detected,
            matched = matched.len(),
            unknown = unknown.len(),
            "Ingredient detection finished"
        );

        Ok(DetectionResult {
            total_detected,
            matched,
            unknown,
            image_url: dto.image_url,
            ai_provider: detection.provider.to_string(),
            provider_info: ProviderInfo {
                model: detection.model,
                total_detected,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::http::StatusCode;
    use fridgewise_db::MemoryDocumentStore;
    use fridgewise_models::{DetectedIngredient, Detection, GenerateRecipeDto, GeneratedRecipe};

    struct FixedDetector;

    #[async_trait]
    impl AiProvider for FixedDetector {
        fn name(&self) -> &'static str {
            "fixed"
        }

        async fn detect_ingredients(
            &self,
            _image_url: &str,
            confidence: f64,
        ) -> Result<Detection, AiError> {
            let detected = |name: &str| DetectedIngredient {
                name: name.to_string(),
                confidence,
                category: Some("other".into()),
                quantity_estimate: None,
                freshness: None,
            };
            Ok(Detection {
                ingredients: vec![detected("Carrots"), detected("dragon fruit")],
                provider: "fixed",
                model: "fixed-v1".into(),
            })
        }

        async fn generate_recipe(
            &self,
            _request: &GenerateRecipeDto,
        ) -> Result<GeneratedRecipe, AiError> {
            Err(AiError::Timeout)
        }
    }

    fn params(q: Option<&str>) -> IngredientSearchParams {
        IngredientSearchParams {
            q: q.map(str::to_string),
            category: None,
            limit: None,
        }
    }

    #[tokio::test]
    async fn test_categories_include_empty_ones() {
        let store = MemoryDocumentStore::seeded();
        let categories = IngredientService::categories(&store).await.unwrap();

        assert_eq!(categories.len(), IngredientCategory::ALL.len());
        let fruits = categories
            .iter()
            .find(|c| c.name == IngredientCategory::Fruits)
            .unwrap();
        assert_eq!(fruits.count, 2);
        let seafood = categories
            .iter()
            .find(|c| c.name == IngredientCategory::Seafood)
            .unwrap();
        assert_eq!(seafood.count, 0);
    }

    #[tokio::test]
    async fn test_search_requires_two_characters() {
        let store = MemoryDocumentStore::seeded();

        let err = IngredientService::search(&store, params(Some(" a ")))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);

        let err = IngredientService::search(&store, params(None)).await.unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);

        let found = IngredientService::search(&store, params(Some("rice")))
            .await
            .unwrap();
        assert_eq!(found.count, 1);
        assert_eq!(found.query, "rice");
    }

    #[tokio::test]
    async fn test_seed_only_in_development() {
        let store = MemoryDocumentStore::new();

        let err = IngredientService::seed(&store, Environment::Production)
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::FORBIDDEN);

        let seeded = IngredientService::seed(&store, Environment::Development)
            .await
            .unwrap();
        assert_eq!(seeded.ingredients_added, 8);
        assert_eq!(store.count().await.unwrap(), 8);
    }

    #[tokio::test]
    async fn test_add_custom_created_then_existing() {
        let store = MemoryDocumentStore::seeded();
        let dto = || CreateCustomIngredientDto {
            name: "Tahini".into(),
            category: IngredientCategory::Condiments,
            estimated_nutrition: None,
        };

        let first = IngredientService::add_custom(&store, dto()).await.unwrap();
        assert!(matches!(first, CustomAdd::Created(ref r) if r.ingredient.name == "tahini"));

        let second = IngredientService::add_custom(&store, dto()).await.unwrap();
        assert!(matches!(second, CustomAdd::Existing(_)));
    }

    #[tokio::test]
    async fn test_get_by_id_errors() {
        let store = MemoryDocumentStore::seeded();

        let err = IngredientService::get_by_id(&store, "not-a-uuid")
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);

        let err = IngredientService::get_by_id(&store, &IngredientId::new().to_string())
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_detect_splits_matched_and_unknown() {
        let store = MemoryDocumentStore::seeded();
        let dto = DetectIngredientsDto {
            image_url: "https://example.com/fridge.jpg".into(),
            confidence: None,
        };

        let result = IngredientService::detect(&store, &FixedDetector, dto)
            .await
            .unwrap();
        assert_eq!(result.total_detected, 2);
        assert_eq!(result.matched.len(), 1);
        assert_eq!(result.matched[0].detected.name, "Carrots");
        assert_eq!(result.unknown[0].name, "dragon fruit");
        assert_eq!(result.ai_provider, "fixed");
        assert_eq!(result.provider_info.model, "fixed-v1");
    }
}
