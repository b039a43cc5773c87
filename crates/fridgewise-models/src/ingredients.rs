//! Ingredient domain models and DTOs.
//!
//! Ingredient documents, the request/response shapes of the
//! `/api/ingredients` routes, and the category/storage vocabularies.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::ids::IngredientId;

/// Ingredient categories, serialized in kebab-case (`nuts-seeds`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum IngredientCategory {
    Vegetables,
    Fruits,
    Meat,
    Poultry,
    Seafood,
    Dairy,
    Grains,
    Legumes,
    NutsSeeds,
    HerbsSpices,
    OilsFats,
    Condiments,
    Pantry,
    Beverages,
    Other,
}

impl IngredientCategory {
    /// Every category in display order.
    pub const ALL: [IngredientCategory; 15] = [
        IngredientCategory::Vegetables,
        IngredientCategory::Fruits,
        IngredientCategory::Meat,
        IngredientCategory::Poultry,
        IngredientCategory::Seafood,
        IngredientCategory::Dairy,
        IngredientCategory::Grains,
        IngredientCategory::Legumes,
        IngredientCategory::NutsSeeds,
        IngredientCategory::HerbsSpices,
        IngredientCategory::OilsFats,
        IngredientCategory::Condiments,
        IngredientCategory::Pantry,
        IngredientCategory::Beverages,
        IngredientCategory::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            IngredientCategory::Vegetables => "vegetables",
            IngredientCategory::Fruits => "fruits",
            IngredientCategory::Meat => "meat",
            IngredientCategory::Poultry => "poultry",
            IngredientCategory::Seafood => "seafood",
            IngredientCategory::Dairy => "dairy",
            IngredientCategory::Grains => "grains",
            IngredientCategory::Legumes => "legumes",
            IngredientCategory::NutsSeeds => "nuts-seeds",
            IngredientCategory::HerbsSpices => "herbs-spices",
            IngredientCategory::OilsFats => "oils-fats",
            IngredientCategory::Condiments => "condiments",
            IngredientCategory::Pantry => "pantry",
            IngredientCategory::Beverages => "beverages",
            IngredientCategory::Other => "other",
        }
    }

    /// Default storage for a user-added ingredient of this category.
    pub fn default_storage(&self) -> StorageType {
        match self {
            IngredientCategory::Vegetables | IngredientCategory::Fruits => StorageType::Fridge,
            _ => StorageType::Pantry,
        }
    }
}

impl fmt::Display for IngredientCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IngredientCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| format!("Unknown ingredient category: {}", s))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum StorageType {
    Fridge,
    Pantry,
    Freezer,
    RoomTemperature,
}

/// Nutrition values per 100 g.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Nutrition {
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
    #[serde(default)]
    pub fiber: f64,
    #[serde(default)]
    pub sugar: f64,
    #[serde(default)]
    pub sodium: f64,
}

impl Nutrition {
    pub const fn new(calories: f64, protein: f64, carbs: f64, fat: f64, fiber: f64) -> Self {
        Self {
            calories,
            protein,
            carbs,
            fat,
            fiber,
            sugar: 0.0,
            sodium: 0.0,
        }
    }
}

impl Default for Nutrition {
    /// Placeholder values for user-added ingredients.
    fn default() -> Self {
        Self::new(50.0, 1.0, 10.0, 0.5, 1.0)
    }
}

/// Partial nutrition supplied with a custom ingredient; missing fields
/// fall back to [`Nutrition::default`].
#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EstimatedNutrition {
    pub calories: Option<f64>,
    pub protein: Option<f64>,
    pub carbs: Option<f64>,
    pub fat: Option<f64>,
    pub fiber: Option<f64>,
    pub sugar: Option<f64>,
    pub sodium: Option<f64>,
}

impl EstimatedNutrition {
    pub fn into_nutrition(self) -> Nutrition {
        let base = Nutrition::default();
        Nutrition {
            calories: self.calories.unwrap_or(base.calories),
            protein: self.protein.unwrap_or(base.protein),
            carbs: self.carbs.unwrap_or(base.carbs),
            fat: self.fat.unwrap_or(base.fat),
            fiber: self.fiber.unwrap_or(base.fiber),
            sugar: self.sugar.unwrap_or(base.sugar),
            sodium: self.sodium.unwrap_or(base.sodium),
        }
    }
}

/// A stored ingredient document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Ingredient {
    pub id: IngredientId,
    pub name: String,
    pub category: IngredientCategory,
    pub nutrition_per_100g: Nutrition,
    pub common_names: Vec<String>,
    /// Shelf life in days
    pub shelf_life: u32,
    pub storage_type: StorageType,
    pub image_url: Option<String>,
    pub is_verified: bool,
    pub created_at: DateTime<Utc>,
}

impl Ingredient {
    /// True if `name` (case-insensitive) is the ingredient's name or one of
    /// its common names.
    pub fn answers_to(&self, name: &str) -> bool {
        let name = name.trim().to_lowercase();
        self.name == name || self.common_names.iter().any(|n| *n == name)
    }
}

/// Fields of an ingredient before it is stored.
#[derive(Debug, Clone)]
pub struct NewIngredient {
    pub name: String,
    pub category: IngredientCategory,
    pub nutrition_per_100g: Nutrition,
    pub common_names: Vec<String>,
    pub shelf_life: u32,
    pub storage_type: StorageType,
    pub is_verified: bool,
}

impl NewIngredient {
    /// A verified catalogue entry; the name doubles as a common name.
    pub fn catalogue(
        name: &str,
        category: IngredientCategory,
        nutrition_per_100g: Nutrition,
        common_names: &[&str],
        shelf_life: u32,
        storage_type: StorageType,
    ) -> Self {
        Self {
            name: name.to_string(),
            category,
            nutrition_per_100g,
            common_names: common_names.iter().map(|n| n.to_string()).collect(),
            shelf_life,
            storage_type,
            is_verified: true,
        }
    }

    /// An unverified user-added ingredient with default shelf life and
    /// storage.
    pub fn custom(dto: CreateCustomIngredientDto) -> Self {
        let name = dto.name.trim().to_lowercase();
        Self {
            common_names: vec![name.clone()],
            name,
            storage_type: dto.category.default_storage(),
            category: dto.category,
            nutrition_per_100g: dto.estimated_nutrition.unwrap_or_default().into_nutrition(),
            shelf_life: 7,
            is_verified: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize, IntoParams, ToSchema)]
pub struct IngredientSearchParams {
    /// Search text, at least two characters
    pub q: Option<String>,
    pub category: Option<IngredientCategory>,
    /// Maximum number of results (default 20)
    pub limit: Option<usize>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCustomIngredientDto {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    pub category: IngredientCategory,
    pub estimated_nutrition: Option<EstimatedNutrition>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CategoryCount {
    pub name: IngredientCategory,
    pub count: u64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct IngredientSearchResponse {
    pub ingredients: Vec<Ingredient>,
    pub count: usize,
    pub query: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TotalCountResponse {
    pub total_count: u64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct IngredientResponse {
    pub ingredient: Ingredient,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CustomIngredientResponse {
    pub ingredient: Ingredient,
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SeededIngredient {
    pub name: String,
    pub category: IngredientCategory,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SeedResponse {
    pub message: String,
    pub ingredients_added: usize,
    pub ingredients: Vec<SeededIngredient>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_category_serde_is_kebab_case() {
        assert_eq!(
            serde_json::to_value(IngredientCategory::NutsSeeds).unwrap(),
            json!("nuts-seeds")
        );
        let parsed: IngredientCategory = serde_json::from_value(json!("oils-fats")).unwrap();
        assert_eq!(parsed, IngredientCategory::OilsFats);
    }

    #[test]
    fn test_category_from_str_matches_serde() {
        for category in IngredientCategory::ALL {
            assert_eq!(category.as_str().parse::<IngredientCategory>(), Ok(category));
        }
        assert!("candy".parse::<IngredientCategory>().is_err());
    }

    #[test]
    fn test_custom_ingredient_defaults() {
        let dto: CreateCustomIngredientDto = serde_json::from_value(json!({
            "name": "  Kale ",
            "category": "vegetables",
            "estimatedNutrition": {"calories": 49}
        }))
        .unwrap();

        let new = NewIngredient::custom(dto);
        assert_eq!(new.name, "kale");
        assert_eq!(new.common_names, vec!["kale"]);
        assert_eq!(new.storage_type, StorageType::Fridge);
        assert_eq!(new.shelf_life, 7);
        assert!(!new.is_verified);
        assert_eq!(new.nutrition_per_100g.calories, 49.0);
        assert_eq!(new.nutrition_per_100g.protein, 1.0);
    }

    #[test]
    fn test_custom_pantry_storage() {
        let dto = CreateCustomIngredientDto {
            name: "lentils".into(),
            category: IngredientCategory::Legumes,
            estimated_nutrition: None,
        };
        assert_eq!(NewIngredient::custom(dto).storage_type, StorageType::Pantry);
    }

    #[test]
    fn test_custom_dto_validation() {
        let dto = CreateCustomIngredientDto {
            name: String::new(),
            category: IngredientCategory::Other,
            estimated_nutrition: None,
        };
        assert!(dto.validate().is_err());
    }

    #[test]
    fn test_ingredient_json_shape() {
        let ingredient = Ingredient {
            id: IngredientId::from_u128(7),
            name: "milk".into(),
            category: IngredientCategory::Dairy,
            nutrition_per_100g: Nutrition::new(42.0, 3.4, 5.0, 1.0, 0.0),
            common_names: vec!["milk".into()],
            shelf_life: 7,
            storage_type: StorageType::Fridge,
            image_url: None,
            is_verified: true,
            created_at: Utc::now(),
        };

        let value = serde_json::to_value(&ingredient).unwrap();
        assert_eq!(value["nutritionPer100g"]["calories"], 42.0);
        assert_eq!(value["storageType"], "fridge");
        assert_eq!(value["commonNames"], json!(["milk"]));
        assert!(ingredient.answers_to("MILK"));
        assert!(!ingredient.answers_to("cream"));
    }
}
