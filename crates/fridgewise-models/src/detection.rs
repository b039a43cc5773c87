//! Models for detecting ingredients in a photo.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::ids::IngredientId;
use crate::ingredients::{Nutrition, StorageType};

/// Default minimum confidence for detected ingredients.
pub const DEFAULT_CONFIDENCE: f64 = 0.7;

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DetectIngredientsDto {
    #[validate(url(message = "Image URL is required"))]
    pub image_url: String,
    #[validate(range(min = 0.0, max = 1.0, message = "Confidence must be between 0 and 1"))]
    pub confidence: Option<f64>,
}

impl DetectIngredientsDto {
    pub fn confidence(&self) -> f64 {
        self.confidence.unwrap_or(DEFAULT_CONFIDENCE)
    }
}

/// One ingredient as reported by the vision model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DetectedIngredient {
    pub name: String,
    pub confidence: f64,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default, alias = "quantity_estimate")]
    pub quantity_estimate: Option<String>,
    #[serde(default)]
    pub freshness: Option<String>,
}

/// A detected ingredient that resolved to a stored ingredient.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MatchedIngredient {
    #[serde(flatten)]
    pub detected: DetectedIngredient,
    pub ingredient_id: IngredientId,
    pub nutrition_per_100g: Nutrition,
    pub storage_type: StorageType,
    pub shelf_life: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProviderInfo {
    pub model: String,
    pub total_detected: usize,
}

/// Raw provider output before matching against stored ingredients.
#[derive(Debug, Clone)]
pub struct Detection {
    pub ingredients: Vec<DetectedIngredient>,
    pub provider: &'static str,
    pub model: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DetectionResult {
    pub total_detected: usize,
    pub matched: Vec<MatchedIngredient>,
    pub unknown: Vec<DetectedIngredient>,
    pub image_url: String,
    pub ai_provider: String,
    pub provider_info: ProviderInfo,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_detect_dto_validation() {
        let ok = DetectIngredientsDto {
            image_url: "https://example.com/fridge.jpg".into(),
            confidence: Some(0.5),
        };
        assert!(ok.validate().is_ok());

        let bad_url = DetectIngredientsDto {
            image_url: "fridge.jpg".into(),
            confidence: None,
        };
        assert!(bad_url.validate().is_err());

        let bad_confidence = DetectIngredientsDto {
            image_url: "https://example.com/fridge.jpg".into(),
            confidence: Some(1.5),
        };
        assert!(bad_confidence.validate().is_err());
    }

    #[test]
    fn test_default_confidence() {
        let dto: DetectIngredientsDto =
            serde_json::from_value(json!({"imageUrl": "https://example.com/a.png"})).unwrap();
        assert_eq!(dto.confidence(), DEFAULT_CONFIDENCE);
    }

    #[test]
    fn test_detected_accepts_snake_case_estimate() {
        let detected: DetectedIngredient = serde_json::from_value(json!({
            "name": "tomato",
            "confidence": 0.9,
            "quantity_estimate": "3 pieces"
        }))
        .unwrap();
        assert_eq!(detected.quantity_estimate.as_deref(), Some("3 pieces"));
        assert_eq!(detected.category, None);
    }
}
