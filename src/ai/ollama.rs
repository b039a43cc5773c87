use async_trait::async_trait;
use base64::{Engine as _, engine::general_purpose::STANDARD};
use chrono::Utc;
use fridgewise_config::AiConfig;
use fridgewise_models::{
    DetectedIngredient, Detection, GenerateRecipeDto, GeneratedIngredient, GeneratedRecipe,
    IngredientCategory,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use super::{AiError, AiProvider};

const DETECTION_TEMPERATURE: f32 = 0.1;
const GENERATION_TEMPERATURE: f32 = 0.7;
const MAX_PREDICT_TOKENS: u32 = 1000;
/// Minutes, when the model leaves it out.
const DEFAULT_COOKING_TIME: u32 = 20;
const DEFAULT_DIFFICULTY: &str = "medium";

/// Talks to a local Ollama server over its `/api/generate` endpoint.
#[derive(Debug, Clone)]
pub struct OllamaProvider {
    client: reqwest::Client,
    base_url: String,
    vision_model: String,
    text_model: String,
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    images: Vec<String>,
    format: &'static str,
    stream: bool,
    options: GenerateOptions,
}

#[derive(Debug, Serialize)]
struct GenerateOptions {
    temperature: f32,
    num_predict: u32,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: String,
}

impl OllamaProvider {
    pub fn new(config: &AiConfig) -> Result<Self, AiError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| AiError::Request(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.ollama_base_url.trim_end_matches('/').to_string(),
            vision_model: config.vision_model.clone(),
            text_model: config.text_model.clone(),
        })
    }

    async fn fetch_image(&self, image_url: &str) -> Result<String, AiError> {
        let response = self
            .client
            .get(image_url)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(image_error)?;
        let bytes = response.bytes().await.map_err(image_error)?;

        debug!(image.bytes = bytes.len(), "Fetched image for detection");
        Ok(STANDARD.encode(&bytes))
    }

    async fn generate(&self, request: GenerateRequest<'_>) -> Result<String, AiError> {
        let url = format!("{}/api/generate", self.base_url);
        debug!(ai.model = request.model, prompt_len = request.prompt.len(), "Calling Ollama");

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(request_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(AiError::Request(format!("Ollama responded with {status}")));
        }

        let body: GenerateResponse = response
            .json()
            .await
            .map_err(|e| AiError::InvalidResponse(e.to_string()))?;
        Ok(body.response)
    }
}

#[async_trait]
impl AiProvider for OllamaProvider {
    fn name(&self) -> &'static str {
        "ollama"
    }

    #[instrument(skip(self))]
    async fn detect_ingredients(
        &self,
        image_url: &str,
        confidence: f64,
    ) -> Result<Detection, AiError> {
        let image = self.fetch_image(image_url).await?;

        let text = self
            .generate(GenerateRequest {
                model: &self.vision_model,
                prompt: detection_prompt(confidence),
                images: vec![image],
                format: "json",
                stream: false,
                options: GenerateOptions {
                    temperature: DETECTION_TEMPERATURE,
                    num_predict: MAX_PREDICT_TOKENS,
                },
            })
            .await?;

        let ingredients = parse_detections(&text, confidence)
            .inspect_err(|e| warn!(error = %e, raw = %text, "Unusable detection response"))?;

        info!(
            ai.model = %self.vision_model,
            detected = ingredients.len(),
            "Ollama detection complete"
        );
        Ok(Detection {
            ingredients,
            provider: self.name(),
            model: self.vision_model.clone(),
        })
    }

    #[instrument(skip(self))]
    async fn generate_recipe(
        &self,
        request: &GenerateRecipeDto,
    ) -> Result<GeneratedRecipe, AiError> {
        let text = self
            .generate(GenerateRequest {
                model: &self.text_model,
                prompt: recipe_prompt(request),
                images: Vec::new(),
                format: "json",
                stream: false,
                options: GenerateOptions {
                    temperature: GENERATION_TEMPERATURE,
                    num_predict: MAX_PREDICT_TOKENS,
                },
            })
            .await?;

        let recipe = parse_recipe(&text, request)
            .inspect_err(|e| warn!(error = %e, raw = %text, "Unusable recipe response"))?;

        info!(ai.model = %self.text_model, recipe.id = %recipe.id, "Ollama recipe generated");
        Ok(recipe)
    }
}

fn request_error(err: reqwest::Error) -> AiError {
    if err.is_timeout() {
        AiError::Timeout
    } else if err.is_connect() {
        AiError::Unavailable(err.to_string())
    } else {
        AiError::Request(err.to_string())
    }
}

fn image_error(err: reqwest::Error) -> AiError {
    if err.is_timeout() {
        AiError::Timeout
    } else {
        AiError::Request(format!("Failed to fetch image: {err}"))
    }
}

fn detection_prompt(confidence: f64) -> String {
    let categories: Vec<&str> = IngredientCategory::ALL.iter().map(|c| c.as_str()).collect();

    format!(
        r#"Identify every food ingredient visible in this image.
Reply with a JSON object {{"ingredients": [...]}} where each item has this shape:
{{"name": "ingredient name", "confidence": 0.95, "category": "{categories}", "quantity_estimate": "approximate visible amount", "freshness": "fresh|good|questionable"}}
Only list ingredients you identify with confidence >= {confidence}.
Use the common names people search for in recipes.
If nothing is recognisable, reply with {{"ingredients": []}}."#,
        categories = categories.join("|"),
    )
}

fn recipe_prompt(request: &GenerateRecipeDto) -> String {
    let mut prompt = format!(
        "Create an original recipe with these ingredients: {}. Reply in JSON with the fields: \
         title, description, ingredients (array of objects {{name, amount, unit}}), \
         instructions (array of steps), servings, cookingTime, difficulty.",
        request.ingredients.join(", ")
    );
    if let Some(servings) = request.servings {
        prompt.push_str(&format!(" The recipe must be for {servings} servings."));
    }
    if let Some(max_prep_time) = request.max_prep_time {
        prompt.push_str(&format!(
            " The total preparation time must not exceed {max_prep_time} minutes."
        ));
    }
    if let Some(difficulty) = request.difficulty {
        prompt.push_str(&format!(
            " The difficulty must be \"{}\".",
            difficulty.as_str()
        ));
    }
    prompt
}

/// Slice from the first `open` to the last `close`, inclusive.
fn embedded_json(text: &str, open: char, close: char) -> Option<&str> {
    let start = text.find(open)?;
    let end = text.rfind(close)?;
    (end > start).then(|| &text[start..=end])
}

/// Parses the whole reply, or failing that the outermost `open`..`close`
/// span inside it.
fn parse_reply(text: &str, open: char, close: char) -> Option<Value> {
    serde_json::from_str(text.trim()).ok().or_else(|| {
        embedded_json(text, open, close).and_then(|span| serde_json::from_str(span).ok())
    })
}

fn parse_detections(text: &str, confidence: f64) -> Result<Vec<DetectedIngredient>, AiError> {
    let value = parse_reply(text, '[', ']')
        .ok_or_else(|| AiError::InvalidResponse("no JSON in detection response".into()))?;

    let items = match value {
        Value::Array(items) => items,
        Value::Object(mut fields) => match fields.remove("ingredients") {
            Some(Value::Array(items)) => items,
            None => Vec::new(),
            Some(_) => {
                return Err(AiError::InvalidResponse(
                    "detection ingredients is not a list".into(),
                ));
            }
        },
        _ => {
            return Err(AiError::InvalidResponse(
                "detection response is not a list".into(),
            ));
        }
    };

    Ok(items
        .into_iter()
        .filter_map(|item| serde_json::from_value::<DetectedIngredient>(item).ok())
        .filter(|d| {
            !d.name.trim().is_empty() && d.confidence >= confidence && d.category.is_some()
        })
        .collect())
}

fn parse_recipe(text: &str, request: &GenerateRecipeDto) -> Result<GeneratedRecipe, AiError> {
    let Some(Value::Object(recipe)) = parse_reply(text, '{', '}') else {
        return Err(AiError::InvalidResponse(
            "no recipe object in response".into(),
        ));
    };

    let text_field = |key: &str| recipe.get(key).and_then(Value::as_str).map(str::to_string);

    let title = text_field("title")
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| AiError::InvalidResponse("recipe has no title".into()))?;

    let ingredients = recipe
        .get("ingredients")
        .and_then(Value::as_array)
        .map(|items| items.iter().filter_map(generated_ingredient).collect())
        .unwrap_or_default();

    let instructions = recipe
        .get("instructions")
        .and_then(Value::as_array)
        .map(|steps| {
            steps
                .iter()
                .enumerate()
                .map(|(index, step)| instruction_text(index, step))
                .collect()
        })
        .unwrap_or_default();

    let difficulty = match recipe.get("difficulty") {
        Some(Value::String(level)) => level.clone(),
        Some(Value::Object(fields)) => fields
            .get("level")
            .and_then(Value::as_str)
            .unwrap_or(DEFAULT_DIFFICULTY)
            .to_string(),
        _ => DEFAULT_DIFFICULTY.to_string(),
    };

    Ok(GeneratedRecipe {
        id: format!("ai-{}", Utc::now().timestamp_millis()),
        title,
        description: text_field("description").unwrap_or_default(),
        ingredients,
        instructions,
        servings: positive_int(recipe.get("servings"))
            .or(request.servings)
            .unwrap_or(1),
        cooking_time: positive_int(recipe.get("cookingTime"))
            .or_else(|| positive_int(recipe.get("cookTime")))
            .unwrap_or(DEFAULT_COOKING_TIME),
        difficulty,
    })
}

fn generated_ingredient(item: &Value) -> Option<GeneratedIngredient> {
    match item {
        Value::String(name) => Some(GeneratedIngredient {
            name: name.clone(),
            amount: None,
            unit: String::new(),
        }),
        Value::Object(fields) => Some(GeneratedIngredient {
            name: fields.get("name")?.as_str()?.to_string(),
            amount: fields.get("amount").filter(|v| !v.is_null()).cloned(),
            unit: fields
                .get("unit")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
        }),
        _ => None,
    }
}

fn instruction_text(index: usize, step: &Value) -> String {
    let text = match step {
        Value::String(text) => Some(text.clone()),
        Value::Object(fields) => fields
            .get("instruction")
            .or_else(|| fields.get("text"))
            .and_then(Value::as_str)
            .map(str::to_string),
        _ => None,
    };
    text.unwrap_or_else(|| format!("Step {}", index + 1))
}

fn positive_int(value: Option<&Value>) -> Option<u32> {
    value
        .and_then(Value::as_u64)
        .filter(|n| *n > 0)
        .and_then(|n| u32::try_from(n).ok())
}
