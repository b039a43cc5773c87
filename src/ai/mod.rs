//! AI provider seam.
//!
//! Ingredient detection and recipe generation go through [`AiProvider`] so
//! handlers never talk to a model server directly. [`build_provider`] picks
//! the implementation from [`AiConfig`].

mod ollama;

use std::sync::Arc;

use async_trait::async_trait;
use axum::http::StatusCode;
use fridgewise_config::{AiConfig, AiProviderKind};
use fridgewise_core::AppError;
use fridgewise_models::{Detection, GenerateRecipeDto, GeneratedRecipe};
use thiserror::Error;
use tracing::info;

pub use ollama::OllamaProvider;

#[derive(Debug, Error)]
pub enum AiError {
    #[error("AI provider unavailable: {0}")]
    Unavailable(String),

    #[error("AI provider timed out")]
    Timeout,

    #[error("Invalid AI response: {0}")]
    InvalidResponse(String),

    #[error("AI request failed: {0}")]
    Request(String),
}

impl AiError {
    pub fn status(&self) -> StatusCode {
        match self {
            AiError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AiError::Timeout => StatusCode::GATEWAY_TIMEOUT,
            AiError::InvalidResponse(_) | AiError::Request(_) => StatusCode::BAD_GATEWAY,
        }
    }

    pub fn into_app_error(self) -> AppError {
        AppError::new(self.status(), self)
    }
}

#[async_trait]
pub trait AiProvider: Send + Sync {
    /// Short provider name reported to clients (`ollama`, ...).
    fn name(&self) -> &'static str;

    /// Ingredients visible in the image at `image_url` with at least
    /// `confidence`.
    async fn detect_ingredients(
        &self,
        image_url: &str,
        confidence: f64,
    ) -> Result<Detection, AiError>;

    async fn generate_recipe(&self, request: &GenerateRecipeDto)
    -> Result<GeneratedRecipe, AiError>;
}

/// Provider used when `AI_PROVIDER=disabled`; every call is unavailable.
#[derive(Debug, Default)]
pub struct DisabledProvider;

#[async_trait]
impl AiProvider for DisabledProvider {
    fn name(&self) -> &'static str {
        "disabled"
    }

    async fn detect_ingredients(
        &self,
        _image_url: &str,
        _confidence: f64,
    ) -> Result<Detection, AiError> {
        Err(AiError::Unavailable("AI features are disabled".into()))
    }

    async fn generate_recipe(
        &self,
        _request: &GenerateRecipeDto,
    ) -> Result<GeneratedRecipe, AiError> {
        Err(AiError::Unavailable("AI features are disabled".into()))
    }
}

pub fn build_provider(config: &AiConfig) -> Result<Arc<dyn AiProvider>, AiError> {
    match config.provider {
        AiProviderKind::Ollama => {
            info!(
                ai.base_url = %config.ollama_base_url,
                ai.vision_model = %config.vision_model,
                ai.text_model = %config.text_model,
                "Using Ollama AI provider"
            );
            Ok(Arc::new(OllamaProvider::new(config)?))
        }
        AiProviderKind::Disabled => {
            info!("AI provider disabled");
            Ok(Arc::new(DisabledProvider))
        }
    }
}
