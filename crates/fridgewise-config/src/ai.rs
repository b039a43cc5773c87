use std::env;
use std::time::Duration;

/// Which AI backend serves detection and recipe generation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AiProviderKind {
    Ollama,
    Disabled,
}

/// AI provider configuration loaded from environment variables.
///
/// # Environment Variables
///
/// - `AI_PROVIDER`: `ollama` or `disabled` (default: `ollama`)
/// - `OLLAMA_BASE_URL`: default `http://localhost:11434`
/// - `OLLAMA_VISION_MODEL`: default `llava:7b`
/// - `OLLAMA_TEXT_MODEL`: default `llama3.2`
/// - `AI_TIMEOUT_SECONDS`: request timeout (default: `60`)
#[derive(Clone, Debug)]
pub struct AiConfig {
    pub provider: AiProviderKind,
    pub ollama_base_url: String,
    pub vision_model: String,
    pub text_model: String,
    pub timeout: Duration,
}

impl AiConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let provider = match env::var("AI_PROVIDER").as_deref().map(str::trim) {
            Ok("disabled") | Ok("none") => AiProviderKind::Disabled,
            _ => defaults.provider,
        };

        Self {
            provider,
            ollama_base_url: env::var("OLLAMA_BASE_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or(defaults.ollama_base_url),
            vision_model: env::var("OLLAMA_VISION_MODEL").unwrap_or(defaults.vision_model),
            text_model: env::var("OLLAMA_TEXT_MODEL").unwrap_or(defaults.text_model),
            timeout: env::var("AI_TIMEOUT_SECONDS")
                .ok()
                .and_then(|s| s.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.timeout),
        }
    }
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            provider: AiProviderKind::Ollama,
            ollama_base_url: "http://localhost:11434".to_string(),
            vision_model: "llava:7b".to_string(),
            text_model: "llama3.2".to_string(),
            timeout: Duration::from_secs(60),
        }
    }
}
