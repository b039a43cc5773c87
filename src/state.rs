use std::sync::Arc;
use std::time::Instant;

use fridgewise_cache::{CacheConfig, ResponseCache};
use fridgewise_config::{AiConfig, CorsConfig, Environment, JwtConfig, ServerConfig};
use fridgewise_db::{IngredientStore, MemoryDocumentStore, RecipeStore};
use tracing::info;

use crate::ai::{AiProvider, build_provider};

#[derive(Clone)]
pub struct AppState {
    pub ingredients: Arc<dyn IngredientStore>,
    pub recipes: Arc<dyn RecipeStore>,
    pub ai: Arc<dyn AiProvider>,
    pub cache: ResponseCache,
    pub jwt_config: JwtConfig,
    pub cors_config: CorsConfig,
    pub server_config: ServerConfig,
    pub started_at: Instant,
}

impl AppState {
    /// Seeded in-process document store and an in-memory response cache.
    pub fn in_memory(jwt_config: JwtConfig, ai: Arc<dyn AiProvider>) -> anyhow::Result<Self> {
        let documents = Arc::new(MemoryDocumentStore::seeded());

        Ok(Self {
            ingredients: documents.clone(),
            recipes: documents,
            ai,
            cache: ResponseCache::from_config(&CacheConfig::in_memory())?,
            jwt_config,
            cors_config: CorsConfig::default(),
            server_config: ServerConfig {
                environment: Environment::Test,
                ..ServerConfig::default()
            },
            started_at: Instant::now(),
        })
    }
}

pub fn init_app_state() -> anyhow::Result<AppState> {
    let server_config = ServerConfig::from_env();
    let documents = Arc::new(MemoryDocumentStore::seeded());
    let cache = ResponseCache::from_config(&CacheConfig::from_env())?;
    let ai = build_provider(&AiConfig::from_env())?;
    let jwt_config = JwtConfig::from_env();

    if server_config.environment == Environment::Production && jwt_config.uses_dev_secret() {
        anyhow::bail!("JWT_SECRET must be set in production");
    }

    info!(
        environment = %server_config.environment,
        ai.provider = ai.name(),
        "Application state initialized"
    );

    Ok(AppState {
        ingredients: documents.clone(),
        recipes: documents,
        ai,
        cache,
        jwt_config,
        cors_config: CorsConfig::from_env(),
        server_config,
        started_at: Instant::now(),
    })
}
