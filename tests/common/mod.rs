use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{HeaderMap, Request, StatusCode};
use fridgewise::ai::{AiError, AiProvider};
use fridgewise::router::init_router;
use fridgewise::state::AppState;
use fridgewise_auth::create_access_token;
use fridgewise_cache::CacheStore;
use fridgewise_config::JwtConfig;
use fridgewise_models::{DetectedIngredient, Detection, GenerateRecipeDto, GeneratedRecipe};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

pub const TEST_SECRET: &str = "integration-test-secret";

/// AI provider that answers instantly and counts how often it was asked.
///
/// Setting `offline` makes recipe generation report the provider as
/// unavailable.
#[derive(Default)]
pub struct CountingAi {
    pub detections: AtomicUsize,
    pub generations: AtomicUsize,
    pub offline: AtomicBool,
}

#[async_trait]
impl AiProvider for CountingAi {
    fn name(&self) -> &'static str {
        "counting"
    }

    async fn detect_ingredients(
        &self,
        _image_url: &str,
        confidence: f64,
    ) -> Result<Detection, AiError> {
        self.detections.fetch_add(1, Ordering::SeqCst);
        Ok(Detection {
            ingredients: vec![DetectedIngredient {
                name: "carrot".to_string(),
                confidence,
                category: Some("vegetables".to_string()),
                quantity_estimate: None,
                freshness: None,
            }],
            provider: "counting",
            model: "counting-v1".to_string(),
        })
    }

    async fn generate_recipe(
        &self,
        request: &GenerateRecipeDto,
    ) -> Result<GeneratedRecipe, AiError> {
        self.generations.fetch_add(1, Ordering::SeqCst);
        if self.offline.load(Ordering::SeqCst) {
            return Err(AiError::Unavailable("model is loading".to_string()));
        }
        Ok(GeneratedRecipe {
            id: "ai-test".to_string(),
            title: format!("{} bowl", request.ingredients.join(" and ")),
            description: String::new(),
            ingredients: vec![],
            instructions: vec!["Combine everything".to_string()],
            servings: request.servings.unwrap_or(2),
            cooking_time: 15,
            difficulty: "easy".to_string(),
        })
    }
}

#[allow(dead_code)]
pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub ai: Arc<CountingAi>,
}

pub fn jwt_config() -> JwtConfig {
    JwtConfig {
        secret: TEST_SECRET.to_string(),
        access_token_expiry: 3600,
    }
}

#[allow(dead_code)]
pub fn setup_test_app() -> TestApp {
    setup_test_app_with(|_| {})
}

/// Builds the router over a state the caller has tweaked.
#[allow(dead_code)]
pub fn setup_test_app_with(configure: impl FnOnce(&mut AppState)) -> TestApp {
    let ai = Arc::new(CountingAi::default());
    let mut state =
        AppState::in_memory(jwt_config(), ai.clone()).expect("in-memory state builds");
    configure(&mut state);

    TestApp {
        router: init_router(state.clone()),
        state,
        ai,
    }
}

#[allow(dead_code)]
pub fn token_for(user_id: &str) -> String {
    create_access_token(user_id, &format!("{user_id}@example.com"), &jwt_config())
        .expect("token is created")
}

#[allow(dead_code)]
pub fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {token}"));
    }
    builder.body(Body::empty()).unwrap()
}

#[allow(dead_code)]
pub fn post_json(uri: &str, token: Option<&str>, body: &str) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header("Content-Type", "application/json");
    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

#[allow(dead_code)]
impl TestResponse {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn cache_status(&self) -> Option<&str> {
        self.header("x-cache")
    }

    pub fn cache_key(&self) -> String {
        self.header("x-cache-key")
            .expect("response carries a cache key")
            .to_string()
    }
}

pub async fn send(router: &Router, request: Request<Body>) -> TestResponse {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };

    TestResponse {
        status,
        headers,
        body,
    }
}

/// Cache writes happen in a detached task; poll until the entry lands.
#[allow(dead_code)]
pub async fn wait_for_key(state: &AppState, key: &str) -> bool {
    let store = state.cache.store();
    for _ in 0..200 {
        if store.exists(key).await {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    false
}

#[allow(dead_code)]
pub async fn wait_for_absence(state: &AppState, key: &str) -> bool {
    let store = state.cache.store();
    for _ in 0..200 {
        if !store.exists(key).await {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    false
}
