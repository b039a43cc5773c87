//! # FridgeWise API
//!
//! An Axum REST API that suggests recipes from the ingredients a user has on
//! hand, with a Redis-backed HTTP response cache in front of the expensive
//! routes.
//!
//! ## Overview
//!
//! - **Ingredients**: catalogue search, categories, custom ingredients and
//!   photo detection through an AI provider
//! - **Recipes**: suggestions ranked by how much of each recipe is covered,
//!   falling back to an AI-generated recipe, plus ratings
//! - **Response caching**: read-through caching per content type, scoped to
//!   the authenticated user, with pattern invalidation after mutations
//!   (see `fridgewise-cache`)
//!
//! ## Architecture
//!
//! ```text
//! src/
//! ├── ai/              # AI provider seam (Ollama, disabled)
//! ├── middleware/      # Bearer token authentication
//! ├── modules/         # Feature modules
//! │   ├── health/      # Liveness + cache statistics
//! │   ├── ingredients/ # Ingredient routes
//! │   └── recipes/     # Recipe routes
//! ├── docs.rs          # OpenAPI document
//! ├── router.rs        # Route tree, cache layers, CORS, logging
//! ├── state.rs         # Shared application state
//! └── validator.rs     # Validated JSON extractor
//! ```
//!
//! Each feature module follows a consistent structure:
//!
//! - `mod.rs`: Module exports
//! - `controller.rs`: HTTP handlers
//! - `service.rs`: Business logic
//! - `router.rs`: Axum router configuration, including the cache layers
//!
//! Models and DTOs live in `fridgewise-models`.
//!
//! ## Caching
//!
//! | Route | Content type | Scope |
//! |-------|--------------|-------|
//! | `GET /api/ingredients/categories` | ingredients | shared |
//! | `GET /api/ingredients/total-count` | ingredients | shared |
//! | `GET /api/ingredients/search` | ingredients | per user + query |
//! | `GET /api/ingredients/{id}` | ingredients | per user + path |
//! | `POST /api/ingredients/detect-from-image` | aiResults | per user + body |
//! | `POST /api/recipes/suggest` | recipes | per user + body |
//! | `POST /api/recipes/generate-ai` | aiResults | per user + body |
//! | `GET /api/recipes/{id}` | recipes | per user + path |
//!
//! `custom-add` and `seed-dev` evict `ingredients:*` (and `static:*`),
//! rating a recipe evicts `recipes:*`.
//!
//! ## Quick Start
//!
//! ```bash
//! REDIS_URL=redis://127.0.0.1:6379
//! JWT_SECRET=your-secure-secret-key
//! OLLAMA_BASE_URL=http://localhost:11434
//! cargo run
//! ```
//!
//! API documentation is served at `http://localhost:5000/scalar`.
//!
//! ## Modules
//!
//! - [`ai`]: AI provider trait and implementations
//! - [`docs`]: OpenAPI documentation setup
//! - [`middleware`]: Authentication middleware and extractors
//! - [`modules`]: Feature modules (health, ingredients, recipes)
//! - [`router`]: Main application router
//! - [`state`]: Shared application state
//! - [`validator`]: Request validation utilities

pub mod ai;
pub mod docs;
pub mod middleware;
pub mod modules;
pub mod router;
pub mod state;
pub mod validator;

// Re-export workspace crates for convenience
pub use fridgewise_auth;
pub use fridgewise_cache;
pub use fridgewise_config;
pub use fridgewise_core;
pub use fridgewise_db;
pub use fridgewise_models;
