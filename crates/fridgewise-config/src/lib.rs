//! # FridgeWise Config
//!
//! Configuration types for the FridgeWise API.
//!
//! This crate provides configuration structures loaded from environment variables:
//!
//! - [`server`]: Bind address, ports and runtime environment
//! - [`jwt`]: JWT authentication configuration
//! - [`cors`]: CORS (Cross-Origin Resource Sharing) configuration
//! - [`ai`]: AI provider configuration
//!
//! Cache settings live in `fridgewise-cache` next to the code that reads them.
//!
//! # Example
//!
//! ```ignore
//! use fridgewise_config::{AiConfig, CorsConfig, JwtConfig, ServerConfig};
//!
//! // Load all configs from environment
//! let server_config = ServerConfig::from_env();
//! let jwt_config = JwtConfig::from_env();
//! let cors_config = CorsConfig::from_env();
//! let ai_config = AiConfig::from_env();
//! ```

pub mod ai;
pub mod cors;
pub mod jwt;
pub mod server;

// Re-export commonly used types at crate root
pub use ai::{AiConfig, AiProviderKind};
pub use cors::CorsConfig;
pub use jwt::JwtConfig;
pub use server::{Environment, ServerConfig};
