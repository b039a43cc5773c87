//! # FridgeWise Auth
//!
//! Authentication types and JWT utilities for the FridgeWise API.
//!
//! This crate provides:
//!
//! - [`claims`]: JWT claim structure for access tokens
//! - [`jwt`]: Token creation and verification utilities
//!
//! The verified subject is the identity user-scoped cache keys are built
//! from.
//!
//! # Example
//!
//! ```ignore
//! use fridgewise_auth::{create_access_token, verify_token};
//! use fridgewise_config::JwtConfig;
//!
//! let config = JwtConfig::from_env();
//!
//! let token = create_access_token("user-42", "cook@example.com", &config)?;
//! let claims = verify_token(&token, &config)?;
//! println!("User ID: {}", claims.sub);
//! ```

pub mod claims;
pub mod jwt;

// Re-export commonly used types at crate root
pub use claims::Claims;
pub use jwt::{create_access_token, verify_token};
