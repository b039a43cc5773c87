//! # FridgeWise Core
//!
//! Core types shared across the FridgeWise API crates:
//!
//! - [`errors`]: Application error type with HTTP response conversion
//! - [`response`]: The `{ success, data }` response envelope
//!
//! # Example
//!
//! ```ignore
//! use fridgewise_core::{ApiResponse, AppError};
//!
//! async fn handler() -> Result<ApiResponse<Vec<String>>, AppError> {
//!     let names = load().await.map_err(AppError::internal)?;
//!     Ok(ApiResponse::ok(names))
//! }
//! ```

pub mod errors;
pub mod response;

// Re-export commonly used types at crate root
pub use errors::AppError;
pub use response::ApiResponse;
