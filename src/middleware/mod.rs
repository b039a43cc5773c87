//! Request middleware and extractors.
//!
//! # Modules
//!
//! - [`auth`]: Bearer token authentication
//!
//! # Authentication Flow
//!
//! 1. Client sends request with `Authorization: Bearer <token>` header
//! 2. [`auth::require_auth`] verifies the JWT before anything else on the route runs
//! 3. The caller is stored as [`auth::AuthUser`] for handlers and as
//!    `CacheUser` so cached responses are scoped to that user
//!
//! # Example
//!
//! ```ignore
//! use axum::middleware::from_fn_with_state;
//! use crate::middleware::auth::{AuthUser, require_auth};
//!
//! let protected = Router::new()
//!     .route("/search", get(search))
//!     .route_layer(from_fn_with_state(state.clone(), require_auth));
//!
//! async fn search(auth_user: AuthUser) -> impl IntoResponse {
//!     // ...
//! }
//! ```

pub mod auth;
