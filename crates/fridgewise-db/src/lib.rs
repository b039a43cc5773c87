//! # FridgeWise DB
//!
//! Document store seam for the FridgeWise API.
//!
//! Handlers only see the [`IngredientStore`] and [`RecipeStore`] traits.
//! [`MemoryDocumentStore`] implements both in process and backs
//! development and tests; it also carries the sample catalogue the
//! `seed-dev` route loads.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use fridgewise_db::{IngredientStore, MemoryDocumentStore};
//!
//! let store = Arc::new(MemoryDocumentStore::seeded());
//! let total = store.count().await?;
//! ```

pub mod error;
pub mod memory;
pub mod repository;
pub mod seed;

pub use error::StoreError;
pub use memory::MemoryDocumentStore;
pub use repository::{IngredientSearch, IngredientStore, RecipeQuery, RecipeStore};
