//! Document identifiers.
//!
//! Ingredients and recipes are keyed by UUIDs that travel as bare strings on
//! the wire and in cache keys. Separate newtypes stop a recipe id from being
//! looked up in the ingredient collection.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

macro_rules! document_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
        #[serde(transparent)]
        #[schema(value_type = String, format = "uuid")]
        pub struct $name(Uuid);

        impl $name {
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Fixed id for seed documents.
            pub const fn from_u128(v: u128) -> Self {
                Self(Uuid::from_u128(v))
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(s.trim()).map(Self)
            }
        }
    };
}

document_id!(IngredientId);
document_id!(RecipeId);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_bare_strings_on_the_wire() {
        let id = RecipeId::from_u128(0x101);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"00000000-0000-0000-0000-000000000101\"");

        let back: RecipeId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn test_parse_rejects_malformed_ids() {
        let id: IngredientId = " 00000000-0000-0000-0000-000000000001 ".parse().unwrap();
        assert_eq!(id, IngredientId::from_u128(1));
        assert!("42".parse::<IngredientId>().is_err());
        assert!("".parse::<RecipeId>().is_err());
    }

    #[test]
    fn test_fresh_ids_differ() {
        assert_ne!(IngredientId::new(), IngredientId::new());
        assert_eq!(
            format!("{:?}", RecipeId::from_u128(0)),
            "RecipeId(00000000-0000-0000-0000-000000000000)"
        );
    }
}
