//! Sample catalogue loaded by `seed-dev` and by [`MemoryDocumentStore::seeded`].
//!
//! [`MemoryDocumentStore::seeded`]: crate::MemoryDocumentStore::seeded

use fridgewise_models::{
    Difficulty, Ingredient, IngredientCategory as Cat, NewIngredient, Nutrition, Rating, Recipe,
    RecipeId, RecipeIngredient, StorageType,
};

/// The eight sample ingredients.
pub fn sample_ingredients() -> Vec<NewIngredient> {
    vec![
        NewIngredient::catalogue(
            "carrot",
            Cat::Vegetables,
            Nutrition::new(41.0, 0.9, 9.6, 0.2, 2.8),
            &["carrot", "carrots"],
            14,
            StorageType::Fridge,
        ),
        NewIngredient::catalogue(
            "onion",
            Cat::Vegetables,
            Nutrition::new(40.0, 1.1, 9.3, 0.1, 1.7),
            &["onion", "onions"],
            30,
            StorageType::Pantry,
        ),
        NewIngredient::catalogue(
            "apple",
            Cat::Fruits,
            Nutrition::new(52.0, 0.3, 14.0, 0.2, 2.4),
            &["apple", "apples"],
            14,
            StorageType::Fridge,
        ),
        NewIngredient::catalogue(
            "banana",
            Cat::Fruits,
            Nutrition::new(89.0, 1.1, 23.0, 0.3, 2.6),
            &["banana", "bananas"],
            5,
            StorageType::RoomTemperature,
        ),
        NewIngredient::catalogue(
            "chicken breast",
            Cat::Poultry,
            Nutrition::new(165.0, 31.0, 0.0, 3.6, 0.0),
            &["chicken breast", "chicken"],
            2,
            StorageType::Fridge,
        ),
        NewIngredient::catalogue(
            "rice",
            Cat::Grains,
            Nutrition::new(365.0, 7.1, 80.0, 0.7, 1.3),
            &["rice", "white rice"],
            365,
            StorageType::Pantry,
        ),
        NewIngredient::catalogue(
            "milk",
            Cat::Dairy,
            Nutrition::new(42.0, 3.4, 5.0, 1.0, 0.0),
            &["milk"],
            7,
            StorageType::Fridge,
        ),
        NewIngredient::catalogue(
            "olive oil",
            Cat::OilsFats,
            Nutrition::new(884.0, 0.0, 0.0, 100.0, 0.0),
            &["olive oil"],
            730,
            StorageType::Pantry,
        ),
    ]
}

struct RecipeSeed {
    id: u128,
    title: &'static str,
    description: &'static str,
    /// (ingredient name, quantity, unit, required)
    ingredients: &'static [(&'static str, f64, &'static str, bool)],
    instructions: &'static [&'static str],
    prep_time: u32,
    cook_time: u32,
    servings: u32,
    difficulty: Difficulty,
    cuisine: &'static str,
    tags: &'static [&'static str],
}

const RECIPES: &[RecipeSeed] = &[
    RecipeSeed {
        id: 0x101,
        title: "Chicken Fried Rice",
        description: "Quick fried rice with chicken and vegetables.",
        ingredients: &[
            ("chicken breast", 300.0, "g", true),
            ("rice", 2.0, "cups", true),
            ("carrot", 1.0, "piece", true),
            ("onion", 1.0, "piece", false),
            ("olive oil", 2.0, "tbsp", false),
        ],
        instructions: &[
            "Cook the rice and let it cool.",
            "Dice the chicken, carrot and onion.",
            "Fry the chicken in oil until golden.",
            "Add the vegetables, then the rice, and stir-fry for five minutes.",
        ],
        prep_time: 15,
        cook_time: 20,
        servings: 2,
        difficulty: Difficulty::Easy,
        cuisine: "chinese",
        tags: &["dinner", "stir-fry", "quick"],
    },
    RecipeSeed {
        id: 0x102,
        title: "Glazed Carrots",
        description: "Pan-glazed carrots with caramelised onion.",
        ingredients: &[
            ("carrot", 4.0, "pieces", true),
            ("olive oil", 1.0, "tbsp", true),
            ("onion", 1.0, "piece", false),
        ],
        instructions: &[
            "Slice the carrots and onion.",
            "Cook in oil over medium heat until tender and glossy.",
        ],
        prep_time: 10,
        cook_time: 15,
        servings: 2,
        difficulty: Difficulty::Easy,
        cuisine: "international",
        tags: &["vegetarian", "healthy"],
    },
    RecipeSeed {
        id: 0x103,
        title: "Banana Milkshake",
        description: "Cold banana shake.",
        ingredients: &[
            ("banana", 2.0, "pieces", true),
            ("milk", 1.0, "cup", true),
            ("apple", 1.0, "piece", false),
        ],
        instructions: &["Blend everything until smooth."],
        prep_time: 5,
        cook_time: 0,
        servings: 1,
        difficulty: Difficulty::Easy,
        cuisine: "american",
        tags: &["breakfast", "quick", "vegetarian"],
    },
];

/// Sample recipes wired to the given stored ingredients by name.
/// Recipe ingredients missing from `ingredients` are left out.
pub fn sample_recipes(ingredients: &[Ingredient]) -> Vec<Recipe> {
    RECIPES
        .iter()
        .map(|seed| Recipe {
            id: RecipeId::from_u128(seed.id),
            title: seed.title.to_string(),
            description: seed.description.to_string(),
            ingredients: seed
                .ingredients
                .iter()
                .filter_map(|(name, quantity, unit, required)| {
                    ingredients
                        .iter()
                        .find(|i| i.name == *name)
                        .map(|i| RecipeIngredient {
                            ingredient_id: i.id,
                            quantity: *quantity,
                            unit: unit.to_string(),
                            required: *required,
                        })
                })
                .collect(),
            instructions: seed.instructions.iter().map(|s| s.to_string()).collect(),
            prep_time: seed.prep_time,
            cook_time: seed.cook_time,
            servings: seed.servings,
            difficulty: seed.difficulty,
            cuisine: seed.cuisine.to_string(),
            tags: seed.tags.iter().map(|s| s.to_string()).collect(),
            rating: Rating::default(),
            source: "fridgewise".to_string(),
        })
        .collect()
}
