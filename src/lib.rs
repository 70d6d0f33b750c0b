//! # Recipe Box
//!
//! Backend library for a recipe box: turns free-form ingredient text into
//! structured records, and stores recipes and shopping lists in PostgreSQL
//! with full-text recipe search.

pub mod config;
pub mod db;
pub mod errors;
pub mod ingredient_model;
pub mod ingredient_parser;
pub mod measurement_patterns;
pub mod measurement_types;
pub mod quantity;
pub mod recipe;
pub mod shopping_list;

pub use errors::{ParseError, QuantityError, RecipeError};
pub use ingredient_model::{ParsedIngredient, Unit};
pub use ingredient_parser::parse_ingredients;
pub use quantity::{number_to_fraction, string_to_number};
