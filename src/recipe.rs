//! # Recipe Records
//!
//! Request and record types for recipes, and the processing step that runs
//! on every create/update before anything is persisted: the raw ingredient
//! text is parsed and the raw comma-separated tags are split.

use crate::errors::RecipeError;
use crate::ingredient_model::ParsedIngredient;
use crate::ingredient_parser::parse_ingredients;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Maximum accepted title length, in characters
pub const MAX_TITLE_LENGTH: usize = 255;

/// Nutrition facts per serving
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Macros {
    pub carbs: Option<f64>,
    pub protein: Option<f64>,
    pub fat: Option<f64>,
    pub calories: Option<f64>,
}

/// Descriptive recipe fields that are stored as submitted
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeDetails {
    pub image: Option<String>,
    pub url: Option<String>,
    pub source: Option<String>,
    pub instructions: Option<String>,
    pub rating: Option<f64>,
    #[serde(default)]
    pub want_to_try: bool,
    pub servings: Option<i32>,
    pub cooking_time: Option<String>,
    pub prep_time: Option<String>,
    pub notes: Option<String>,
    pub author: Option<String>,
    pub storage: Option<String>,
    pub freezes: Option<bool>,
    pub equipment: Option<String>,
    pub macros: Option<Macros>,
}

/// A recipe as submitted by a client
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecipeInput {
    #[serde(default)]
    pub title: String,
    /// Raw multi-line ingredient text, one ingredient per line
    #[serde(default)]
    pub ingredients: String,
    /// Raw comma-separated tags
    pub tags: Option<String>,
    #[serde(flatten)]
    pub details: RecipeDetails,
}

/// A processed recipe, ready to be inserted or written over an existing one
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewRecipe {
    pub user_id: String,
    pub title: String,
    pub ingredients: Vec<ParsedIngredient>,
    pub tags: Vec<String>,
    pub details: RecipeDetails,
}

/// A stored recipe
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    pub id: i64,
    pub user_id: String,
    pub title: String,
    pub ingredients: Vec<ParsedIngredient>,
    pub tags: Vec<String>,
    #[serde(flatten)]
    pub details: RecipeDetails,
    pub date_created: DateTime<Utc>,
    pub date_last_edited: Option<DateTime<Utc>>,
}

/// One page of search results
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecipePage {
    /// Total number of matching recipes, not just this page
    pub count: i64,
    pub recipes: Vec<Recipe>,
}

impl RecipePage {
    pub fn empty() -> Self {
        Self {
            count: 0,
            recipes: Vec::new(),
        }
    }
}

/// Check that the caller is authenticated
pub fn require_user(user_id: Option<&str>) -> Result<&str, RecipeError> {
    match user_id.map(str::trim) {
        Some(id) if !id.is_empty() => Ok(id),
        _ => Err(RecipeError::Unauthorized),
    }
}

/// Validates a recipe title, returning it trimmed
pub fn validate_title(title: &str) -> Result<String, RecipeError> {
    let trimmed = title.trim();

    if trimmed.is_empty() {
        return Err(RecipeError::MissingField("title"));
    }

    if trimmed.chars().count() > MAX_TITLE_LENGTH {
        return Err(RecipeError::InvalidField {
            field: "title",
            reason: format!("longer than {MAX_TITLE_LENGTH} characters"),
        });
    }

    Ok(trimmed.to_string())
}

/// Split raw comma-separated tags, trimming each and dropping empty ones
pub fn split_tags(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect()
}

/// Words of a search string; a recipe must match all of them
pub fn search_terms(raw: &str) -> Vec<String> {
    raw.split_whitespace().map(str::to_string).collect()
}

/// Search words joined for the full-text query
///
/// A search without any word is rejected rather than listing everything.
pub fn search_query(raw: &str) -> Result<String, RecipeError> {
    let terms = search_terms(raw);
    if terms.is_empty() {
        return Err(RecipeError::MissingField("search string"));
    }
    Ok(terms.join(" "))
}

/// Turn a submitted recipe into a record ready for storage
///
/// Fails without building anything when the user is missing, the title or
/// ingredient text is blank, or an ingredient line cannot be parsed.
pub fn process_recipe(user_id: Option<&str>, input: &RecipeInput) -> Result<NewRecipe, RecipeError> {
    let user_id = require_user(user_id)?;
    let title = validate_title(&input.title)?;

    if input.ingredients.trim().is_empty() {
        return Err(RecipeError::MissingField("ingredients"));
    }

    let ingredients = parse_ingredients(&input.ingredients)?;
    let tags = input.tags.as_deref().map(split_tags).unwrap_or_default();

    debug!(tags = tags.len(), "Split recipe tags");
    info!(
        user_id,
        title = %title,
        ingredients = ingredients.len(),
        "Processed recipe"
    );

    Ok(NewRecipe {
        user_id: user_id.to_string(),
        title,
        ingredients,
        tags,
        details: input.details.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingredient_model::Unit;

    fn input(ingredients: &str, tags: Option<&str>) -> RecipeInput {
        RecipeInput {
            title: "beef pie".to_string(),
            ingredients: ingredients.to_string(),
            tags: tags.map(str::to_string),
            ..Default::default()
        }
    }

    #[test]
    fn test_split_tags() {
        assert_eq!(
            split_tags("dinner, tasty,good, with space "),
            vec!["dinner", "tasty", "good", "with space"]
        );
        assert!(split_tags(" , ,").is_empty());
    }

    #[test]
    fn test_title_validation() {
        assert_eq!(validate_title("  Mom's Lasagna  ").unwrap(), "Mom's Lasagna");
        assert!(matches!(
            validate_title("   "),
            Err(RecipeError::MissingField("title"))
        ));
        assert!(matches!(
            validate_title(&"a".repeat(256)),
            Err(RecipeError::InvalidField { field: "title", .. })
        ));
        assert!(validate_title(&"é".repeat(255)).is_ok());
    }

    #[test]
    fn test_require_user() {
        assert_eq!(require_user(Some("user1")).unwrap(), "user1");
        assert!(matches!(require_user(None), Err(RecipeError::Unauthorized)));
        assert!(matches!(require_user(Some("  ")), Err(RecipeError::Unauthorized)));
    }

    #[test]
    fn test_process_recipe_with_tags() {
        let recipe = process_recipe(
            Some("user1"),
            &input("1 onion\n500g minced beef", Some("dinner, tasty,good, with space ")),
        )
        .unwrap();

        assert_eq!(recipe.user_id, "user1");
        assert_eq!(recipe.title, "beef pie");
        assert_eq!(
            recipe.ingredients,
            vec![
                ParsedIngredient::new("onion").with_quantity(1.0),
                ParsedIngredient::new("minced beef")
                    .with_quantity(500.0)
                    .with_unit(Unit::Grams),
            ]
        );
        assert_eq!(recipe.tags, vec!["dinner", "tasty", "good", "with space"]);
    }

    #[test]
    fn test_process_recipe_without_tags() {
        let recipe = process_recipe(Some("user1"), &input("1 onion", None)).unwrap();
        assert!(recipe.tags.is_empty());
    }

    #[test]
    fn test_process_recipe_rejects_missing_user() {
        let result = process_recipe(None, &input("1 onion", None));
        assert!(matches!(result, Err(RecipeError::Unauthorized)));
    }

    #[test]
    fn test_process_recipe_rejects_blank_ingredients() {
        let result = process_recipe(Some("user1"), &input(" \n ", None));
        assert!(matches!(result, Err(RecipeError::MissingField("ingredients"))));
    }

    #[test]
    fn test_process_recipe_propagates_bad_line() {
        let result = process_recipe(Some("user1"), &input("10 grams butter\nhalf gram pepper", None));
        match result {
            Err(RecipeError::Parse(err)) => assert_eq!(err.line(), "half gram pepper"),
            other => panic!("Expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_input_deserializes_camel_case() {
        let json = r#"{
            "title": "Pancakes",
            "ingredients": "2 cups flour",
            "tags": "breakfast",
            "wantToTry": true,
            "prepTime": "10 min",
            "servings": 4,
            "macros": { "calories": 350 }
        }"#;
        let input: RecipeInput = serde_json::from_str(json).unwrap();
        assert!(input.details.want_to_try);
        assert_eq!(input.details.prep_time.as_deref(), Some("10 min"));
        assert_eq!(input.details.servings, Some(4));
        assert_eq!(input.details.macros.unwrap().calories, Some(350.0));
    }

    #[test]
    fn test_search_terms() {
        assert_eq!(search_terms("  ice   cream "), vec!["ice", "cream"]);
        assert!(search_terms("").is_empty());
    }

    #[test]
    fn test_blank_search_is_rejected() {
        assert_eq!(search_query(" ice  cream ").unwrap(), "ice cream");
        assert!(matches!(
            search_query("   "),
            Err(RecipeError::MissingField("search string"))
        ));
    }
}
