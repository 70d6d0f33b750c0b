//! # Shopping Lists
//!
//! Shopping list records and the item bookkeeping behind them: copying a
//! recipe's ingredients into a list (scaled to the requested servings),
//! removing a recipe's items again, and building the list view with links
//! to the recipes it was filled from.

use crate::errors::RecipeError;
use crate::ingredient_model::{ParsedIngredient, Unit};
use crate::recipe::Recipe;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::debug;

/// Base path of the list resources
pub const LISTS_BASE_URL: &str = "/api/v1/lists/";

/// One line of a shopping list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListItem {
    /// Identifier unique within its list
    pub id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<Unit>,
    pub name: String,
    /// Recipe this item was copied from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipe_id: Option<i64>,
    /// Servings the quantity was scaled to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub servings: Option<i32>,
}

/// A stored shopping list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShoppingList {
    pub id: i64,
    pub user_id: String,
    pub title: String,
    pub date_created: DateTime<Utc>,
    pub date_last_edited: Option<DateTime<Utc>>,
    pub items: Vec<ListItem>,
}

/// Short description of a recipe referenced by a list
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecipeSummary {
    pub id: i64,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub servings: Option<i32>,
    pub href: String,
}

/// Link to a list's recipes, with their summaries when loaded
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipesLink {
    pub href: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recipes_data: Option<Vec<RecipeSummary>>,
}

/// A shopping list as returned to clients
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListView {
    pub id: i64,
    pub user_id: String,
    pub title: String,
    pub date_created: DateTime<Utc>,
    pub date_last_edited: Option<DateTime<Utc>>,
    pub items: Vec<ListItem>,
    pub recipes: RecipesLink,
}

impl ShoppingList {
    /// Path of the recipes referenced by this list
    pub fn recipes_href(&self) -> String {
        format!("{LISTS_BASE_URL}{}/recipes", self.id)
    }

    /// Build the client view, without recipe summaries
    pub fn to_view(&self) -> ListView {
        ListView {
            id: self.id,
            user_id: self.user_id.clone(),
            title: self.title.clone(),
            date_created: self.date_created,
            date_last_edited: self.date_last_edited,
            items: self.items.clone(),
            recipes: RecipesLink {
                href: self.recipes_href(),
                recipes_data: None,
            },
        }
    }

    /// Build the client view with summaries of the given recipes
    pub fn to_view_with_recipes(&self, recipes: &[Recipe]) -> ListView {
        let mut view = self.to_view();
        view.recipes.recipes_data = Some(recipe_summaries(self, recipes));
        view
    }
}

/// Validates a list title, returning it trimmed
pub fn validate_list_title(title: Option<&str>) -> Result<String, RecipeError> {
    match title.map(str::trim) {
        Some(title) if !title.is_empty() => Ok(title.to_string()),
        _ => Err(RecipeError::MissingField("list title")),
    }
}

/// Distinct recipe ids referenced by the items, with the servings of the
/// first item seen for each
pub fn referenced_recipes(items: &[ListItem]) -> Vec<(i64, Option<i32>)> {
    let mut seen = HashSet::new();
    items
        .iter()
        .filter_map(|item| item.recipe_id.map(|id| (id, item.servings)))
        .filter(|(id, _)| seen.insert(*id))
        .collect()
}

/// Summaries of the list's recipes, in the order they were added
///
/// Recipes that no longer exist are left out.
pub fn recipe_summaries(list: &ShoppingList, recipes: &[Recipe]) -> Vec<RecipeSummary> {
    let base = list.recipes_href();
    referenced_recipes(&list.items)
        .into_iter()
        .filter_map(|(recipe_id, servings)| {
            let recipe = recipes.iter().find(|recipe| recipe.id == recipe_id)?;
            Some(RecipeSummary {
                id: recipe.id,
                title: recipe.title.clone(),
                image: recipe.details.image.clone(),
                servings,
                href: format!("{base}/{}", recipe.id),
            })
        })
        .collect()
}

/// Append a recipe's ingredients to a list's items
///
/// When both serving counts are known and positive, every quantity is
/// scaled by `servings_to_add / recipe_servings` and rounded to two
/// decimals; otherwise quantities are copied unchanged.
pub fn scale_recipe_into_items(
    items: &[ListItem],
    ingredients: &[ParsedIngredient],
    recipe_id: i64,
    recipe_servings: Option<i32>,
    servings_to_add: Option<i32>,
) -> Vec<ListItem> {
    let scale = match (recipe_servings, servings_to_add) {
        (Some(from), Some(to)) if from > 0 && to > 0 => Some((f64::from(to) / f64::from(from), to)),
        _ => None,
    };

    let mut next_id = next_item_id(items);
    let mut new_items = items.to_vec();

    for ingredient in ingredients {
        let (quantity, servings) = match (ingredient.quantity, scale) {
            (Some(quantity), Some((factor, to))) => {
                (Some(round_to_hundredths(quantity * factor)), Some(to))
            }
            (quantity, _) => (quantity, None),
        };

        new_items.push(ListItem {
            id: next_id,
            quantity,
            unit: ingredient.unit,
            name: ingredient.name.clone(),
            recipe_id: Some(recipe_id),
            servings,
        });
        next_id += 1;
    }

    debug!(
        recipe_id,
        added = ingredients.len(),
        scaled = scale.is_some(),
        "Added recipe ingredients to list items"
    );
    new_items
}

/// Drop every item copied from the given recipe
pub fn remove_recipe_items(items: &[ListItem], recipe_id: i64) -> Vec<ListItem> {
    items
        .iter()
        .filter(|item| item.recipe_id != Some(recipe_id))
        .cloned()
        .collect()
}

/// Drop a single item by id
pub fn remove_item(items: &[ListItem], item_id: i64) -> Vec<ListItem> {
    items.iter().filter(|item| item.id != item_id).cloned().collect()
}

fn next_item_id(items: &[ListItem]) -> i64 {
    items.iter().map(|item| item.id).max().map_or(1, |id| id + 1)
}

fn round_to_hundredths(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
