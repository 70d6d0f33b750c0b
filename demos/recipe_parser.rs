//! # Recipe Parser Example
//!
//! This example parses a grouped ingredient list, prints each record with
//! its display quantity, scales the recipe into a shopping list and shows
//! how a bad line is reported.

use recipe_box::ingredient_parser::parse_ingredients;
use recipe_box::quantity::number_to_fraction;
use recipe_box::shopping_list::scale_recipe_into_items;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("🍳 Ingredient Parser Example");
    println!("============================\n");

    // Example 1: Grouped ingredient list
    println!("📖 Example 1: Lemon Tart");
    println!("------------------------");

    let tart = r#"
    # crust
    1 1/2 cups flour
    ½ cup butter
    2 T sugar
    pinch of salt

    # filling
    3 eggs
    150g caster sugar
    120 ml lemon juice
    "#;

    let ingredients = parse_ingredients(tart)?;
    for (i, ingredient) in ingredients.iter().enumerate() {
        println!(
            "  {}. {} (group: {})",
            i + 1,
            ingredient,
            ingredient.group.as_deref().unwrap_or("-")
        );
    }

    println!("\n");

    // Example 2: Scaling into a shopping list
    println!("🛒 Example 2: Tart for 12 instead of 8");
    println!("--------------------------------------");

    let items = scale_recipe_into_items(&[], &ingredients, 1, Some(8), Some(12));
    for item in &items {
        let quantity = item
            .quantity
            .map(number_to_fraction)
            .unwrap_or_default();
        let unit = item.unit.map(|u| u.code()).unwrap_or("");
        println!("  [{}] {} {} {}", item.id, quantity, unit, item.name);
    }

    println!("\n");

    // Example 3: Lines that cannot be parsed
    println!("⚠️  Example 3: Rejected Lines");
    println!("-----------------------------");

    for text in ["half gram pepper", "2-3 tbsp olive oil", "2 cups"] {
        match parse_ingredients(text) {
            Ok(parsed) => println!("  {:?} → {:?}", text, parsed),
            Err(err) => println!("  {:?} → {}", text, err),
        }
    }

    Ok(())
}
