//! # Measurement Patterns Module
//!
//! This module contains the ordered unit rule table used to recognize the
//! unit of an ingredient line.
//!
//! Rules are tried top to bottom and the first rule matching anywhere in the
//! line wins. Longer spellings come before the short abbreviations they could
//! be confused with, and single letters ("t", "T", "c", "l") only count when
//! a quantity character sits right in front of them.

use crate::ingredient_model::Unit;
use crate::measurement_types::{UnitMatch, UnitRule};
use lazy_static::lazy_static;
use log::trace;

/// A digit or vulgar fraction glyph directly before an abbreviated unit
const QTY: &str = r"[0-9¼½¾⅓⅔⅛]";

// (unit, match pattern, extract pattern) in lookup order
fn rule_specs() -> Vec<(Unit, String, Option<&'static str>)> {
    let anchored = |token: &str| format!(r"{QTY}\s?{token}");
    vec![
        (Unit::Cups, r"cups?\b".to_string(), None),
        (Unit::Cups, anchored(r"[cC]s?\.?\s"), Some(r"[cC]s?\.?\s")),
        (Unit::Teaspoons, r"tsps?\b\.?".to_string(), None),
        (Unit::Teaspoons, r"teaspoons?\b".to_string(), None),
        (Unit::Teaspoons, anchored(r"ts?\s"), Some(r"ts?\s")),
        (Unit::Tablespoons, r"[Tt]bsps?\b\.?".to_string(), None),
        (Unit::Tablespoons, anchored(r"TB?s?\.?\s"), Some(r"TB?s?\.?\s")),
        (Unit::Tablespoons, r"\b[Tt]bl?s?\.?\s".to_string(), None),
        (Unit::Tablespoons, r"tablespoons?\b".to_string(), None),
        (Unit::Kilograms, anchored(r"[Kk]gs?\.?\s"), Some(r"[Kk]gs?\.?\s")),
        (Unit::Kilograms, r"kilograms?\b".to_string(), None),
        (Unit::Kilograms, r"kilos?\b".to_string(), None),
        (Unit::Grams, anchored(r"g(?:rs?|s)?\.?\s"), Some(r"g(?:rs?|s)?\.?\s")),
        (Unit::Grams, r"grams?\b".to_string(), None),
        (Unit::Milliliters, anchored(r"m[Ll]s?\.?\s"), Some(r"m[Ll]s?\.?\s")),
        (Unit::Milliliters, r"millilit(?:er|re)s?\b".to_string(), None),
        (Unit::Milliliters, anchored(r"mils?\.?\s"), Some(r"mils?\.?\s")),
        (Unit::Ounces, anchored(r"ozs?\.?\s"), Some(r"ozs?\.?\s")),
        (Unit::Ounces, r"ounces?\b".to_string(), None),
        (Unit::Pounds, anchored(r"lbs?\.?\s"), Some(r"lbs?\.?\s")),
        (Unit::Pounds, r"pounds?\b".to_string(), None),
        (Unit::Liters, anchored(r"[Ll]s?\.?\s"), Some(r"[Ll]s?\.?\s")),
        (Unit::Liters, r"lit(?:er|re)s?\b".to_string(), None),
    ]
}

fn build_rules() -> Vec<UnitRule> {
    rule_specs()
        .into_iter()
        .map(|(unit, pattern, extract)| {
            let rule = match extract {
                Some(extract) => UnitRule::with_extract(unit, &pattern, extract),
                None => UnitRule::new(unit, &pattern),
            };
            rule.expect("Unit rule patterns should be valid")
        })
        .collect()
}

// Lazy static rule table to avoid recompilation
lazy_static! {
    pub static ref UNIT_RULES: Vec<UnitRule> = build_rules();
}

/// Find the unit of an ingredient line using the first matching rule
///
/// # Examples
///
/// ```rust
/// use recipe_box::ingredient_model::Unit;
/// use recipe_box::measurement_patterns::find_unit;
///
/// let line = "1 3/4 cups flour";
/// let found = find_unit(line).unwrap();
/// assert_eq!(found.unit, Unit::Cups);
/// assert_eq!(line[..found.start].trim(), "1 3/4");
/// assert_eq!(line[found.end..].trim(), "flour");
///
/// assert!(find_unit("2 sprigs of thyme").is_none());
/// ```
pub fn find_unit(line: &str) -> Option<UnitMatch> {
    let found = UNIT_RULES
        .iter()
        .enumerate()
        .find_map(|(index, rule)| rule.apply(line, index));

    if let Some(found) = &found {
        trace!(
            "Line '{}' matched unit rule #{} ({})",
            line,
            found.rule_index,
            found.unit
        );
    }
    found
}
