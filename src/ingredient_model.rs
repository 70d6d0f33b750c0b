//! # Ingredient Data Model
//!
//! This module defines the structured records produced by the ingredient
//! parser and stored inside recipes.
//!
//! ## Core Concepts
//!
//! - **ParsedIngredient**: one ingredient line turned into `{quantity, unit, name, group}`
//! - **Unit**: one of the canonical unit codes stored regardless of input spelling
//!
//! ## Usage
//!
//! ```rust
//! use recipe_box::ingredient_model::{ParsedIngredient, Unit};
//!
//! let flour = ParsedIngredient::new("flour")
//!     .with_quantity(1.75)
//!     .with_unit(Unit::Cups);
//!
//! assert_eq!(flour.to_string(), "1 3/4 cup flour");
//! ```

use crate::quantity::display_quantity;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A single parsed ingredient line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedIngredient {
    /// Numeric amount, absent for free-text lines such as "a handful of almonds"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<f64>,

    /// Canonical unit, only present when a unit rule matched the line
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<Unit>,

    /// Residual text after quantity and unit removal, trimmed
    pub name: String,

    /// Label of the last `#` header seen above this line
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
}

/// Canonical measurement units
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Unit {
    /// Cups
    #[serde(rename = "cup")]
    Cups,
    /// Teaspoons
    #[serde(rename = "tsp")]
    Teaspoons,
    /// Tablespoons
    #[serde(rename = "tbsp")]
    Tablespoons,
    /// Kilograms
    #[serde(rename = "kg")]
    Kilograms,
    /// Grams
    #[serde(rename = "g")]
    Grams,
    /// Milliliters
    #[serde(rename = "ml")]
    Milliliters,
    /// Ounces
    #[serde(rename = "oz")]
    Ounces,
    /// Pounds
    #[serde(rename = "lb")]
    Pounds,
    /// Liters
    #[serde(rename = "l")]
    Liters,
}

impl ParsedIngredient {
    /// Create an ingredient with just a name
    pub fn new(name: &str) -> Self {
        Self {
            quantity: None,
            unit: None,
            name: name.to_string(),
            group: None,
        }
    }

    pub fn with_quantity(mut self, quantity: f64) -> Self {
        self.quantity = Some(quantity);
        self
    }

    pub fn with_unit(mut self, unit: Unit) -> Self {
        self.unit = Some(unit);
        self
    }

    /// Tag this ingredient with a group label, if any
    pub fn with_group(mut self, group: Option<&str>) -> Self {
        self.group = group.map(str::to_string);
        self
    }

    /// Human-readable quantity, with fractions for cup and spoon measures
    pub fn display_quantity(&self) -> Option<String> {
        self.quantity.map(|q| display_quantity(self.unit, q))
    }
}

impl Unit {
    /// All canonical units, in unit-table order
    pub const ALL: [Unit; 9] = [
        Unit::Cups,
        Unit::Teaspoons,
        Unit::Tablespoons,
        Unit::Kilograms,
        Unit::Grams,
        Unit::Milliliters,
        Unit::Ounces,
        Unit::Pounds,
        Unit::Liters,
    ];

    /// The short code stored for this unit
    pub fn code(&self) -> &'static str {
        match self {
            Unit::Cups => "cup",
            Unit::Teaspoons => "tsp",
            Unit::Tablespoons => "tbsp",
            Unit::Kilograms => "kg",
            Unit::Grams => "g",
            Unit::Milliliters => "ml",
            Unit::Ounces => "oz",
            Unit::Pounds => "lb",
            Unit::Liters => "l",
        }
    }

    /// Cup and spoon measures, conventionally written as fractions
    pub fn is_spoon_or_cup(&self) -> bool {
        matches!(self, Unit::Cups | Unit::Tablespoons | Unit::Teaspoons)
    }
}

impl FromStr for Unit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Unit::ALL
            .iter()
            .find(|unit| unit.code() == s)
            .copied()
            .ok_or_else(|| format!("unknown unit code: {s}"))
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl fmt::Display for ParsedIngredient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(quantity) = self.display_quantity() {
            write!(f, "{} ", quantity)?;
        }
        if let Some(unit) = &self.unit {
            write!(f, "{} ", unit)?;
        }
        write!(f, "{}", self.name)?;

        if let Some(group) = &self.group {
            write!(f, " [{}]", group)?;
        }

        Ok(())
    }
}
