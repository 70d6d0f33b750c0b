//! # Ingredient Parser
//!
//! This module turns a free-form, multi-line ingredient list (as typed into a
//! textarea) into structured [`ParsedIngredient`] records.
//!
//! ## Features
//!
//! - One ingredient per line, blank lines ignored
//! - `# label` header lines tag every following ingredient with `label`
//! - Units recognized through the ordered rule table in
//!   [`measurement_patterns`](crate::measurement_patterns)
//! - Quantities normalized by [`quantity`](crate::quantity): decimals,
//!   fractions, mixed numbers and vulgar fraction glyphs
//!
//! ## Failure policy
//!
//! A line with a recognized unit must carry a valid quantity; if it does not,
//! the whole call fails with [`ParseError::UnparsableIngredientLine`]. A line
//! without a unit whose first word is not a number is kept as a name-only
//! record instead.
//!
//! ## Usage
//!
//! ```rust
//! use recipe_box::ingredient_parser::parse_ingredients;
//!
//! let text = "2 cups flour\n# glaze\n1 tbsp honey\na pinch of salt";
//! let parsed = parse_ingredients(text)?;
//!
//! assert_eq!(parsed.len(), 3);
//! assert_eq!(parsed[1].group.as_deref(), Some("glaze"));
//! assert_eq!(parsed[2].quantity, None);
//! # Ok::<(), recipe_box::errors::ParseError>(())
//! ```

use crate::errors::ParseError;
use crate::ingredient_model::ParsedIngredient;
use crate::measurement_patterns::find_unit;
use crate::quantity::string_to_number;
use log::{debug, info, trace, warn};

/// What a single input line contributes to the parse
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind<'a> {
    /// Blank or whitespace-only line
    Empty,
    /// Section header; carries the label after the first `#`, trimmed
    GroupHeader(&'a str),
    /// Ingredient line, trimmed
    Ingredient(&'a str),
}

/// Classify one raw input line
pub fn classify_line(line: &str) -> LineKind<'_> {
    let line = line.trim();
    if line.is_empty() {
        return LineKind::Empty;
    }
    match line.split_once('#') {
        Some((_, label)) => LineKind::GroupHeader(label.trim()),
        None => LineKind::Ingredient(line),
    }
}

/// Parse a full ingredient list
///
/// Lines are separated by `\n` or `\r\n`. Records come out in source order,
/// without blank or header lines. The active group label is local to this
/// call and only ever replaced by a later header. A header with nothing
/// after the `#` does not reset the current group.
///
/// # Errors
///
/// Returns [`ParseError::UnparsableIngredientLine`] for the first line that
/// has a unit but no readable quantity or name; nothing is returned for the
/// lines parsed before it.
pub fn parse_ingredients(text: &str) -> Result<Vec<ParsedIngredient>, ParseError> {
    let mut ingredients = Vec::new();
    let mut group: Option<&str> = None;

    debug!("Parsing ingredient text with {} lines", text.lines().count());

    for raw_line in text.lines() {
        match classify_line(raw_line) {
            LineKind::Empty => continue,
            LineKind::GroupHeader("") => {
                trace!("Ignoring header line without a label");
            }
            LineKind::GroupHeader(label) => {
                trace!("Entering ingredient group '{}'", label);
                group = Some(label);
            }
            LineKind::Ingredient(line) => {
                let ingredient = parse_ingredient_line(line)?.with_group(group);
                ingredients.push(ingredient);
            }
        }
    }

    info!("Parsed {} ingredients", ingredients.len());
    Ok(ingredients)
}

/// Parse a single ingredient line, without group information
pub fn parse_ingredient_line(line: &str) -> Result<ParsedIngredient, ParseError> {
    let line = line.trim();

    if let Some(found) = find_unit(line) {
        let quantity_text = line[..found.start].trim();
        let name = line[found.end..].trim();

        let quantity = string_to_number(quantity_text)
            .map_err(|err| unparsable(line, err.to_string()))?;
        if name.is_empty() {
            return Err(unparsable(line, "no ingredient name after the unit".to_string()));
        }

        trace!(
            "Line '{}' -> quantity={}, unit={}, name='{}'",
            line,
            quantity,
            found.unit,
            name
        );
        return Ok(ParsedIngredient::new(name)
            .with_quantity(quantity)
            .with_unit(found.unit));
    }

    // No unit: the line is "<quantity> <name>" or just a name
    if let Some((first, rest)) = line.split_once(' ') {
        let rest = rest.trim();
        match string_to_number(first) {
            Ok(quantity) if !rest.is_empty() => {
                trace!("Line '{}' -> quantity={}, name='{}'", line, quantity, rest);
                return Ok(ParsedIngredient::new(rest).with_quantity(quantity));
            }
            Ok(_) => {}
            Err(err) => warn!("Keeping '{}' as a name-only ingredient: {}", line, err),
        }
    }

    Ok(ParsedIngredient::new(line))
}

fn unparsable(line: &str, reason: String) -> ParseError {
    ParseError::UnparsableIngredientLine {
        line: line.to_string(),
        reason,
    }
}
