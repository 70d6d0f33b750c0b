//! # Quantity Normalizer
//!
//! Converts the textual quantity of an ingredient line into a number, and
//! renders stored numbers back as kitchen fractions for display.
//!
//! ## Accepted formats
//!
//! - Integers and decimals: "100", "20.5"
//! - Simple fractions: "1/2", "3/4"
//! - Mixed numbers: "1 3/4"
//! - Vulgar fraction glyphs, alone or after a whole part: "½", "2½", "1 ¼"
//!
//! Ranges ("3-4", "3–4") are rejected outright.
//!
//! ## Usage
//!
//! ```rust
//! use recipe_box::quantity::{number_to_fraction, string_to_number};
//!
//! let qty = string_to_number("1 3/4")?;
//! assert_eq!(qty, 1.75);
//! assert_eq!(number_to_fraction(qty), "1 3/4");
//! # Ok::<(), recipe_box::errors::QuantityError>(())
//! ```

use crate::errors::QuantityError;
use crate::ingredient_model::Unit;
use lazy_static::lazy_static;
use log::{debug, trace};
use regex::Regex;

/// Vulgar fraction glyphs in lookup order, with their fixed decimal values
const VULGAR_FRACTIONS: [(char, f64); 6] = [
    ('½', 0.5),
    ('¼', 0.25),
    ('¾', 0.75),
    ('⅔', 0.666),
    ('⅓', 0.333),
    ('⅛', 0.125),
];

/// Characters that mark a quantity range
const RANGE_SEPARATORS: [char; 2] = ['-', '–'];

/// Compiled regex patterns for general quantities
struct QuantityPatterns {
    /// Matches exact amounts: "2", "1.5", ".25"
    exact: Regex,
    /// Matches fractions and mixed numbers: "1/2", "2 1/4"
    fraction: Regex,
}

impl QuantityPatterns {
    fn new() -> Self {
        Self {
            exact: Regex::new(r"^(?:\d+(?:\.\d*)?|\.\d+)$")
                .expect("Exact quantity pattern should be valid"),
            fraction: Regex::new(r"^(?:(\d+)\s+)?(\d+)\s*/\s*(\d+)$")
                .expect("Fraction quantity pattern should be valid"),
        }
    }
}

lazy_static! {
    static ref QUANTITY_PATTERNS: QuantityPatterns = QuantityPatterns::new();
}

/// Parse a textual quantity into a number
///
/// Glyph quantities keep the glyph's fixed decimal (⅓ is 0.333, ⅔ is 0.666);
/// every other quantity is rounded to 3 decimal places, so "2/3" is 0.667.
///
/// # Errors
///
/// Returns [`QuantityError::RangeNotAccepted`] for hyphenated ranges and
/// another [`QuantityError`] variant for any text that is not a number.
pub fn string_to_number(text: &str) -> Result<f64, QuantityError> {
    let value = if let Some((index, glyph_value)) = find_vulgar_fraction(text) {
        let whole_text = text[..index].trim();
        let whole = if whole_text.is_empty() {
            0
        } else {
            whole_text
                .parse::<u32>()
                .map_err(|_| QuantityError::InvalidNumber(text.to_string()))?
        };
        round_to_thousandths(f64::from(whole) + glyph_value)
    } else if text.contains(RANGE_SEPARATORS) {
        debug!("Rejecting quantity range '{}'", text);
        return Err(QuantityError::RangeNotAccepted);
    } else {
        round_to_thousandths(parse_fraction(text)?)
    };

    if !value.is_finite() {
        return Err(QuantityError::NotFinite(text.to_string()));
    }

    trace!("Normalized quantity '{}' -> {}", text, value);
    Ok(value)
}

/// Locate the first vulgar fraction glyph, checked in table order
fn find_vulgar_fraction(text: &str) -> Option<(usize, f64)> {
    VULGAR_FRACTIONS
        .iter()
        .find_map(|&(glyph, value)| text.find(glyph).map(|index| (index, value)))
}

/// Parse integers, decimals, fractions and mixed numbers
fn parse_fraction(text: &str) -> Result<f64, QuantityError> {
    let text = text.trim();
    let invalid = || QuantityError::InvalidNumber(text.to_string());

    if QUANTITY_PATTERNS.exact.is_match(text) {
        return text.parse::<f64>().map_err(|_| invalid());
    }

    let captures = QUANTITY_PATTERNS.fraction.captures(text).ok_or_else(invalid)?;
    let whole: f64 = match captures.get(1) {
        Some(m) => m.as_str().parse().map_err(|_| invalid())?,
        None => 0.0,
    };
    let numerator: f64 = captures[2].parse().map_err(|_| invalid())?;
    let denominator: f64 = captures[3].parse().map_err(|_| invalid())?;

    if denominator == 0.0 {
        return Err(QuantityError::DivisionByZero(text.to_string()));
    }

    Ok(whole + numerator / denominator)
}

fn round_to_thousandths(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

/// Render a number as a reduced kitchen fraction
///
/// Whole numbers render as plain integers, values above one as mixed
/// numbers ("5 1/2"). Three-decimal thirds render back as thirds.
///
/// # Examples
///
/// ```rust
/// use recipe_box::quantity::number_to_fraction;
///
/// assert_eq!(number_to_fraction(10.0), "10");
/// assert_eq!(number_to_fraction(0.25), "1/4");
/// assert_eq!(number_to_fraction(0.333), "1/3");
/// assert_eq!(number_to_fraction(5.5), "5 1/2");
/// ```
pub fn number_to_fraction(value: f64) -> String {
    if value == 0.0 {
        return "0".to_string();
    }
    if !value.is_finite() || value.fract() == 0.0 {
        return value.to_string();
    }

    let sign = if value < 0.0 { "-" } else { "" };
    let magnitude = value.abs().to_string();

    match decimal_to_fraction(&magnitude) {
        Some((0, numerator, denominator)) => {
            format!("{sign}{}", third_or_fraction(numerator, denominator))
        }
        Some((base, numerator, denominator)) => {
            format!("{sign}{base} {}", third_or_fraction(numerator, denominator))
        }
        None => value.to_string(),
    }
}

/// Split a decimal string into `(whole, numerator, denominator)`, reduced
fn decimal_to_fraction(decimal: &str) -> Option<(u128, u128, u128)> {
    let (int_part, frac_part) = decimal.split_once('.')?;
    let denominator = 10u128.checked_pow(u32::try_from(frac_part.len()).ok()?)?;
    let numerator: u128 = format!("{int_part}{frac_part}").parse().ok()?;

    let divisor = gcd(numerator, denominator);
    let (numerator, denominator) = (numerator / divisor, denominator / divisor);

    Some((
        numerator / denominator,
        numerator % denominator,
        denominator,
    ))
}

fn gcd(a: u128, b: u128) -> u128 {
    if b == 0 {
        a
    } else {
        gcd(b, a % b)
    }
}

/// Three-decimal thirds come back as `333/1000`, `333/500` or `667/1000`
fn third_or_fraction(numerator: u128, denominator: u128) -> String {
    match (numerator, denominator) {
        (333, 1000) => "1/3".to_string(),
        (333, 500) | (667, 1000) => "2/3".to_string(),
        _ => format!("{numerator}/{denominator}"),
    }
}

/// Render stored quantity text, passing non-numeric text through unchanged
pub fn text_to_fraction(raw: &str) -> String {
    match raw.trim().parse::<f64>() {
        Ok(value) if value.is_finite() => number_to_fraction(value),
        _ => raw.to_string(),
    }
}

/// Format a quantity for display according to its unit
///
/// Cup and spoon measures are written as fractions; weights, metric
/// volumes and unit-less counts keep their decimal form.
pub fn display_quantity(unit: Option<Unit>, quantity: f64) -> String {
    match unit {
        Some(unit) if unit.is_spoon_or_cup() => number_to_fraction(quantity),
        _ => quantity.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_numbers() {
        assert_eq!(string_to_number("100").unwrap(), 100.0);
        assert_eq!(string_to_number("5.5").unwrap(), 5.5);
        assert_eq!(string_to_number("0.23").unwrap(), 0.23);
        assert_eq!(string_to_number(".5").unwrap(), 0.5);
    }

    #[test]
    fn test_ascii_fractions_round_to_thousandths() {
        assert_eq!(string_to_number("1/3").unwrap(), 0.333);
        assert_eq!(string_to_number("2/3").unwrap(), 0.667);
        assert_eq!(string_to_number("10 2/3").unwrap(), 10.667);
    }

    #[test]
    fn test_glyph_thirds_keep_fixed_decimals() {
        assert_eq!(string_to_number("⅓").unwrap(), 0.333);
        assert_eq!(string_to_number("⅔").unwrap(), 0.666);
        assert_eq!(string_to_number("4⅔").unwrap(), 4.666);
    }

    #[test]
    fn test_glyph_with_invalid_whole_part() {
        assert!(matches!(
            string_to_number("few½"),
            Err(QuantityError::InvalidNumber(_))
        ));
    }

    #[test]
    fn test_zero_denominator() {
        assert!(matches!(
            string_to_number("1/0"),
            Err(QuantityError::DivisionByZero(_))
        ));
    }

    #[test]
    fn test_empty_quantity_is_invalid() {
        assert!(matches!(
            string_to_number(""),
            Err(QuantityError::InvalidNumber(_))
        ));
        assert!(string_to_number("   ").is_err());
    }

    #[test]
    fn test_decimal_to_fraction_reduces() {
        assert_eq!(decimal_to_fraction("0.5"), Some((0, 1, 2)));
        assert_eq!(decimal_to_fraction("12.25"), Some((12, 1, 4)));
        assert_eq!(decimal_to_fraction("0.666"), Some((0, 333, 500)));
        assert_eq!(decimal_to_fraction("7"), None);
    }

    #[test]
    fn test_negative_fraction() {
        assert_eq!(number_to_fraction(-0.5), "-1/2");
        assert_eq!(number_to_fraction(-2.25), "-2 1/4");
    }

    #[test]
    fn test_negative_zero_has_no_sign() {
        assert_eq!(number_to_fraction(-0.0), "0");
        assert_eq!(number_to_fraction(0.0), "0");
    }

    #[test]
    fn test_overflowing_quantity_is_not_finite() {
        let huge = "9".repeat(400);
        assert_eq!(
            string_to_number(&huge),
            Err(QuantityError::NotFinite(huge.clone()))
        );
        // a tiny fraction still rounds to a finite zero
        assert_eq!(string_to_number(&format!("1/{huge}")), Ok(0.0));
    }

    #[test]
    fn test_non_finite_passes_through() {
        assert_eq!(number_to_fraction(f64::NAN), "NaN");
        assert_eq!(number_to_fraction(f64::INFINITY), "inf");
    }
}
