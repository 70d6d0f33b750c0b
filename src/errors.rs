//! # Error Types Module
//!
//! This module defines the error types used throughout the recipe backend.
//! Quantity errors are raised by the normalizer, line errors by the ingredient
//! parser, and recipe errors by the record and store layers.

use thiserror::Error;

/// A quantity region that cannot be interpreted as a number
#[derive(Error, Debug, Clone, PartialEq)]
pub enum QuantityError {
    /// Ranges such as "3-4" are rejected rather than averaged
    #[error("Quantity is a range, not accepted")]
    RangeNotAccepted,

    /// Text that is neither a vulgar fraction, a decimal nor a fraction
    #[error("Quantity {0} is not a valid number")]
    InvalidNumber(String),

    /// Fraction with a zero denominator
    #[error("Quantity {0} divides by zero")]
    DivisionByZero(String),

    /// Parsed to NaN or infinity
    #[error("Quantity {0} is not a finite number")]
    NotFinite(String),
}

/// Errors raised while turning ingredient text into records
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    /// A line with a recognized unit whose quantity or name could not be read
    #[error("Could not parse ingredient line \"{line}\": {reason}")]
    UnparsableIngredientLine { line: String, reason: String },
}

impl ParseError {
    /// The full original text of the failing line
    pub fn line(&self) -> &str {
        match self {
            ParseError::UnparsableIngredientLine { line, .. } => line,
        }
    }
}

/// Errors raised by recipe and shopping list operations
#[derive(Error, Debug)]
pub enum RecipeError {
    /// No authenticated user identifier was supplied
    #[error("Missing authenticated user")]
    Unauthorized,

    /// A required request field is absent or blank
    #[error("missing {0}")]
    MissingField(&'static str),

    /// A field failed validation
    #[error("invalid {field}: {reason}")]
    InvalidField { field: &'static str, reason: String },

    /// The ingredient text could not be parsed
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// The referenced record does not exist for this user
    #[error("{0} does not exist")]
    NotFound(&'static str),

    /// Storage failure
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}
