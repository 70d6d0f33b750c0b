//! # Measurement Types Module
//!
//! This module defines the types used for unit detection in ingredient lines.

use crate::ingredient_model::Unit;
use regex::Regex;

/// One entry of the ordered unit table
#[derive(Debug, Clone)]
pub struct UnitRule {
    /// Canonical unit recorded when this rule matches
    pub unit: Unit,
    /// Pattern that decides whether the rule applies to a line
    pub match_pattern: Regex,
    /// Pattern locating the unit token when `match_pattern` also consumes
    /// part of the quantity (e.g. the digit in front of a bare "t")
    pub extract_pattern: Option<Regex>,
}

/// Where a unit token sits in a line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnitMatch {
    /// The canonical unit of the rule that matched
    pub unit: Unit,
    /// Position of the matching rule in the unit table
    pub rule_index: usize,
    /// Byte offset where the unit token starts
    pub start: usize,
    /// Byte offset just past the unit token
    pub end: usize,
}

impl UnitRule {
    /// Build a rule whose match is also the unit token
    pub fn new(unit: Unit, pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            unit,
            match_pattern: Regex::new(pattern)?,
            extract_pattern: None,
        })
    }

    /// Build a rule that needs a separate pattern to find the unit token
    pub fn with_extract(unit: Unit, pattern: &str, extract: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            unit,
            match_pattern: Regex::new(pattern)?,
            extract_pattern: Some(Regex::new(extract)?),
        })
    }

    /// Apply this rule to a line, returning the unit token span on success
    ///
    /// With an extract pattern, the token is searched from the start of the
    /// match onwards so that earlier text in the line is never picked up.
    pub fn apply(&self, line: &str, rule_index: usize) -> Option<UnitMatch> {
        let found = self.match_pattern.find(line)?;
        let (start, end) = match &self.extract_pattern {
            Some(extract) => {
                let token = extract.find_at(line, found.start())?;
                (token.start(), token.end())
            }
            None => (found.start(), found.end()),
        };

        Some(UnitMatch {
            unit: self.unit,
            rule_index,
            start,
            end,
        })
    }
}
