//! Free-text measurement parsing for imported recipe ingredients.
//!
//! External recipes describe amounts as loose strings such as `"1 1/2 cup"`,
//! `"3/4 tsp"`, `"2.5 tbsp"` or `"pinch"`. This module splits such a string
//! into an optional numeric quantity and the remaining unit text.
//!
//! Forms are tried in a fixed order and the first match wins:
//! 1. mixed number: `<int> <int>/<int> <rest>`
//! 2. fraction: `<int>/<int> <rest>`
//! 3. decimal or integer: `<number> <rest>`
//! 4. anything else: no quantity, the whole trimmed text is the unit
//!
//! In every numeric form the unit may also follow the number directly
//! (`"200g"`, `"3/4tsp"`, `"1 1/2cup"`) as long as it does not start with a
//! digit, `.` or `/`. A zero denominator never matches, so such input falls
//! through to the next form.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

static MIXED_NUMBER: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"^(\d+)\s+(\d+)/(\d+)(?:\s+(.*)|([^\s\d./].*))?$").ok());

static FRACTION: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"^(\d+)/(\d+)(?:\s+(.*)|([^\s\d./].*))?$").ok());

static DECIMAL: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"^(\d+(?:\.\d+)?)(?:\s+(.*)|([^\s\d./].*))?$").ok());

/// Result of parsing a measurement string
#[derive(Debug, Clone, PartialEq)]
pub struct Measurement {
    pub quantity: Option<f64>,
    pub unit: String,
}

impl Measurement {
    fn new(quantity: Option<f64>, unit: &str) -> Self {
        Self {
            quantity,
            unit: unit.trim().to_string(),
        }
    }

    /// Quantity usable for a recipe line: present and strictly positive
    pub fn positive_quantity(&self) -> Option<f64> {
        self.quantity.filter(|q| q.is_finite() && *q > 0.0)
    }

    /// Unit text, or `None` when empty
    pub fn unit_text(&self) -> Option<&str> {
        if self.unit.is_empty() {
            None
        } else {
            Some(&self.unit)
        }
    }
}

/// Parse a free-text measurement such as `"1 1/2 cup"` into quantity and unit
pub fn parse_measure(text: &str) -> Measurement {
    let text = text.trim();
    if text.is_empty() {
        return Measurement::new(None, "");
    }

    parse_mixed_number(text)
        .or_else(|| parse_fraction(text))
        .or_else(|| parse_decimal(text))
        .unwrap_or_else(|| Measurement::new(None, text))
}

fn parse_mixed_number(text: &str) -> Option<Measurement> {
    let caps = MIXED_NUMBER.as_ref()?.captures(text)?;
    let whole: f64 = caps.get(1)?.as_str().parse().ok()?;
    let fraction = fraction_value(caps.get(2)?.as_str(), caps.get(3)?.as_str())?;

    Some(Measurement::new(Some(whole + fraction), rest(&caps, 4, 5)))
}

fn parse_fraction(text: &str) -> Option<Measurement> {
    let caps = FRACTION.as_ref()?.captures(text)?;
    let value = fraction_value(caps.get(1)?.as_str(), caps.get(2)?.as_str())?;

    Some(Measurement::new(Some(value), rest(&caps, 3, 4)))
}

fn parse_decimal(text: &str) -> Option<Measurement> {
    let caps = DECIMAL.as_ref()?.captures(text)?;
    let value: f64 = caps.get(1)?.as_str().parse().ok()?;

    Some(Measurement::new(Some(value), rest(&caps, 2, 3)))
}

fn fraction_value(numerator: &str, denominator: &str) -> Option<f64> {
    let numerator: u64 = numerator.parse().ok()?;
    let denominator: u64 = denominator.parse().ok()?;
    if denominator == 0 {
        return None;
    }
    Some(numerator as f64 / denominator as f64)
}

/// Unit text from either the spaced or the glued capture group
fn rest<'t>(caps: &Captures<'t>, spaced: usize, glued: usize) -> &'t str {
    caps.get(spaced)
        .or_else(|| caps.get(glued))
        .map(|m| m.as_str())
        .unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parsed(text: &str) -> (Option<f64>, String) {
        let m = parse_measure(text);
        (m.quantity, m.unit)
    }

    #[test]
    fn test_mixed_number() {
        assert_eq!(parsed("1 1/2 cup"), (Some(1.5), "cup".to_string()));
        assert_eq!(parsed("2 3/4 cups flour"), (Some(2.75), "cups flour".to_string()));
        assert_eq!(parsed("1 1/2"), (Some(1.5), String::new()));
    }

    #[test]
    fn test_fraction() {
        assert_eq!(parsed("3/4 tsp"), (Some(0.75), "tsp".to_string()));
        assert_eq!(parsed("1/2"), (Some(0.5), String::new()));
    }

    #[test]
    fn test_decimal_and_integer() {
        assert_eq!(parsed("2 cloves"), (Some(2.0), "cloves".to_string()));
        assert_eq!(parsed("2.5 tbsp"), (Some(2.5), "tbsp".to_string()));
        assert_eq!(parsed("200g"), (Some(200.0), "g".to_string()));
        assert_eq!(parsed("4"), (Some(4.0), String::new()));
    }

    #[test]
    fn test_unit_glued_to_number() {
        assert_eq!(parsed("1 1/2cup"), (Some(1.5), "cup".to_string()));
        assert_eq!(parsed("3/4tsp"), (Some(0.75), "tsp".to_string()));
        assert_eq!(parsed("2.5tbsp"), (Some(2.5), "tbsp".to_string()));
        assert_eq!(parsed("1/2/3"), (None, "1/2/3".to_string()));
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(parsed(""), (None, String::new()));
        assert_eq!(parsed("   "), (None, String::new()));
    }

    #[test]
    fn test_free_form_text() {
        assert_eq!(parsed("pinch"), (None, "pinch".to_string()));
        assert_eq!(parsed("  to taste "), (None, "to taste".to_string()));
        assert_eq!(parsed("a handful of 3"), (None, "a handful of 3".to_string()));
    }

    #[test]
    fn test_whitespace_is_trimmed() {
        assert_eq!(parsed("  1 1/2   cup  "), (Some(1.5), "cup".to_string()));
    }

    #[test]
    fn test_zero_denominator_falls_through() {
        // Not a fraction, and "3/0" is not a plain number either
        assert_eq!(parsed("3/0 tsp"), (None, "3/0 tsp".to_string()));
        // The mixed form fails, the leading integer still parses
        assert_eq!(parsed("2 1/0 cup"), (Some(2.0), "1/0 cup".to_string()));
    }

    #[test]
    fn test_positive_quantity() {
        assert_eq!(parse_measure("0 cup").positive_quantity(), None);
        assert_eq!(parse_measure("pinch").positive_quantity(), None);
        assert_eq!(parse_measure("3/4 tsp").positive_quantity(), Some(0.75));
    }

    #[test]
    fn test_unit_text() {
        assert_eq!(parse_measure("4").unit_text(), None);
        assert_eq!(parse_measure("4 eggs").unit_text(), Some("eggs"));
    }
}
