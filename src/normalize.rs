//! Conversion of heterogeneous inputs into exact decimals, and back to text.
//!
//! Normalization never consults a column's scale: a literal with more
//! fractional digits than the column allows is preserved as written, and the
//! codec is the one that rejects it.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::decimal::Decimal;
use crate::error::{WireError, WireResult};
use crate::value::Value;

/// The input forms accepted for a decimal leaf.
#[derive(Debug, Clone, PartialEq)]
pub enum DecimalInput {
    /// Already exact; passes through unchanged.
    Exact(Decimal),
    /// Integer literal, zero fractional digits.
    Integer(i128),
    /// Decimal literal, `[+-]digits[.digits]`.
    Literal(String),
}

impl From<Decimal> for DecimalInput {
    fn from(v: Decimal) -> Self {
        DecimalInput::Exact(v)
    }
}

impl From<i64> for DecimalInput {
    fn from(v: i64) -> Self {
        DecimalInput::Integer(i128::from(v))
    }
}

impl From<u64> for DecimalInput {
    fn from(v: u64) -> Self {
        DecimalInput::Integer(i128::from(v))
    }
}

impl From<i128> for DecimalInput {
    fn from(v: i128) -> Self {
        DecimalInput::Integer(v)
    }
}

impl From<&str> for DecimalInput {
    fn from(v: &str) -> Self {
        DecimalInput::Literal(v.to_string())
    }
}

impl From<String> for DecimalInput {
    fn from(v: String) -> Self {
        DecimalInput::Literal(v)
    }
}

/// Produce the exact decimal an input denotes.
pub fn normalize(input: impl Into<DecimalInput>) -> WireResult<Decimal> {
    match input.into() {
        DecimalInput::Exact(d) => Ok(d),
        DecimalInput::Integer(i) => Ok(Decimal::from_integer(i)),
        DecimalInput::Literal(s) => s.parse(),
    }
}

/// Normalize a dynamic value sitting at a decimal leaf.
///
/// `expected` names the leaf type for error messages.
pub fn normalize_value(value: &Value, expected: impl fmt::Display) -> WireResult<Decimal> {
    match value {
        Value::Decimal(d) => Ok(d.clone()),
        Value::Int(i) => normalize(*i),
        Value::UInt(u) => normalize(*u),
        Value::String(s) => normalize(s.as_str()),
        Value::Null => Err(WireError::UnexpectedNull {
            expected: expected.to_string(),
        }),
        other => Err(WireError::TypeMismatch {
            expected: expected.to_string(),
            found: other.kind(),
        }),
    }
}

/// Textual form of a decoded decimal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderStyle {
    /// Every fractional digit the column scale carries (`123.4560000000`).
    #[default]
    Scaled,
    /// Trailing fractional zeros removed (`123.456`).
    Trimmed,
}

/// Render a decimal as text, digit by digit from its coefficient.
pub fn render(value: &Decimal, style: RenderStyle) -> String {
    match style {
        RenderStyle::Scaled => value.to_string(),
        RenderStyle::Trimmed => value.trimmed().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_passes_through() {
        let d: Decimal = "1.50".parse().unwrap();
        let out = normalize(d.clone()).unwrap();
        assert_eq!(out.scale(), 2);
        assert_eq!(out.to_string(), "1.50");
    }

    #[test]
    fn test_integer_literal_has_no_fraction() {
        let d = normalize(-42i64).unwrap();
        assert_eq!(d.scale(), 0);
        assert_eq!(d.to_string(), "-42");
        assert_eq!(normalize(u64::MAX).unwrap().to_string(), "18446744073709551615");
    }

    #[test]
    fn test_string_literal_keeps_all_digits() {
        let d = normalize("0.123456789012345678901234567890").unwrap();
        assert_eq!(d.scale(), 30);
    }

    #[test]
    fn test_malformed_string() {
        assert!(matches!(
            normalize("12.3abc"),
            Err(WireError::MalformedDecimalLiteral(s)) if s == "12.3abc"
        ));
    }

    #[test]
    fn test_normalize_value_rejects_other_kinds() {
        assert!(matches!(
            normalize_value(&Value::Null, "Decimal(9, 2)"),
            Err(WireError::UnexpectedNull { .. })
        ));
        assert!(matches!(
            normalize_value(&Value::Bool(true), "Decimal(9, 2)"),
            Err(WireError::TypeMismatch { found: "Bool", .. })
        ));
        assert_eq!(
            normalize_value(&Value::String("7.5".into()), "Decimal(9, 2)").unwrap(),
            "7.50".parse::<Decimal>().unwrap()
        );
    }

    #[test]
    fn test_render_styles() {
        let d: Decimal = "-345.6780000000".parse().unwrap();
        assert_eq!(render(&d, RenderStyle::Scaled), "-345.6780000000");
        assert_eq!(render(&d, RenderStyle::Trimmed), "-345.678");
    }
}
