//! Tagged attribute values.
//!
//! # Responsibility
//! - Represent dynamic attribute payloads as a closed set of scalar kinds.
//! - Own the scalar coercion rule shared by all console commands.
//! - Render values the way the console prints them inside attribute dicts.
//!
//! # Invariants
//! - Bare text coerces to `Int`, then `Float`, then falls back to `Str`.
//! - Coercion never fails and never produces a non-finite float.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Ordered attribute bag; insertion order is the print and save order.
pub type AttrMap = IndexMap<String, AttrValue>;

/// One attribute value.
///
/// Serialized untagged so the storage file holds plain JSON scalars.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttrValue {
    Int(i64),
    Float(f64),
    Str(String),
}

impl AttrValue {
    /// Coerces unquoted input text: integer, then float, then string.
    pub fn coerce(raw: &str) -> Self {
        if let Ok(value) = raw.parse::<i64>() {
            return Self::Int(value);
        }
        match raw.parse::<f64>() {
            Ok(value) if value.is_finite() => Self::Float(value),
            _ => Self::Str(raw.to_string()),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(value) => Some(*value),
            Self::Int(value) => Some(*value as f64),
            Self::Str(_) => None,
        }
    }

    /// Returns the literal form used inside printed attribute dicts.
    ///
    /// Strings are quoted (single quotes unless the text itself contains one),
    /// numbers are bare, and whole floats keep a trailing `.0`.
    pub fn repr(&self) -> String {
        match self {
            Self::Int(value) => value.to_string(),
            Self::Float(value) => format_float(*value),
            Self::Str(value) => quote_str(value),
        }
    }
}

impl Display for AttrValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Int(value) => write!(f, "{value}"),
            Self::Float(value) => f.write_str(&format_float(*value)),
            Self::Str(value) => f.write_str(value),
        }
    }
}

impl From<&str> for AttrValue {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<i64> for AttrValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<f64> for AttrValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

fn format_float(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e16 {
        format!("{value:.1}")
    } else {
        format!("{value}")
    }
}

fn quote_str(value: &str) -> String {
    let quote = if value.contains('\'') && !value.contains('"') {
        '"'
    } else {
        '\''
    };

    let mut out = String::with_capacity(value.len() + 2);
    out.push(quote);
    for ch in value.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c => out.push(c),
        }
    }
    out.push(quote);
    out
}

#[cfg(test)]
mod tests {
    use super::AttrValue;

    #[test]
    fn coerce_prefers_int_then_float_then_string() {
        assert_eq!(AttrValue::coerce("20"), AttrValue::Int(20));
        assert_eq!(AttrValue::coerce("-3"), AttrValue::Int(-3));
        assert_eq!(AttrValue::coerce("2.5"), AttrValue::Float(2.5));
        assert_eq!(AttrValue::coerce("x@g.c"), AttrValue::Str("x@g.c".to_string()));
    }

    #[test]
    fn coerce_keeps_non_finite_text_as_string() {
        assert_eq!(AttrValue::coerce("nan"), AttrValue::Str("nan".to_string()));
        assert_eq!(AttrValue::coerce("inf"), AttrValue::Str("inf".to_string()));
    }

    #[test]
    fn repr_quotes_strings_and_keeps_float_fraction() {
        assert_eq!(AttrValue::from("x").repr(), "'x'");
        assert_eq!(AttrValue::from("it's").repr(), "\"it's\"");
        assert_eq!(AttrValue::from(7_i64).repr(), "7");
        assert_eq!(AttrValue::from(1.0_f64).repr(), "1.0");
        assert_eq!(AttrValue::from(0.25_f64).repr(), "0.25");
    }

    #[test]
    fn untagged_serialization_uses_plain_scalars() {
        let json = serde_json::to_string(&vec![
            AttrValue::Int(1),
            AttrValue::Float(1.5),
            AttrValue::from("a"),
        ])
        .unwrap();
        assert_eq!(json, r#"[1,1.5,"a"]"#);

        let decoded: Vec<AttrValue> = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded[0], AttrValue::Int(1));
        assert_eq!(decoded[1], AttrValue::Float(1.5));
        assert_eq!(decoded[2], AttrValue::from("a"));
    }
}
