//! Runtime cell values for row comparison.
//!
//! A [`Cell`] is the value of one column in one row, borrowed from the row.
//! Condition values are read into the same type, so predicates and sorting
//! compare like with like.

use std::borrow::Cow;
use std::cmp::Ordering;

use serde_json::Value as Json;

/// The value of a column, borrowed from its row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Cell<'a> {
    /// String value (borrowed).
    String(&'a str),
    /// Numeric value.
    Number(Number),
    /// Boolean value.
    Bool(bool),
    /// Missing, null, or a nested array/object.
    Null,
}

impl<'a> Cell<'a> {
    /// Reads a JSON value as a cell.
    ///
    /// Arrays and objects have no scalar form and read as [`Cell::Null`].
    pub fn from_json(value: &'a Json) -> Self {
        match value {
            Json::String(s) => Cell::String(s),
            Json::Number(n) => Cell::Number(Number::from_json(n)),
            Json::Bool(b) => Cell::Bool(*b),
            Json::Null | Json::Array(_) | Json::Object(_) => Cell::Null,
        }
    }

    /// Returns `true` if this is a `Null` cell.
    pub fn is_null(&self) -> bool {
        matches!(self, Cell::Null)
    }

    /// Extracts the number, parsing string cells.
    pub fn as_number(&self) -> Option<Number> {
        match self {
            Cell::Number(n) => Some(*n),
            Cell::String(s) => Number::parse(s),
            _ => None,
        }
    }

    /// The text form used by pattern matching. `None` for null.
    pub fn text(&self) -> Option<Cow<'a, str>> {
        match self {
            Cell::String(s) => Some(Cow::Borrowed(*s)),
            Cell::Number(n) => Some(Cow::Owned(n.to_string())),
            Cell::Bool(b) => Some(Cow::Borrowed(if *b { "true" } else { "false" })),
            Cell::Null => None,
        }
    }
}

/// Numeric value supporting all common numeric types.
///
/// Comparisons between different variants go through `f64`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    /// Signed 64-bit integer.
    I64(i64),
    /// Unsigned 64-bit integer.
    U64(u64),
    /// 64-bit floating point.
    F64(f64),
}

impl Number {
    fn from_json(n: &serde_json::Number) -> Self {
        if let Some(i) = n.as_i64() {
            Number::I64(i)
        } else if let Some(u) = n.as_u64() {
            Number::U64(u)
        } else {
            Number::F64(n.as_f64().unwrap_or(f64::NAN))
        }
    }

    /// Parses trimmed text as an integer, falling back to a float.
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        if let Ok(i) = text.parse::<i64>() {
            return Some(Number::I64(i));
        }
        if let Ok(u) = text.parse::<u64>() {
            return Some(Number::U64(u));
        }
        text.parse::<f64>()
            .ok()
            .filter(|f| f.is_finite())
            .map(Number::F64)
    }

    /// Converts the number to f64 for comparison.
    pub fn to_f64(self) -> f64 {
        match self {
            Number::I64(n) => n as f64,
            Number::U64(n) => n as f64,
            Number::F64(n) => n,
        }
    }

    /// Compares two numbers, handling mixed types.
    pub fn compare(self, other: Number) -> Option<Ordering> {
        match (self, other) {
            (Number::I64(a), Number::I64(b)) => Some(a.cmp(&b)),
            (Number::U64(a), Number::U64(b)) => Some(a.cmp(&b)),
            (Number::F64(a), Number::F64(b)) => a.partial_cmp(&b),
            _ => self.to_f64().partial_cmp(&other.to_f64()),
        }
    }
}

impl PartialOrd for Number {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.compare(*other)
    }
}

impl std::fmt::Display for Number {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Number::I64(n) => write!(f, "{n}"),
            Number::U64(n) => write!(f, "{n}"),
            Number::F64(n) => write!(f, "{n}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn cells_from_json() {
        assert_eq!(Cell::from_json(&json!("ann")), Cell::String("ann"));
        assert_eq!(Cell::from_json(&json!(42)), Cell::Number(Number::I64(42)));
        assert_eq!(
            Cell::from_json(&json!(u64::MAX)),
            Cell::Number(Number::U64(u64::MAX))
        );
        assert_eq!(Cell::from_json(&json!(1.5)), Cell::Number(Number::F64(1.5)));
        assert_eq!(Cell::from_json(&json!(true)), Cell::Bool(true));
        assert!(Cell::from_json(&json!(null)).is_null());
        assert!(Cell::from_json(&json!([1, 2])).is_null());
        assert!(Cell::from_json(&json!({"a": 1})).is_null());
    }

    #[test]
    fn text_forms() {
        assert_eq!(Cell::String("x").text().as_deref(), Some("x"));
        assert_eq!(Cell::Number(Number::I64(30)).text().as_deref(), Some("30"));
        assert_eq!(Cell::Number(Number::F64(2.5)).text().as_deref(), Some("2.5"));
        assert_eq!(Cell::Bool(false).text().as_deref(), Some("false"));
        assert_eq!(Cell::Null.text(), None);
    }

    #[test]
    fn string_cells_parse_as_numbers() {
        assert_eq!(Cell::String(" 30 ").as_number(), Some(Number::I64(30)));
        assert_eq!(Cell::String("2.5").as_number(), Some(Number::F64(2.5)));
        assert_eq!(Cell::String("abc").as_number(), None);
        assert_eq!(Cell::String("NaN").as_number(), None);
        assert_eq!(Cell::Bool(true).as_number(), None);
    }

    #[test]
    fn number_comparisons_mixed_types() {
        assert_eq!(
            Number::I64(5).compare(Number::U64(10)),
            Some(Ordering::Less)
        );
        assert_eq!(
            Number::I64(5).compare(Number::F64(5.0)),
            Some(Ordering::Equal)
        );
        assert_eq!(
            Number::U64(10).compare(Number::F64(5.5)),
            Some(Ordering::Greater)
        );
    }

    #[test]
    fn number_nan_comparison() {
        assert_eq!(Number::F64(f64::NAN).compare(Number::F64(1.0)), None);
    }
}
