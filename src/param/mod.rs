// Param input model - the loosely-typed values callers filter with
// This module contains the scalar/list input types and the lexical helpers
// (comma splitting, escaping, numeric sniffing) the condition builder runs on

use serde::{Serialize, Serializer};
use std::fmt;

/// A single scalar entry inside a param value
/// Params arrive untyped, so this enum covers everything a caller can send
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Null,
    Int(i64),
    Float(f64),
    Bool(bool),
    Text(String),
}

impl Scalar {
    /// Convert to the plain JSON scalar the query-builder boundary expects
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Scalar::Null => serde_json::Value::Null,
            Scalar::Int(i) => serde_json::Value::from(*i),
            Scalar::Float(f) => serde_json::Value::from(*f),
            Scalar::Bool(b) => serde_json::Value::from(*b),
            Scalar::Text(s) => serde_json::Value::from(s.as_str()),
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Null => write!(f, "NULL"),
            Scalar::Int(i) => write!(f, "{}", i),
            Scalar::Float(v) => write!(f, "{}", v),
            Scalar::Bool(b) => write!(f, "{}", b),
            Scalar::Text(s) => write!(f, "{}", s),
        }
    }
}

// Scalars serialize as bare JSON scalars, not as tagged enum variants
impl Serialize for Scalar {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Scalar::Text(value.to_string())
    }
}

impl From<String> for Scalar {
    fn from(value: String) -> Self {
        Scalar::Text(value)
    }
}

impl From<i64> for Scalar {
    fn from(value: i64) -> Self {
        Scalar::Int(value)
    }
}

impl From<i32> for Scalar {
    fn from(value: i32) -> Self {
        Scalar::Int(i64::from(value))
    }
}

impl From<f64> for Scalar {
    fn from(value: f64) -> Self {
        Scalar::Float(value)
    }
}

impl From<bool> for Scalar {
    fn from(value: bool) -> Self {
        Scalar::Bool(value)
    }
}

/// The raw param value a caller supplies for one column
/// Validated at the boundary so the transform only ever sees these three shapes
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Null,
    Single(Scalar),
    Many(Vec<Scalar>),
}

impl From<Scalar> for ParamValue {
    fn from(value: Scalar) -> Self {
        ParamValue::Single(value)
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::Single(Scalar::from(value))
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        ParamValue::Single(Scalar::from(value))
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        ParamValue::Single(Scalar::from(value))
    }
}

impl From<f64> for ParamValue {
    fn from(value: f64) -> Self {
        ParamValue::Single(Scalar::from(value))
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        ParamValue::Single(Scalar::from(value))
    }
}

impl<T: Into<Scalar>> From<Vec<T>> for ParamValue {
    fn from(values: Vec<T>) -> Self {
        ParamValue::Many(values.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Scalar>> From<Option<T>> for ParamValue {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => ParamValue::Single(v.into()),
            None => ParamValue::Null,
        }
    }
}

/// Split a param string on commas, honoring backslash escapes
/// "foo,bar" becomes two entries; "foo\,bar" stays one entry with a literal comma
/// Each piece is trimmed and empty pieces are dropped
pub fn split_on_commas(input: &str) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut current = String::new();
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\\' if chars.peek() == Some(&',') => {
                current.push(',');
                chars.next();
            }
            ',' => pieces.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    pieces.push(current);

    pieces
        .into_iter()
        .map(|piece| piece.trim().to_string())
        .filter(|piece| !piece.is_empty())
        .collect()
}

/// Normalize a param value to its ordered entry list
///
/// Null becomes a one-entry list holding Null (so it can resolve to the
/// empty marker later), a single string is comma-split, and explicit lists
/// pass through with empty-string entries dropped
pub fn to_entries(value: ParamValue) -> Vec<Scalar> {
    match value {
        ParamValue::Null => vec![Scalar::Null],
        ParamValue::Single(Scalar::Text(s)) => {
            split_on_commas(&s).into_iter().map(Scalar::Text).collect()
        }
        ParamValue::Single(scalar) => vec![scalar],
        ParamValue::Many(items) => items
            .into_iter()
            .filter(|item| !matches!(item, Scalar::Text(s) if s.is_empty()))
            .collect(),
    }
}

/// Escape a literal value so it survives comma splitting and wildcard detection
pub fn escape_param(value: &str) -> String {
    value.replace(',', "\\,").replace('*', "\\*")
}

/// Whether a scalar can be stored in a numeric column
/// Text counts when it parses as an integer or a finite float
pub fn is_numeric(value: &Scalar) -> bool {
    match value {
        Scalar::Int(_) | Scalar::Float(_) => true,
        Scalar::Text(s) => {
            let trimmed = s.trim();
            !trimmed.is_empty()
                && (trimmed.parse::<i64>().is_ok()
                    || trimmed.parse::<f64>().map(f64::is_finite).unwrap_or(false))
        }
        Scalar::Null | Scalar::Bool(_) => false,
    }
}
