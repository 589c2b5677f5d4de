// Condition model
// This module contains the normalized condition tree the builder produces
// and the small closed enums (glue, operator, column type) it works with

pub mod builder;
pub mod date;

use crate::param::Scalar;
use serde::{Deserialize, Serialize, Serializer};
use thiserror::Error;

/// The logical operator joining multiple value conditions for one column
/// NOT is accepted in input but rewritten as AND plus negated operators,
/// so it never appears in the output tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Glue {
    And,
    Or,
}

impl Glue {
    /// The lowercase keyword used in the query-builder array form
    pub fn keyword(&self) -> &'static str {
        match self {
            Glue::And => "and",
            Glue::Or => "or",
        }
    }

    /// The uppercase SQL keyword
    pub fn sql_keyword(&self) -> &'static str {
        match self {
            Glue::And => "AND",
            Glue::Or => "OR",
        }
    }
}

/// A comparison operator attached to one value condition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operator {
    #[serde(rename = "=")]
    Eq,
    #[serde(rename = "!=")]
    Ne,
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = "<=")]
    Lte,
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = ">=")]
    Gte,
    #[serde(rename = "like")]
    Like,
    #[serde(rename = "not like")]
    NotLike,
    #[serde(rename = "ilike")]
    ILike,
    #[serde(rename = "not ilike")]
    NotILike,
}

impl Operator {
    /// The flipped operator, used when a NOT glue negates every condition
    pub fn negate(self) -> Self {
        match self {
            Operator::Eq => Operator::Ne,
            Operator::Ne => Operator::Eq,
            Operator::Lt => Operator::Gte,
            Operator::Gte => Operator::Lt,
            Operator::Gt => Operator::Lte,
            Operator::Lte => Operator::Gt,
            Operator::Like => Operator::NotLike,
            Operator::NotLike => Operator::Like,
            Operator::ILike => Operator::NotILike,
            Operator::NotILike => Operator::ILike,
        }
    }

    /// The lowercase token used in the query-builder array form
    pub fn token(self) -> &'static str {
        match self {
            Operator::Eq => "=",
            Operator::Ne => "!=",
            Operator::Lt => "<",
            Operator::Lte => "<=",
            Operator::Gt => ">",
            Operator::Gte => ">=",
            Operator::Like => "like",
            Operator::NotLike => "not like",
            Operator::ILike => "ilike",
            Operator::NotILike => "not ilike",
        }
    }

    /// The SQL spelling of the operator
    pub fn symbol(self) -> &'static str {
        match self {
            Operator::Eq => "=",
            Operator::Ne => "!=",
            Operator::Lt => "<",
            Operator::Lte => "<=",
            Operator::Gt => ">",
            Operator::Gte => ">=",
            Operator::Like => "LIKE",
            Operator::NotLike => "NOT LIKE",
            Operator::ILike => "ILIKE",
            Operator::NotILike => "NOT ILIKE",
        }
    }

    /// Parse a comparison token as supplied by a caller ("not" maps to !=)
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "=" => Some(Operator::Eq),
            "!=" | "not" => Some(Operator::Ne),
            "<" => Some(Operator::Lt),
            "<=" => Some(Operator::Lte),
            ">" => Some(Operator::Gt),
            ">=" => Some(Operator::Gte),
            _ => None,
        }
    }
}

/// Coarse column classification used to choose comparison semantics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    Numeric,
    Textual,
    Boolean,
    DateTime,
}

/// One fragment of a WHERE clause, normalized from a param value
///
/// The tree mirrors the shapes the downstream query builder consumes:
/// a column-equals-value map, an operator triple, an IN list, or a nested
/// list with a leading glue keyword. A single-condition result is always
/// returned unwrapped, and an empty input yields `Empty`.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// No constraint at all; the caller should skip this filter
    Empty,
    /// column = value, the hash-map form
    Equals { column: String, value: Scalar },
    /// An explicit [operator, column, value] triple
    Compare {
        op: Operator,
        column: String,
        value: Scalar,
    },
    /// column IN (values) or column NOT IN (values)
    In {
        column: String,
        values: Vec<Scalar>,
        negated: bool,
    },
    /// column IS NULL or column IS NOT NULL
    Null { column: String, negated: bool },
    /// Negation of a grouped condition
    Not(Box<Condition>),
    /// [glue, ...conditions]
    Group { glue: Glue, terms: Vec<Condition> },
}

impl Condition {
    /// Whether this condition constrains anything
    pub fn is_empty(&self) -> bool {
        matches!(self, Condition::Empty)
    }

    /// Convert to the nested-array JSON form the query builder expects
    ///
    /// `Empty` becomes the empty string, the historical "no constraint"
    /// sentinel the rest of the system checks for
    pub fn to_param(&self) -> serde_json::Value {
        match self {
            Condition::Empty => serde_json::Value::from(""),
            Condition::Equals { column, value } => map_entry(column, value.to_json()),
            Condition::Compare { op, column, value } => serde_json::Value::from(vec![
                serde_json::Value::from(op.token()),
                serde_json::Value::from(column.as_str()),
                value.to_json(),
            ]),
            Condition::In {
                column,
                values,
                negated,
            } => {
                let list =
                    serde_json::Value::from(values.iter().map(Scalar::to_json).collect::<Vec<_>>());
                if *negated {
                    serde_json::Value::from(vec![
                        serde_json::Value::from("not in"),
                        serde_json::Value::from(column.as_str()),
                        list,
                    ])
                } else {
                    map_entry(column, list)
                }
            }
            Condition::Null { column, negated } => {
                let null_map = map_entry(column, serde_json::Value::Null);
                if *negated {
                    serde_json::Value::from(vec![serde_json::Value::from("not"), null_map])
                } else {
                    null_map
                }
            }
            Condition::Not(inner) => {
                serde_json::Value::from(vec![serde_json::Value::from("not"), inner.to_param()])
            }
            Condition::Group { glue, terms } => {
                let mut items = vec![serde_json::Value::from(glue.keyword())];
                items.extend(terms.iter().map(Condition::to_param));
                serde_json::Value::from(items)
            }
        }
    }
}

// Conditions serialize as their query-builder array form
impl Serialize for Condition {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_param().serialize(serializer)
    }
}

fn map_entry(column: &str, value: serde_json::Value) -> serde_json::Value {
    let mut map = serde_json::Map::new();
    map.insert(column.to_string(), value);
    serde_json::Value::Object(map)
}

/// The one hard failure mode of the transform
/// Everything else malformed degrades to a default or empty result
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("invalid numeric value: {value}")]
    InvalidNumeric { value: String },
    #[error("invalid date value: {value}")]
    InvalidDate { value: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_operator_negation_is_an_involution() {
        let all = [
            Operator::Eq,
            Operator::Ne,
            Operator::Lt,
            Operator::Lte,
            Operator::Gt,
            Operator::Gte,
            Operator::Like,
            Operator::NotLike,
            Operator::ILike,
            Operator::NotILike,
        ];
        for op in all {
            assert_eq!(op.negate().negate(), op);
        }
        assert_eq!(Operator::Lt.negate(), Operator::Gte);
        assert_eq!(Operator::Gt.negate(), Operator::Lte);
    }

    #[test]
    fn test_operator_from_token_maps_not() {
        assert_eq!(Operator::from_token("not"), Some(Operator::Ne));
        assert_eq!(Operator::from_token(">="), Some(Operator::Gte));
        assert_eq!(Operator::from_token("like"), None);
    }

    #[test]
    fn test_to_param_shapes() {
        let equals = Condition::Equals {
            column: "name".to_string(),
            value: Scalar::from("foo"),
        };
        assert_eq!(equals.to_param(), json!({"name": "foo"}));

        let triple = Condition::Compare {
            op: Operator::Gte,
            column: "age".to_string(),
            value: Scalar::Int(21),
        };
        assert_eq!(triple.to_param(), json!([">=", "age", 21]));

        let in_list = Condition::In {
            column: "id".to_string(),
            values: vec![Scalar::Int(1), Scalar::Int(2)],
            negated: false,
        };
        assert_eq!(in_list.to_param(), json!({"id": [1, 2]}));

        let not_in = Condition::In {
            column: "id".to_string(),
            values: vec![Scalar::Int(1), Scalar::Int(2)],
            negated: true,
        };
        assert_eq!(not_in.to_param(), json!(["not in", "id", [1, 2]]));
    }

    #[test]
    fn test_to_param_nesting() {
        let group = Condition::Group {
            glue: Glue::Or,
            terms: vec![
                Condition::Null {
                    column: "email".to_string(),
                    negated: false,
                },
                Condition::Equals {
                    column: "email".to_string(),
                    value: Scalar::from(""),
                },
            ],
        };
        assert_eq!(group.to_param(), json!(["or", {"email": null}, {"email": ""}]));

        let negated = Condition::Not(Box::new(group));
        assert_eq!(
            negated.to_param(),
            json!(["not", ["or", {"email": null}, {"email": ""}]])
        );
    }

    #[test]
    fn test_empty_serializes_as_empty_string() {
        assert_eq!(Condition::Empty.to_param(), json!(""));
        assert!(Condition::Empty.is_empty());
    }

    #[test]
    fn test_validation_error_message() {
        let err = ValidationError::InvalidNumeric {
            value: "abc".to_string(),
        };
        assert_eq!(err.to_string(), "invalid numeric value: abc");
    }
}
