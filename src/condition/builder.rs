// Condition builder
// This module converts loose param values into normalized condition trees
// It is a pure single-pass transform: no I/O, no shared state, one failure
// mode (a non-numeric value against a numeric column)

use crate::condition::{ColumnType, Condition, Glue, Operator, ValidationError};
use crate::dialect::Dialect;
use crate::param::{self, ParamValue, Scalar};

/// The sentinel a caller sends to mean "the column is NULL or blank"
pub const EMPTY_MARKER: &str = ":empty:";

const NOT_EMPTY_MARKER: &str = ":notempty:";
const NEGATED_EMPTY_MARKER: &str = "not :empty:";

// Operator prefixes checked against each entry, in priority order
// "not " must come first so "not 5" is not read as a literal value,
// and the two-character tokens must come before their one-character prefixes
const OPERATOR_PREFIXES: &[(&str, Operator)] = &[
    ("not ", Operator::Ne),
    ("!=", Operator::Ne),
    ("<=", Operator::Lte),
    (">=", Operator::Gte),
    ("<", Operator::Lt),
    (">", Operator::Gt),
    ("=", Operator::Eq),
];

/// Compiles param values into WHERE-clause condition trees
///
/// The dialect is injected once at construction; the builder itself holds
/// no other state and is safe to share across threads
pub struct ConditionBuilder {
    dialect: Dialect,
}

impl ConditionBuilder {
    /// Create a builder targeting the given dialect
    pub fn new(dialect: Dialect) -> Self {
        Self { dialect }
    }

    /// The dialect this builder targets
    pub fn dialect(&self) -> &Dialect {
        &self.dialect
    }

    /// Parse a param with the default settings: `=` operator,
    /// case-sensitive, no column type hint
    pub fn parse_param(
        &self,
        column: &str,
        value: impl Into<ParamValue>,
    ) -> Result<Condition, ValidationError> {
        self.parse(column, value, Operator::Eq, false, None)
    }

    /// Parse a param against a numeric column
    pub fn parse_numeric(
        &self,
        column: &str,
        value: impl Into<ParamValue>,
        default_operator: Operator,
    ) -> Result<Condition, ValidationError> {
        self.parse(
            column,
            value,
            default_operator,
            false,
            Some(ColumnType::Numeric),
        )
    }

    /// Parse a param against a boolean column
    pub fn parse_boolean(
        &self,
        column: &str,
        value: impl Into<ParamValue>,
    ) -> Result<Condition, ValidationError> {
        self.parse(column, value, Operator::Eq, false, Some(ColumnType::Boolean))
    }

    /// Parse a param value into a condition for the given column
    ///
    /// The value may be a scalar, an explicit list, or a comma-joined string
    /// (commas and asterisks can be backslash-escaped). An optional leading
    /// "and"/"or"/"not" entry picks the glue; "not" negates every operator.
    /// Entries may carry an operator prefix (`not `, `!=`, `<=`, `>=`, `<`,
    /// `>`, `=`); anything else gets `default_operator`.
    ///
    /// Returns `Condition::Empty` when the value constrains nothing: the
    /// literal string "not" on its own, or a value with no usable entries.
    pub fn parse(
        &self,
        column: &str,
        value: impl Into<ParamValue>,
        default_operator: Operator,
        case_insensitive: bool,
        column_type: Option<ColumnType>,
    ) -> Result<Condition, ValidationError> {
        let value = value.into();

        // A bare "not" means "ignore this filter entirely"
        if is_bare_not(&value) {
            return Ok(Condition::Empty);
        }

        let mut entries = param::to_entries(value);
        if entries.is_empty() {
            return Ok(Condition::Empty);
        }

        let (glue, negate) = extract_glue(&mut entries);

        let mut terms: Vec<Condition> = Vec::new();
        let mut in_values: Vec<Scalar> = Vec::new();
        let mut not_in_values: Vec<Scalar> = Vec::new();

        for entry in entries {
            let entry = normalize_empty_marker(entry);
            let (mut op, mut val) = extract_operator(entry, default_operator);
            if negate {
                op = op.negate();
            }

            // Boolean columns collapse straight to column => bool
            if column_type == Some(ColumnType::Boolean) {
                let mut truthy = is_truthy(&val);
                if op == Operator::Ne {
                    truthy = !truthy;
                }
                terms.push(Condition::Equals {
                    column: column.to_string(),
                    value: Scalar::Bool(truthy),
                });
                continue;
            }

            let is_marker = matches!(&val, Scalar::Text(s) if s == EMPTY_MARKER);

            if column_type == Some(ColumnType::Numeric) && !is_marker {
                if !param::is_numeric(&val) {
                    return Err(ValidationError::InvalidNumeric {
                        value: val.to_string(),
                    });
                }
                val = coerce_numeric(val);
            }

            if is_marker {
                terms.push(self.empty_condition(column, op, column_type));
                continue;
            }

            if let Scalar::Text(text) = val {
                let trimmed = text.trim();

                // Leading or unescaped-trailing asterisk switches = / != to
                // a LIKE pattern match
                if matches!(op, Operator::Eq | Operator::Ne) && has_wildcard(trimmed) {
                    let insensitive = case_insensitive && self.dialect.supports_ilike;
                    let like_op = match (op, insensitive) {
                        (Operator::Eq, false) => Operator::Like,
                        (Operator::Eq, true) => Operator::ILike,
                        (_, false) => Operator::NotLike,
                        (_, true) => Operator::NotILike,
                    };
                    terms.push(Condition::Compare {
                        op: like_op,
                        column: column.to_string(),
                        value: Scalar::Text(to_like_pattern(trimmed)),
                    });
                    continue;
                }

                let mut plain = trimmed.replace("\\*", "*");
                if case_insensitive && self.dialect.case_sensitive_strings {
                    plain = plain.to_lowercase();
                }
                val = Scalar::Text(plain);
            }

            // Equalities under OR and inequalities under AND collect into
            // IN / NOT IN buckets; everything else stays an explicit triple
            match (op, glue) {
                (Operator::Eq, Glue::Or) => in_values.push(val),
                (Operator::Ne, Glue::And) => not_in_values.push(val),
                _ => terms.push(Condition::Compare {
                    op,
                    column: column.to_string(),
                    value: val,
                }),
            }
        }

        if !in_values.is_empty() {
            terms.push(bucket(column, in_values, false));
        }
        if !not_in_values.is_empty() {
            terms.push(bucket(column, not_in_values, true));
        }

        Ok(match terms.len() {
            0 => Condition::Empty,
            1 => terms.remove(0),
            _ => Condition::Group { glue, terms },
        })
    }

    /// The condition for an empty marker: IS NULL, widened to also match
    /// the empty string when the column is textual or the type is unknown
    /// and the dialect blurs the two
    fn empty_condition(
        &self,
        column: &str,
        op: Operator,
        column_type: Option<ColumnType>,
    ) -> Condition {
        let also_empty_string = match column_type {
            Some(ColumnType::Textual) => true,
            None => self.dialect.empty_string_is_null,
            Some(_) => false,
        };
        let negated = op != Operator::Eq;

        if also_empty_string {
            let base = Condition::Group {
                glue: Glue::Or,
                terms: vec![
                    Condition::Null {
                        column: column.to_string(),
                        negated: false,
                    },
                    Condition::Equals {
                        column: column.to_string(),
                        value: Scalar::Text(String::new()),
                    },
                ],
            };
            if negated {
                Condition::Not(Box::new(base))
            } else {
                base
            }
        } else {
            Condition::Null {
                column: column.to_string(),
                negated,
            }
        }
    }
}

fn is_bare_not(value: &ParamValue) -> bool {
    matches!(value, ParamValue::Single(Scalar::Text(s)) if s.trim_end() == "not")
}

fn extract_glue(entries: &mut Vec<Scalar>) -> (Glue, bool) {
    let found = match entries.first() {
        Some(Scalar::Text(first)) => match first.to_lowercase().as_str() {
            "and" => Some((Glue::And, false)),
            "or" => Some((Glue::Or, false)),
            "not" => Some((Glue::And, true)),
            _ => None,
        },
        _ => None,
    };
    match found {
        Some(result) => {
            entries.remove(0);
            result
        }
        None => (Glue::Or, false),
    }
}

/// Canonicalize the empty-marker spellings: Null becomes `:empty:`, and the
/// negated forms all become `not :empty:` so the operator pass handles them
fn normalize_empty_marker(value: Scalar) -> Scalar {
    match value {
        Scalar::Null => Scalar::Text(EMPTY_MARKER.to_string()),
        Scalar::Text(s) => {
            let lower = s.to_lowercase();
            if lower == EMPTY_MARKER {
                Scalar::Text(EMPTY_MARKER.to_string())
            } else if lower == NOT_EMPTY_MARKER || lower == NEGATED_EMPTY_MARKER {
                Scalar::Text(NEGATED_EMPTY_MARKER.to_string())
            } else {
                Scalar::Text(s)
            }
        }
        other => other,
    }
}

/// Split an operator prefix off a text entry
///
/// A backslash-escaped prefix keeps the token as part of a literal value
/// with the default operator; an unrecognized prefix falls through to the
/// default operator unchanged
pub(crate) fn extract_operator(value: Scalar, default: Operator) -> (Operator, Scalar) {
    let text = match value {
        Scalar::Text(s) => s,
        other => return (default, other),
    };

    if let Some(rest) = text.strip_prefix('\\') {
        for (token, _) in OPERATOR_PREFIXES {
            if starts_with_ignore_case(rest, token) {
                return (default, Scalar::Text(rest.to_string()));
            }
        }
    }

    for (token, op) in OPERATOR_PREFIXES {
        if starts_with_ignore_case(&text, token) {
            let rest = text[token.len()..].trim().to_string();
            return (*op, Scalar::Text(rest));
        }
    }

    (default, Scalar::Text(text))
}

fn starts_with_ignore_case(text: &str, prefix: &str) -> bool {
    text.len() >= prefix.len()
        && text.as_bytes()[..prefix.len()].eq_ignore_ascii_case(prefix.as_bytes())
}

fn is_truthy(value: &Scalar) -> bool {
    match value {
        Scalar::Null => false,
        Scalar::Bool(b) => *b,
        Scalar::Int(i) => *i != 0,
        Scalar::Float(f) => *f != 0.0,
        Scalar::Text(s) => {
            let trimmed = s.trim();
            !(trimmed.is_empty()
                || trimmed == "0"
                || trimmed.eq_ignore_ascii_case("false")
                || trimmed == EMPTY_MARKER)
        }
    }
}

/// Convert validated text into a typed numeric scalar so the rendered SQL
/// carries unquoted numbers
fn coerce_numeric(value: Scalar) -> Scalar {
    match value {
        Scalar::Text(s) => {
            let trimmed = s.trim();
            if let Ok(i) = trimmed.parse::<i64>() {
                Scalar::Int(i)
            } else if let Ok(f) = trimmed.parse::<f64>() {
                Scalar::Float(f)
            } else {
                Scalar::Text(s)
            }
        }
        other => other,
    }
}

fn has_wildcard(text: &str) -> bool {
    text.starts_with('*') || (text.ends_with('*') && !text.ends_with("\\*"))
}

/// Rewrite a wildcard value as a LIKE pattern: unescaped `*` becomes `%`,
/// `\*` becomes a literal `*`, and `_` is escaped because SQL treats it as
/// a single-character wildcard
fn to_like_pattern(text: &str) -> String {
    let mut pattern = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\\' if chars.peek() == Some(&'*') => {
                pattern.push('*');
                chars.next();
            }
            '*' => pattern.push('%'),
            '_' => pattern.push_str("\\_"),
            _ => pattern.push(c),
        }
    }
    pattern
}

/// Collapse an IN / NOT IN bucket, unwrapping single-element buckets to a
/// plain equality or inequality
fn bucket(column: &str, mut values: Vec<Scalar>, negated: bool) -> Condition {
    if values.len() == 1 {
        let value = values.remove(0);
        if negated {
            Condition::Compare {
                op: Operator::Ne,
                column: column.to_string(),
                value,
            }
        } else {
            Condition::Equals {
                column: column.to_string(),
                value,
            }
        }
    } else {
        Condition::In {
            column: column.to_string(),
            values,
            negated,
        }
    }
}
