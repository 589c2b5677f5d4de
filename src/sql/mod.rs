// SQL rendering
// Turns a condition tree into WHERE-clause text, and checks the rendered
// text against a real SQL grammar with the sqlparser crate

use crate::condition::Condition;
use crate::param::Scalar;
use anyhow::{anyhow, Result};
use sqlparser::ast::{SetExpr, Statement};
use sqlparser::dialect::GenericDialect;
use sqlparser::parser::Parser;

/// Render a condition as the text of a WHERE-clause fragment
/// An empty condition renders as an empty string
pub fn to_sql(condition: &Condition) -> String {
    match condition {
        Condition::Empty => String::new(),
        Condition::Equals { column, value } => match value {
            // An equality against NULL only ever means IS NULL
            Scalar::Null => format!("{} IS NULL", quote_ident(column)),
            _ => format!("{} = {}", quote_ident(column), quote_literal(value)),
        },
        Condition::Compare { op, column, value } => format!(
            "{} {} {}",
            quote_ident(column),
            op.symbol(),
            quote_literal(value)
        ),
        Condition::In {
            column,
            values,
            negated,
        } => {
            let list = values
                .iter()
                .map(quote_literal)
                .collect::<Vec<_>>()
                .join(", ");
            let keyword = if *negated { "NOT IN" } else { "IN" };
            format!("{} {} ({})", quote_ident(column), keyword, list)
        }
        Condition::Null { column, negated } => {
            let keyword = if *negated { "IS NOT NULL" } else { "IS NULL" };
            format!("{} {}", quote_ident(column), keyword)
        }
        Condition::Not(inner) => format!("NOT ({})", to_sql(inner)),
        Condition::Group { glue, terms } => {
            let joiner = format!(" {} ", glue.sql_keyword());
            terms
                .iter()
                .map(render_term)
                .collect::<Vec<_>>()
                .join(&joiner)
        }
    }
}

/// Render the full WHERE clause, or an empty string for no constraint
pub fn to_where_sql(condition: &Condition) -> String {
    let fragment = to_sql(condition);
    if fragment.is_empty() {
        fragment
    } else {
        format!("WHERE {}", fragment)
    }
}

// Nested groups get parentheses so glue precedence survives the flattening
fn render_term(term: &Condition) -> String {
    match term {
        Condition::Group { .. } => format!("({})", to_sql(term)),
        _ => to_sql(term),
    }
}

fn quote_literal(value: &Scalar) -> String {
    match value {
        Scalar::Null => "NULL".to_string(),
        Scalar::Int(i) => i.to_string(),
        Scalar::Float(f) => f.to_string(),
        Scalar::Bool(true) => "TRUE".to_string(),
        Scalar::Bool(false) => "FALSE".to_string(),
        Scalar::Text(s) => format!("'{}'", s.replace('\'', "''")),
    }
}

fn quote_ident(name: &str) -> String {
    let plain = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.');
    if plain {
        name.to_string()
    } else {
        format!("\"{}\"", name.replace('"', "\"\""))
    }
}

/// Check that the rendered fragment parses as the selection of a real
/// SELECT statement
pub fn validate(condition: &Condition) -> Result<()> {
    let fragment = to_sql(condition);
    if fragment.is_empty() {
        return Ok(());
    }

    let sql = format!("SELECT * FROM t WHERE {}", fragment);
    let dialect = GenericDialect {};
    let ast = Parser::parse_sql(&dialect, &sql)
        .map_err(|e| anyhow!("rendered fragment failed to parse: {}", e))?;

    match ast.first() {
        Some(Statement::Query(query)) => match query.body.as_ref() {
            SetExpr::Select(select) if select.selection.is_some() => Ok(()),
            _ => Err(anyhow!("rendered fragment did not produce a selection")),
        },
        _ => Err(anyhow!("rendered fragment did not produce a query")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::condition::builder::ConditionBuilder;
    use crate::condition::{Glue, Operator};
    use crate::dialect::Dialect;

    #[test]
    fn test_render_basic_shapes() {
        let equals = Condition::Equals {
            column: "name".to_string(),
            value: Scalar::from("foo"),
        };
        assert_eq!(to_sql(&equals), "name = 'foo'");

        let compare = Condition::Compare {
            op: Operator::Gte,
            column: "age".to_string(),
            value: Scalar::Int(21),
        };
        assert_eq!(to_sql(&compare), "age >= 21");

        let null = Condition::Null {
            column: "email".to_string(),
            negated: true,
        };
        assert_eq!(to_sql(&null), "email IS NOT NULL");
    }

    #[test]
    fn test_render_in_lists() {
        let in_list = Condition::In {
            column: "id".to_string(),
            values: vec![Scalar::Int(1), Scalar::Int(2), Scalar::Int(3)],
            negated: false,
        };
        assert_eq!(to_sql(&in_list), "id IN (1, 2, 3)");

        let not_in = Condition::In {
            column: "id".to_string(),
            values: vec![Scalar::from("a"), Scalar::from("b")],
            negated: true,
        };
        assert_eq!(to_sql(&not_in), "id NOT IN ('a', 'b')");
    }

    #[test]
    fn test_render_groups_with_parens() {
        let group = Condition::Group {
            glue: Glue::And,
            terms: vec![
                Condition::Compare {
                    op: Operator::Gte,
                    column: "age".to_string(),
                    value: Scalar::Int(5),
                },
                Condition::Group {
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
                },
            ],
        };
        assert_eq!(
            to_sql(&group),
            "age >= 5 AND (email IS NULL OR email = '')"
        );
    }

    #[test]
    fn test_render_not_wrapper() {
        let not = Condition::Not(Box::new(Condition::Group {
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
        }));
        assert_eq!(to_sql(&not), "NOT (email IS NULL OR email = '')");
    }

    #[test]
    fn test_literal_quoting() {
        let equals = Condition::Equals {
            column: "name".to_string(),
            value: Scalar::from("O'Brien"),
        };
        assert_eq!(to_sql(&equals), "name = 'O''Brien'");
    }

    #[test]
    fn test_ident_quoting() {
        let equals = Condition::Equals {
            column: "weird col".to_string(),
            value: Scalar::Int(1),
        };
        assert_eq!(to_sql(&equals), "\"weird col\" = 1");
    }

    #[test]
    fn test_where_clause_wrapping() {
        assert_eq!(to_where_sql(&Condition::Empty), "");
        let equals = Condition::Equals {
            column: "id".to_string(),
            value: Scalar::Int(1),
        };
        assert_eq!(to_where_sql(&equals), "WHERE id = 1");
    }

    #[test]
    fn test_rendered_fragments_parse_back() {
        let builder = ConditionBuilder::new(Dialect::mysql());

        let conditions = [
            builder.parse_param("name", "foo,bar").unwrap(),
            builder.parse_param("id", vec!["and", "!=1", "!=2"]).unwrap(),
            builder.parse_param("title", "*foo").unwrap(),
            builder.parse_param("email", ":notempty:").unwrap(),
            builder
                .parse("age", vec!["and", ">=5", "<10"], Operator::Eq, false, None)
                .unwrap(),
        ];
        for condition in &conditions {
            validate(condition).unwrap();
        }
    }

    #[test]
    fn test_empty_condition_validates() {
        validate(&Condition::Empty).unwrap();
    }
}
