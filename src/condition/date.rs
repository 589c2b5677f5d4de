// Date params
// Date values arrive in the caller's reference timezone in a handful of
// loose formats; they are normalized to the UTC storage form before the
// regular condition pipeline runs

use crate::condition::builder::{extract_operator, ConditionBuilder, EMPTY_MARKER};
use crate::condition::{ColumnType, Condition, Operator, ValidationError};
use crate::param::{self, ParamValue, Scalar};
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, TimeZone, Utc};

/// The storage string form for datetime columns
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// Formats accepted without an explicit offset, interpreted in the
// caller's reference timezone
const NAIVE_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"];

impl ConditionBuilder {
    /// Parse a date param into a condition for the given column
    ///
    /// Each entry has its operator prefix split off, the remainder parsed
    /// as a date/time in `reference_tz` (an RFC 3339 offset in the value
    /// wins), and is rewritten as the UTC storage string with the operator
    /// reattached. The normalized list then runs through [`Self::parse`]
    /// with a datetime column type, so glue words and empty markers behave
    /// exactly as they do for any other param.
    pub fn parse_date(
        &self,
        column: &str,
        value: impl Into<ParamValue>,
        default_operator: Operator,
        reference_tz: FixedOffset,
    ) -> Result<Condition, ValidationError> {
        let value = value.into();

        if let ParamValue::Single(Scalar::Text(s)) = &value {
            if s.trim_end() == "not" {
                return Ok(Condition::Empty);
            }
        }

        let entries = param::to_entries(value);
        if entries.is_empty() {
            return Ok(Condition::Empty);
        }

        let mut normalized: Vec<Scalar> = Vec::with_capacity(entries.len());
        for (index, entry) in entries.into_iter().enumerate() {
            if index == 0 && is_glue_word(&entry) {
                normalized.push(entry);
                continue;
            }
            normalized.push(normalize_date_entry(entry, default_operator, reference_tz)?);
        }

        self.parse(
            column,
            ParamValue::Many(normalized),
            default_operator,
            false,
            Some(ColumnType::DateTime),
        )
    }
}

fn is_glue_word(entry: &Scalar) -> bool {
    matches!(
        entry,
        Scalar::Text(s) if matches!(s.to_lowercase().as_str(), "and" | "or" | "not")
    )
}

fn is_empty_marker(text: &str) -> bool {
    let lower = text.to_lowercase();
    lower == EMPTY_MARKER || lower == ":notempty:" || lower == "not :empty:"
}

/// Rewrite one entry as "<operator><UTC storage string>", passing Null and
/// the empty markers through untouched
fn normalize_date_entry(
    entry: Scalar,
    default_operator: Operator,
    reference_tz: FixedOffset,
) -> Result<Scalar, ValidationError> {
    match entry {
        Scalar::Null => Ok(Scalar::Null),
        Scalar::Int(timestamp) => {
            // Bare integers are unix timestamps
            let utc = Utc
                .timestamp_opt(timestamp, 0)
                .single()
                .ok_or(ValidationError::InvalidDate {
                    value: timestamp.to_string(),
                })?;
            Ok(Scalar::Text(format!(
                "{}{}",
                default_operator.token(),
                utc.format(DATETIME_FORMAT)
            )))
        }
        Scalar::Text(s) => {
            if is_empty_marker(&s) {
                return Ok(Scalar::Text(s));
            }
            let (op, rest) = extract_operator(Scalar::Text(s), default_operator);
            let raw = rest.to_string();
            let utc = parse_datetime(&raw, reference_tz)
                .ok_or(ValidationError::InvalidDate { value: raw })?;
            Ok(Scalar::Text(format!(
                "{}{}",
                op.token(),
                utc.format(DATETIME_FORMAT)
            )))
        }
        other => Err(ValidationError::InvalidDate {
            value: other.to_string(),
        }),
    }
}

fn parse_datetime(raw: &str, reference_tz: FixedOffset) -> Option<DateTime<Utc>> {
    let raw = raw.trim();

    // An explicit offset in the value overrides the reference timezone
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return local_to_utc(naive, reference_tz);
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return local_to_utc(date.and_hms_opt(0, 0, 0)?, reference_tz);
    }

    None
}

fn local_to_utc(naive: NaiveDateTime, reference_tz: FixedOffset) -> Option<DateTime<Utc>> {
    reference_tz
        .from_local_datetime(&naive)
        .single()
        .map(|dt| dt.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::condition::Glue;
    use crate::dialect::Dialect;

    fn builder() -> ConditionBuilder {
        ConditionBuilder::new(Dialect::postgres())
    }

    fn utc() -> FixedOffset {
        FixedOffset::east_opt(0).unwrap()
    }

    fn plus_two() -> FixedOffset {
        FixedOffset::east_opt(2 * 3600).unwrap()
    }

    #[test]
    fn test_date_equality_normalizes_to_utc() {
        // Midnight local at +02:00 is 22:00 the previous day in UTC
        let condition = builder()
            .parse_date("posted_at", "2023-01-01", Operator::Eq, plus_two())
            .unwrap();
        assert_eq!(
            condition,
            Condition::Equals {
                column: "posted_at".to_string(),
                value: Scalar::from("2022-12-31 22:00:00"),
            }
        );
    }

    #[test]
    fn test_explicit_offset_wins_over_reference_tz() {
        let condition = builder()
            .parse_date(
                "posted_at",
                "2023-01-01T12:00:00+05:00",
                Operator::Eq,
                plus_two(),
            )
            .unwrap();
        assert_eq!(
            condition,
            Condition::Equals {
                column: "posted_at".to_string(),
                value: Scalar::from("2023-01-01 07:00:00"),
            }
        );
    }

    #[test]
    fn test_same_instant_from_two_reference_timezones() {
        // The same wall-clock instant expressed with an explicit offset
        // normalizes identically no matter the reference timezone
        let a = builder()
            .parse_date("at", "2023-06-01T10:00:00+00:00", Operator::Eq, plus_two())
            .unwrap();
        let b = builder()
            .parse_date("at", "2023-06-01T10:00:00+00:00", Operator::Eq, utc())
            .unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_date_range_with_and_glue() {
        let condition = builder()
            .parse_date(
                "posted_at",
                vec!["and", ">=2023-01-01", "<2024-01-01"],
                Operator::Eq,
                utc(),
            )
            .unwrap();
        assert_eq!(
            condition,
            Condition::Group {
                glue: Glue::And,
                terms: vec![
                    Condition::Compare {
                        op: Operator::Gte,
                        column: "posted_at".to_string(),
                        value: Scalar::from("2023-01-01 00:00:00"),
                    },
                    Condition::Compare {
                        op: Operator::Lt,
                        column: "posted_at".to_string(),
                        value: Scalar::from("2024-01-01 00:00:00"),
                    },
                ],
            }
        );
    }

    #[test]
    fn test_time_of_day_is_preserved() {
        let condition = builder()
            .parse_date("at", "2023-03-04 05:06:07", Operator::Eq, utc())
            .unwrap();
        assert_eq!(
            condition,
            Condition::Equals {
                column: "at".to_string(),
                value: Scalar::from("2023-03-04 05:06:07"),
            }
        );
    }

    #[test]
    fn test_unix_timestamp_entries() {
        // 1672531200 is 2023-01-01T00:00:00Z
        let condition = builder()
            .parse_date("at", 1672531200i64, Operator::Eq, plus_two())
            .unwrap();
        assert_eq!(
            condition,
            Condition::Equals {
                column: "at".to_string(),
                value: Scalar::from("2023-01-01 00:00:00"),
            }
        );
    }

    #[test]
    fn test_empty_marker_passes_through() {
        let condition = builder()
            .parse_date("posted_at", ":empty:", Operator::Eq, utc())
            .unwrap();
        assert_eq!(
            condition,
            Condition::Null {
                column: "posted_at".to_string(),
                negated: false,
            }
        );

        let negated = builder()
            .parse_date("posted_at", ":notempty:", Operator::Eq, utc())
            .unwrap();
        assert_eq!(
            negated,
            Condition::Null {
                column: "posted_at".to_string(),
                negated: true,
            }
        );
    }

    #[test]
    fn test_null_resolves_to_is_null() {
        let condition = builder()
            .parse_date("posted_at", ParamValue::Null, Operator::Eq, utc())
            .unwrap();
        assert_eq!(
            condition,
            Condition::Null {
                column: "posted_at".to_string(),
                negated: false,
            }
        );
    }

    #[test]
    fn test_bare_not_short_circuits() {
        assert_eq!(
            builder()
                .parse_date("posted_at", "not", Operator::Eq, utc())
                .unwrap(),
            Condition::Empty
        );
    }

    #[test]
    fn test_invalid_date_errors() {
        let err = builder()
            .parse_date("posted_at", "yesterday-ish", Operator::Eq, utc())
            .unwrap_err();
        assert_eq!(
            err,
            ValidationError::InvalidDate {
                value: "yesterday-ish".to_string(),
            }
        );
    }
}
