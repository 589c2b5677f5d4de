// Dialect configuration
// The two supported backends disagree on how empty strings and text
// comparisons behave, so the builder takes these flags explicitly instead
// of sniffing a connection handle

use serde::{Deserialize, Serialize};

/// Behavior flags for the SQL backend the conditions target
/// All fields are read-only hints; the builder never writes them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dialect {
    /// Whether the backend treats an empty string as interchangeable with NULL
    pub empty_string_is_null: bool,
    /// Whether plain text comparisons are case-sensitive on this backend
    pub case_sensitive_strings: bool,
    /// Whether the backend has a case-insensitive LIKE operator
    pub supports_ilike: bool,
}

impl Dialect {
    /// MySQL: empty string and NULL are often interchangeable, default
    /// collations compare case-insensitively, and there is no ILIKE
    pub fn mysql() -> Self {
        Self {
            empty_string_is_null: true,
            case_sensitive_strings: false,
            supports_ilike: false,
        }
    }

    /// PostgreSQL: empty string is distinct from NULL, comparisons are
    /// case-sensitive, and ILIKE is available
    pub fn postgres() -> Self {
        Self {
            empty_string_is_null: false,
            case_sensitive_strings: true,
            supports_ilike: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets_disagree_where_the_backends_do() {
        let mysql = Dialect::mysql();
        let postgres = Dialect::postgres();

        assert!(mysql.empty_string_is_null);
        assert!(!mysql.case_sensitive_strings);
        assert!(!mysql.supports_ilike);

        assert!(!postgres.empty_string_is_null);
        assert!(postgres.case_sensitive_strings);
        assert!(postgres.supports_ilike);
    }
}
