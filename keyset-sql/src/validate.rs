//! Identifier validation for table and key column names.
//!
//! Column names flow into rendered SQL (quoted, but never bound as
//! parameters), so only plain identifiers are accepted.

/// Maximum length for SQL identifiers (`PostgreSQL` limit is 63).
const MAX_IDENTIFIER_LENGTH: usize = 63;

/// Whether `s` is a plain SQL identifier: `[A-Za-z_][A-Za-z0-9_]*`, 1-63 chars.
///
/// ```
/// use keyset_sql::is_valid_sql_identifier;
///
/// assert!(is_valid_sql_identifier("timestamp"));
/// assert!(is_valid_sql_identifier("valid_period"));
/// assert!(!is_valid_sql_identifier("-timestamp"));
/// assert!(!is_valid_sql_identifier("events.group"));
/// ```
#[inline]
#[must_use]
pub fn is_valid_sql_identifier(s: &str) -> bool {
    if s.is_empty() || s.len() > MAX_IDENTIFIER_LENGTH {
        return false;
    }

    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {},
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Assert that a string is a valid SQL identifier.
///
/// For names written in code (table names handed to the query builder).
/// Names coming from configuration or user input go through
/// [`crate::SortKeySpec::new`], which reports an error instead.
///
/// # Panics
///
/// Panics with a descriptive message if the identifier is invalid.
#[inline]
pub fn assert_valid_sql_identifier(s: &str, context: &str) {
    assert!(
        is_valid_sql_identifier(s),
        "Invalid SQL {context} name '{s}': must start with letter/underscore, \
             contain only ASCII alphanumeric/underscore, and be 1-63 chars"
    );
}
