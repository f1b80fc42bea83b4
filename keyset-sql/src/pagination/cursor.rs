//! Cursor encoding/decoding for keyset pagination.

use miniserde::json::{self, Number};
use thiserror::Error;

use crate::builder::{CursorDirection, Value, ValueKind};
use crate::error::PaginationError;

use super::encoding::write_token;
use super::sort_key::SortKeySpec;
use super::source::KeyedRow;
use super::value_conv::is_canonical_timestamp;

/// Maximum allowed token size in bytes (4KB).
const MAX_TOKEN_SIZE: usize = 4 * 1024;

/// Maximum number of key values allowed in a token.
pub(crate) const MAX_KEY_VALUES: usize = 16;

/// A decoded page position: which way to walk, and the key values of the
/// boundary row.
///
/// The wire form is a JSON array `[is_backward, v1, v2, ...]` with one value
/// per sort key column. Two cursors are equal when their decoded tuples are
/// equal, whatever their token bytes.
///
/// # Security Note
///
/// Tokens are plain JSON, **not encrypted or signed**. Clients can read and
/// forge them. Do not put sensitive columns in a sort key whose tokens are
/// handed out.
#[derive(Debug, Clone, PartialEq)]
#[must_use = "cursor must be encoded with .encode() or handed to a paginator"]
pub struct Cursor {
    /// Walk direction.
    pub direction: CursorDirection,
    /// Boundary key values, aligned with the sort key.
    pub values: Vec<Value>,
}

impl Cursor {
    /// Create a cursor.
    pub const fn new(direction: CursorDirection, values: Vec<Value>) -> Self {
        Self { direction, values }
    }

    /// Cursor for the rows after `values`.
    pub const fn forward(values: Vec<Value>) -> Self {
        Self::new(CursorDirection::Forward, values)
    }

    /// Cursor for the rows before `values`.
    pub const fn backward(values: Vec<Value>) -> Self {
        Self::new(CursorDirection::Backward, values)
    }

    /// Build a cursor from a row's key column values.
    ///
    /// Each value is coerced to its column's declared kind, so a timestamp a
    /// data source hands back as text is encoded as a timestamp. That text
    /// must already be in the canonical token form; the next query binds the
    /// canonical form and compares it against the stored text.
    pub fn from_row<R: KeyedRow + ?Sized>(
        row: &R,
        keys: &SortKeySpec,
        direction: CursorDirection,
    ) -> Result<Self, PaginationError> {
        let values = keys
            .iter()
            .map(|key| {
                let missing = || PaginationError::MissingKeyValue {
                    column: key.field.clone(),
                    kind: key.kind,
                };
                let value = row.key_value(&key.field).ok_or_else(missing)?;
                if key.kind == ValueKind::Timestamp
                    && let Value::Text(text) = &value
                    && !is_canonical_timestamp(text)
                {
                    return Err(PaginationError::NonCanonicalTimestamp {
                        column: key.field.clone(),
                        text: text.clone(),
                    });
                }
                value.coerce(key.kind).ok_or_else(missing)
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(direction, values))
    }

    /// Encode as a page token.
    #[must_use]
    pub fn encode(&self) -> String {
        write_token(self.direction.is_backward(), &self.values)
    }

    /// Whether `token` is the reserved "first page" marker: empty or `1`.
    #[must_use]
    pub fn is_first_page_token(token: &str) -> bool {
        let token = token.trim();
        token.is_empty() || token == "1"
    }

    /// Parse the structure of a token without looking at any sort key.
    ///
    /// Returns `Ok(None)` for the first-page marker.
    pub fn parse(token: &str) -> Result<Option<Self>, CursorError> {
        if token.len() > MAX_TOKEN_SIZE {
            return Err(CursorError::TooLarge);
        }
        if Self::is_first_page_token(token) {
            return Ok(None);
        }

        let parsed: json::Value = json::from_str(token).map_err(|_| CursorError::InvalidJson)?;
        let json::Value::Array(items) = parsed else {
            return Err(CursorError::NotAnArray);
        };

        let (first, rest) = items.split_first().ok_or(CursorError::MissingDirection)?;
        let json::Value::Bool(backward) = first else {
            return Err(CursorError::MissingDirection);
        };
        if rest.len() > MAX_KEY_VALUES {
            return Err(CursorError::TooManyValues);
        }

        let values = rest
            .iter()
            .enumerate()
            .map(|(position, item)| scalar(item).ok_or(CursorError::UnsupportedValue { position }))
            .collect::<Result<Vec<_>, _>>()?;

        let direction = if *backward {
            CursorDirection::Backward
        } else {
            CursorDirection::Forward
        };
        Ok(Some(Self::new(direction, values)))
    }

    /// Decode a token against a sort key.
    ///
    /// On top of [`Cursor::parse`], checks the value count against the sort
    /// key and coerces each value to its column's declared kind.
    ///
    /// # Example
    ///
    /// ```
    /// use keyset_sql::{Cursor, CursorDirection, SortKeySpec, Value, ValueKind};
    ///
    /// let keys = SortKeySpec::parse("-timestamp,group")
    ///     .unwrap()
    ///     .with_kind("timestamp", ValueKind::Timestamp)
    ///     .unwrap();
    ///
    /// let cursor = Cursor::decode(r#"[true, "2017-01-01 01:23:45+00:00", "qux"]"#, &keys)
    ///     .unwrap()
    ///     .unwrap();
    /// assert_eq!(cursor.direction, CursorDirection::Backward);
    /// assert!(matches!(cursor.values[0], Value::Timestamp(_)));
    ///
    /// assert!(Cursor::decode("1", &keys).unwrap().is_none());
    /// assert!(Cursor::decode(r#"["foo", "bar"]"#, &keys).is_err());
    /// ```
    pub fn decode(token: &str, keys: &SortKeySpec) -> Result<Option<Self>, PaginationError> {
        let Some(cursor) = Self::parse(token)? else {
            return Ok(None);
        };
        if cursor.values.len() != keys.len() {
            return Err(PaginationError::KeyLengthMismatch {
                expected: keys.len(),
                found: cursor.values.len(),
            });
        }

        let values = cursor
            .values
            .into_iter()
            .zip(keys.iter())
            .enumerate()
            .map(|(position, (value, key))| {
                value.coerce(key.kind).ok_or(CursorError::TypeMismatch {
                    position,
                    expected: key.kind,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Some(Self::new(cursor.direction, values)))
    }
}

/// JSON scalar to key value. `null`, arrays and objects are not key values.
fn scalar(item: &json::Value) -> Option<Value> {
    match item {
        json::Value::Bool(b) => Some(Value::Bool(*b)),
        json::Value::Number(Number::I64(i)) => Some(Value::Int(*i)),
        json::Value::Number(Number::U64(u)) => i64::try_from(*u).ok().map(Value::Int),
        json::Value::Number(Number::F64(f)) => Some(Value::Float(*f)),
        json::Value::String(s) => Some(Value::Text(s.clone())),
        json::Value::Null | json::Value::Array(_) | json::Value::Object(_) => None,
    }
}

/// Errors that can occur when parsing a page token.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum CursorError {
    /// The token is not valid JSON.
    #[error("page token is not valid JSON")]
    InvalidJson,
    /// The token is JSON but not an array.
    #[error("page token must be a JSON array")]
    NotAnArray,
    /// The first element is missing or not a boolean.
    #[error("page token must start with a boolean direction flag")]
    MissingDirection,
    /// A key value is `null`, an array, an object, or an out-of-range number.
    #[error("unsupported key value at position {position}")]
    UnsupportedValue {
        /// Zero-based key position.
        position: usize,
    },
    /// A key value cannot be read as its column's declared kind.
    #[error("key value at position {position} is not a valid {expected}")]
    TypeMismatch {
        /// Zero-based key position.
        position: usize,
        /// Declared kind of the column.
        expected: ValueKind,
    },
    /// The token exceeds the maximum allowed size.
    #[error("page token exceeds maximum size ({}KB limit)", MAX_TOKEN_SIZE / 1024)]
    TooLarge,
    /// The token carries too many key values.
    #[error("page token has too many key values (max {})", MAX_KEY_VALUES)]
    TooManyValues,
}

impl CursorError {
    /// Returns `true` if this is an encoding/format error.
    #[inline]
    #[must_use]
    pub const fn is_format_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidJson
                | Self::NotAnArray
                | Self::MissingDirection
                | Self::UnsupportedValue { .. }
                | Self::TypeMismatch { .. }
        )
    }

    /// Returns `true` if this is a size/limit error.
    #[inline]
    #[must_use]
    pub const fn is_limit_error(&self) -> bool {
        matches!(self, Self::TooLarge | Self::TooManyValues)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::SortField;
    use chrono::{TimeZone, Utc};

    fn event_keys() -> SortKeySpec {
        SortKeySpec::new(vec![
            SortField::asc("timestamp").with_kind(ValueKind::Timestamp),
            SortField::asc("group").with_kind(ValueKind::Text),
        ])
        .unwrap()
    }

    #[test]
    fn test_encode_matches_wire_format() {
        let ts = Utc.with_ymd_and_hms(2017, 1, 1, 1, 23, 45).unwrap();
        let cursor = Cursor::forward(vec![Value::Timestamp(ts), Value::Text("foo".into())]);
        assert_eq!(
            cursor.encode(),
            r#"[false, "2017-01-01 01:23:45+00:00", "foo"]"#
        );

        let cursor = Cursor::backward(vec![Value::Range("[2019-08-01, 2019-08-02)".into())]);
        assert_eq!(cursor.encode(), r#"[true, "[2019-08-01, 2019-08-02)"]"#);
    }

    #[test]
    fn test_decode_roundtrip_both_directions() {
        let keys = event_keys();
        let ts = Utc.with_ymd_and_hms(2017, 1, 1, 6, 23, 45).unwrap();
        for direction in [CursorDirection::Forward, CursorDirection::Backward] {
            let cursor = Cursor::new(
                direction,
                vec![Value::Timestamp(ts), Value::Text("q\"ux".into())],
            );
            let decoded = Cursor::decode(&cursor.encode(), &keys).unwrap();
            assert_eq!(decoded, Some(cursor));
        }
    }

    #[test]
    fn test_from_row_coerces_canonical_text() {
        let keys = event_keys();
        let row = std::collections::BTreeMap::from([
            ("timestamp".to_string(), Value::Text("2017-01-01 01:23:45+00:00".into())),
            ("group".to_string(), Value::Text("foo".into())),
        ]);
        let cursor = Cursor::from_row(&row, &keys, CursorDirection::Forward).unwrap();
        let ts = Utc.with_ymd_and_hms(2017, 1, 1, 1, 23, 45).unwrap();
        assert_eq!(cursor.values[0], Value::Timestamp(ts));
    }

    #[test]
    fn test_from_row_rejects_other_timestamp_text() {
        let keys = event_keys();
        for stored in ["2017-01-01T01:23:45Z", "2017-01-01 01:23:45"] {
            let row = std::collections::BTreeMap::from([
                ("timestamp".to_string(), Value::Text(stored.into())),
                ("group".to_string(), Value::Text("foo".into())),
            ]);
            assert_eq!(
                Cursor::from_row(&row, &keys, CursorDirection::Forward),
                Err(PaginationError::NonCanonicalTimestamp {
                    column: "timestamp".into(),
                    text: stored.into(),
                })
            );
        }
    }

    #[test]
    fn test_equality_is_on_decoded_tuple() {
        let compact = Cursor::parse(r#"[false,"a",1]"#).unwrap();
        let spaced = Cursor::parse(r#"[ false , "a" , 1 ]"#).unwrap();
        assert_eq!(compact, spaced);
    }

    #[test]
    fn test_first_page_markers() {
        let keys = event_keys();
        assert_eq!(Cursor::decode("", &keys), Ok(None));
        assert_eq!(Cursor::decode("1", &keys), Ok(None));
        assert_eq!(Cursor::decode(" 1 ", &keys), Ok(None));
    }

    #[test]
    fn test_structural_errors() {
        assert_eq!(Cursor::parse("[false,"), Err(CursorError::InvalidJson));
        assert_eq!(Cursor::parse("{\"a\":1}"), Err(CursorError::NotAnArray));
        assert_eq!(Cursor::parse("2"), Err(CursorError::NotAnArray));
        assert_eq!(Cursor::parse("[]"), Err(CursorError::MissingDirection));
        assert_eq!(
            Cursor::parse(r#"["foo", "bar"]"#),
            Err(CursorError::MissingDirection)
        );
        assert_eq!(
            Cursor::parse("[false, null]"),
            Err(CursorError::UnsupportedValue { position: 0 })
        );
        assert_eq!(
            Cursor::parse("[false, 1, [2]]"),
            Err(CursorError::UnsupportedValue { position: 1 })
        );
    }

    #[test]
    fn test_arity_mismatch() {
        let keys = event_keys();
        let err = Cursor::decode(r#"[false, "2017-01-01 01:23:45+00:00"]"#, &keys).unwrap_err();
        assert_eq!(
            err,
            PaginationError::KeyLengthMismatch {
                expected: 2,
                found: 1
            }
        );
        assert!(err.is_invalid_page());
    }

    #[test]
    fn test_type_mismatch() {
        let keys = event_keys();
        let err = Cursor::decode(r#"[false, "not a time", "foo"]"#, &keys).unwrap_err();
        assert_eq!(
            err,
            PaginationError::InvalidCursor(CursorError::TypeMismatch {
                position: 0,
                expected: ValueKind::Timestamp
            })
        );
        assert!(err.is_invalid_page());
    }

    #[test]
    fn test_untyped_keys_keep_json_shape() {
        let keys = SortKeySpec::parse("a,b,c").unwrap();
        let cursor = Cursor::decode(r#"[false, 7, 2.5, "x"]"#, &keys).unwrap().unwrap();
        assert_eq!(
            cursor.values,
            vec![Value::Int(7), Value::Float(2.5), Value::Text("x".into())]
        );
    }

    #[test]
    fn test_too_large() {
        let oversized = format!("[false, \"{}\"]", "a".repeat(5 * 1024));
        assert_eq!(Cursor::parse(&oversized), Err(CursorError::TooLarge));
    }

    #[test]
    fn test_too_many_values() {
        let at_limit = format!("[false{}]", ", 1".repeat(16));
        assert_eq!(Cursor::parse(&at_limit).unwrap().unwrap().values.len(), 16);

        let over = format!("[false{}]", ", 1".repeat(17));
        assert_eq!(Cursor::parse(&over), Err(CursorError::TooManyValues));
    }

    #[test]
    fn test_error_classification() {
        assert!(CursorError::InvalidJson.is_format_error());
        assert!(!CursorError::InvalidJson.is_limit_error());
        assert!(CursorError::TooLarge.is_limit_error());
        assert!(CursorError::TooManyValues.is_limit_error());
    }
}
