//! Value conversion helpers for cursors and rows.

use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};

use crate::builder::{Value, ValueKind};

/// Text form of a timestamp inside a token: `2017-01-01 05:23:45+00:00`,
/// with `.ffffff` microseconds when the instant has a sub-second part.
#[must_use]
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    if ts.timestamp_subsec_micros() == 0 {
        ts.format("%Y-%m-%d %H:%M:%S%:z").to_string()
    } else {
        ts.format("%Y-%m-%d %H:%M:%S%.6f%:z").to_string()
    }
}

/// Parse a timestamp from its token text form, RFC 3339, or a naive
/// `YYYY-MM-DD HH:MM:SS` taken as UTC.
#[must_use]
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    DateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f%:z")
        .or_else(|_| DateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%:z"))
        .or_else(|_| DateTime::parse_from_rfc3339(s))
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f")
                .ok()
                .map(|naive| naive.and_utc())
        })
}

/// Whether `s` is exactly the text [`format_timestamp`] writes for the
/// instant it denotes.
#[must_use]
pub fn is_canonical_timestamp(s: &str) -> bool {
    parse_timestamp(s).is_some_and(|ts| format_timestamp(&ts) == s)
}

/// Whether `s` looks like a range literal: `[lower, upper)` with either
/// bracket style on each end.
fn is_range_literal(s: &str) -> bool {
    let s = s.trim();
    (s.starts_with('[') || s.starts_with('('))
        && (s.ends_with(']') || s.ends_with(')'))
        && s.contains(',')
}

impl Value {
    /// Coerce into `kind`, or `None` when the value cannot represent it.
    #[must_use]
    pub fn coerce(self, kind: ValueKind) -> Option<Self> {
        match (kind, self) {
            (ValueKind::Any, value) => Some(value),
            (ValueKind::Bool, value @ Self::Bool(_))
            | (ValueKind::Int, value @ Self::Int(_))
            | (ValueKind::Float, value @ Self::Float(_))
            | (ValueKind::Text, value @ Self::Text(_))
            | (ValueKind::Timestamp, value @ Self::Timestamp(_))
            | (ValueKind::Range, value @ Self::Range(_)) => Some(value),
            #[allow(clippy::cast_precision_loss)]
            (ValueKind::Float, Self::Int(i)) => Some(Self::Float(i as f64)),
            (ValueKind::Bool, Self::Int(0)) => Some(Self::Bool(false)),
            (ValueKind::Bool, Self::Int(1)) => Some(Self::Bool(true)),
            (ValueKind::Timestamp, Self::Text(s)) => parse_timestamp(&s).map(Self::Timestamp),
            (ValueKind::Range, Self::Text(s)) if is_range_literal(&s) => Some(Self::Range(s)),
            _ => None,
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(v: DateTime<Utc>) -> Self {
        Self::Timestamp(v)
    }
}

/// RFC 3339 form used when a timestamp leaves the crate as plain text
/// (CLI output, logs).
#[must_use]
pub fn timestamp_to_rfc3339(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_format_timestamp_token_form() {
        let ts = Utc.with_ymd_and_hms(2017, 1, 1, 5, 23, 45).unwrap();
        assert_eq!(format_timestamp(&ts), "2017-01-01 05:23:45+00:00");

        let ts = ts + chrono::Duration::microseconds(26_490);
        assert_eq!(format_timestamp(&ts), "2017-01-01 05:23:45.026490+00:00");
    }

    #[test]
    fn test_parse_timestamp_forms() {
        let expected = Utc.with_ymd_and_hms(2017, 1, 1, 1, 23, 45).unwrap();
        assert_eq!(parse_timestamp("2017-01-01 01:23:45+00:00"), Some(expected));
        assert_eq!(parse_timestamp("2017-01-01T01:23:45Z"), Some(expected));
        assert_eq!(parse_timestamp("2017-01-01 02:23:45+01:00"), Some(expected));
        assert_eq!(parse_timestamp("2017-01-01 01:23:45"), Some(expected));
        assert_eq!(parse_timestamp("yesterday"), None);
    }

    #[test]
    fn test_timestamp_text_roundtrip_with_micros() {
        let ts = Utc.with_ymd_and_hms(2020, 2, 29, 23, 59, 59).unwrap()
            + chrono::Duration::microseconds(1);
        assert_eq!(parse_timestamp(&format_timestamp(&ts)), Some(ts));
    }

    #[test]
    fn test_coerce() {
        assert_eq!(Value::Int(2).coerce(ValueKind::Float), Some(Value::Float(2.0)));
        assert_eq!(Value::Float(2.0).coerce(ValueKind::Int), None);
        assert_eq!(
            Value::Text("[2019-07-01, 2019-07-02)".into()).coerce(ValueKind::Range),
            Some(Value::Range("[2019-07-01, 2019-07-02)".into()))
        );
        assert_eq!(Value::Text("2019-07-01".into()).coerce(ValueKind::Range), None);
        assert_eq!(Value::Int(1).coerce(ValueKind::Text), None);
        assert_eq!(Value::Bool(true).coerce(ValueKind::Any), Some(Value::Bool(true)));
    }

    #[test]
    fn test_coerce_integer_flags() {
        assert_eq!(Value::Int(0).coerce(ValueKind::Bool), Some(Value::Bool(false)));
        assert_eq!(Value::Int(1).coerce(ValueKind::Bool), Some(Value::Bool(true)));
        assert_eq!(Value::Int(2).coerce(ValueKind::Bool), None);
        assert_eq!(Value::Int(-1).coerce(ValueKind::Bool), None);
    }

    #[test]
    fn test_canonical_timestamp_text() {
        assert!(is_canonical_timestamp("2017-01-01 01:23:45+00:00"));
        assert!(is_canonical_timestamp("2017-01-01 01:23:45.026490+00:00"));
        assert!(!is_canonical_timestamp("2017-01-01T01:23:45Z"));
        assert!(!is_canonical_timestamp("2017-01-01 01:23:45"));
        assert!(!is_canonical_timestamp("2017-01-01 02:23:45+01:00"));
        assert!(!is_canonical_timestamp("2017-01-01 01:23:45.000000+00:00"));
        assert!(!is_canonical_timestamp("yesterday"));
    }

    #[test]
    fn test_value_from_conversions() {
        assert_eq!(Value::from(42i32), Value::Int(42));
        assert_eq!(Value::from("foo"), Value::Text("foo".into()));
        assert_eq!(Value::from(true), Value::Bool(true));
    }
}
