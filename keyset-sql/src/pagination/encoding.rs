//! JSON text form of page tokens.
//!
//! Tokens are written by hand rather than through a serializer because the
//! exact bytes are part of the wire format: elements are separated by `", "`
//! (`[false, "2017-01-01 05:23:45+00:00", "foo"]`), and clients that cache
//! or compare tokens depend on that. Parsing goes through `miniserde`.

use std::fmt::Write;

use crate::builder::Value;

use super::value_conv::format_timestamp;

/// Escape a string for JSON, ASCII-only.
///
/// Escapes:
/// - `"` -> `\"`
/// - `\` -> `\\`
/// - Control characters (U+0000 to U+001F) -> `\uXXXX` or named escapes
/// - Anything outside ASCII -> `\uXXXX`, as a surrogate pair above U+FFFF
pub(super) fn escape_json(s: &str) -> String {
    let mut result = String::with_capacity(s.len() + 2);
    for c in s.chars() {
        match c {
            '"' => result.push_str("\\\""),
            '\\' => result.push_str("\\\\"),
            '\n' => result.push_str("\\n"),
            '\r' => result.push_str("\\r"),
            '\t' => result.push_str("\\t"),
            '\x08' => result.push_str("\\b"),
            '\x0C' => result.push_str("\\f"),
            c if (c as u32) < 0x20 || !c.is_ascii() => {
                let mut units = [0u16; 2];
                for unit in c.encode_utf16(&mut units) {
                    let _ = write!(result, "\\u{unit:04x}");
                }
            },
            c => result.push(c),
        }
    }
    result
}

fn quoted(s: &str) -> String {
    format!("\"{}\"", escape_json(s))
}

/// JSON text for one key value.
///
/// Non-JSON-native values (timestamps, ranges) fall back to their string
/// form, which the data source parses back into its native type. Non-finite
/// floats have no JSON form and are written as `null`, which decoding rejects.
pub(super) fn value_to_json(value: &Value) -> String {
    match value {
        Value::Bool(b) => b.to_string(),
        Value::Int(i) => i.to_string(),
        Value::Float(f) if f.is_finite() => {
            let text = f.to_string();
            if text.contains(['.', 'e', 'E']) {
                text
            } else {
                format!("{text}.0")
            }
        },
        Value::Float(_) => "null".to_string(),
        Value::Text(s) | Value::Range(s) => quoted(s),
        Value::Timestamp(ts) => quoted(&format_timestamp(ts)),
    }
}

/// Render `[backward, v1, v2, ...]`.
pub(super) fn write_token(backward: bool, values: &[Value]) -> String {
    let mut parts = Vec::with_capacity(values.len() + 1);
    parts.push(backward.to_string());
    parts.extend(values.iter().map(value_to_json));
    format!("[{}]", parts.join(", "))
}
