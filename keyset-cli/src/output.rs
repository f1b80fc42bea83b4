//! JSON-lines output: one object per row, then a page footer.

use std::io::Write;

use anyhow::Result;
use keyset_sql::{Page, Record, Value, timestamp_to_rfc3339};
use serde_json::{Map, json};

/// JSON form of a key or column value.
pub fn value_to_json(value: &Value) -> serde_json::Value {
    match value {
        Value::Bool(b) => serde_json::Value::Bool(*b),
        Value::Int(i) => serde_json::Value::from(*i),
        Value::Float(f) => serde_json::Number::from_f64(*f)
            .map_or(serde_json::Value::Null, serde_json::Value::Number),
        Value::Text(s) | Value::Range(s) => serde_json::Value::String(s.clone()),
        Value::Timestamp(ts) => serde_json::Value::String(timestamp_to_rfc3339(ts)),
    }
}

/// One row as a JSON object. NULL columns are left out.
pub fn record_to_json(record: &Record) -> serde_json::Value {
    let object: Map<String, serde_json::Value> = record
        .iter()
        .map(|(column, value)| (column.to_string(), value_to_json(value)))
        .collect();
    serde_json::Value::Object(object)
}

/// Navigation footer for a page.
pub fn footer(page: &Page<Record>) -> serde_json::Value {
    json!({
        "page": {
            "rows": page.len(),
            "has_next": page.has_next(),
            "has_previous": page.has_previous(),
            "next": page.next_page_number(),
            "previous": page.previous_page_number(),
        }
    })
}

/// Print a page's rows and its footer.
pub fn write_page<W: Write>(out: &mut W, page: &Page<Record>) -> Result<()> {
    for record in page {
        writeln!(out, "{}", record_to_json(record))?;
    }
    writeln!(out, "{}", footer(page))?;
    Ok(())
}
