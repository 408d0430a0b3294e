//! Join-result structurer
//!
//! The backend embeds related tables into each row as nested values: a
//! many-to-one relation arrives as a single object, a one-to-many relation as
//! an array. Downstream table code should never branch on that difference,
//! so every plain-object value is normalized to a single-element array —
//! one-to-one and one-to-many relations both read as collections.
//!
//! Everything that is not a plain object passes through untouched:
//! primitives, arrays (already collections), and `null` (an outer join that
//! found no related row stays `null` at the top level, it is never wrapped
//! into `[null]`).

use serde_json::Value as JsonValue;

/// Normalize embedded relations across a batch of rows.
///
/// Row order and count are preserved exactly; rows that are not JSON objects
/// pass through conservatively rather than being dropped.
pub fn structure_rows(rows: Vec<JsonValue>) -> Vec<JsonValue> {
    rows.into_iter().map(structure_row).collect()
}

fn structure_row(row: JsonValue) -> JsonValue {
    let fields = match row {
        JsonValue::Object(fields) => fields,
        other => return other,
    };

    let mut structured = serde_json::Map::with_capacity(fields.len());
    for (key, value) in fields {
        match value {
            JsonValue::Object(_) => {
                structured.insert(key, JsonValue::Array(vec![value]));
            }
            other => {
                structured.insert(key, other);
            }
        }
    }

    JsonValue::Object(structured)
}
