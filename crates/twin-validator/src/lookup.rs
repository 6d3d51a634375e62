//! Dot-path lookup and value shape checks.

use serde_json::Value;
use twin_schema::PropType;

/// Resolve a dot-separated path inside a JSON document.
///
/// Objects are traversed by key and arrays by decimal index. A missing key,
/// an out-of-range index, a non-container intermediate value or a `null`
/// at the end of the path all yield `None`.
pub fn lookup_path<'v>(document: &'v Value, path: &str) -> Option<&'v Value> {
    let mut current = document;
    for segment in path.split('.') {
        current = match current {
            Value::Object(map) => map.get(segment)?,
            Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    if current.is_null() {
        None
    } else {
        Some(current)
    }
}

/// Whether a value is, or is text for, a finite number.
pub fn is_number(value: &Value) -> bool {
    match value {
        Value::Number(_) => true,
        Value::String(text) => parse_number(text).is_some(),
        _ => false,
    }
}

fn parse_number(text: &str) -> Option<f64> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    // f64 parsing also accepts "inf" and "NaN"; neither is a number to a reader.
    text.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Whether a present value satisfies an expected property type.
///
/// Only `number` constrains the value; `string` and an absent type accept
/// anything that is present.
pub fn conforms(value: &Value, expected: Option<PropType>) -> bool {
    match expected {
        Some(PropType::Number) => is_number(value),
        Some(PropType::String) | None => true,
    }
}
