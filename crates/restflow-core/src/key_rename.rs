//! Pure structural key transforms over JSON values.

use serde_json::Value;
use std::collections::HashMap;

/// Rename object keys throughout the value according to `names`
/// (original key -> replacement). Keys absent from the map pass through.
pub fn rename_keys(value: Value, names: &HashMap<String, String>) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(key, value)| {
                    let key = names.get(&key).cloned().unwrap_or(key);
                    (key, rename_keys(value, names))
                })
                .collect(),
        ),
        Value::Array(items) => {
            Value::Array(items.into_iter().map(|item| rename_keys(item, names)).collect())
        }
        other => other,
    }
}

/// Convert every object key in the value from snake_case to camelCase.
pub fn camelize_keys(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(key, value)| (snake_to_camel(&key), camelize_keys(value)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.into_iter().map(camelize_keys).collect()),
        other => other,
    }
}

fn snake_to_camel(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    let mut upper_next = false;
    for ch in key.chars() {
        if ch == '_' {
            upper_next = true;
        } else if upper_next {
            out.extend(ch.to_uppercase());
            upper_next = false;
        } else {
            out.push(ch);
        }
    }
    out
}
