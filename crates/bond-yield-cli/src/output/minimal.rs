use serde_json::Value;

use super::format_cell;

/// Headline figure per command, in priority order.
const PRIORITY_KEYS: [&str; 4] = ["ytm", "price", "currentYield", "totalInterest"];

/// Print just the key answer value from the output.
///
/// Looks for the headline field of the result, then falls back to the first
/// field. A bare schedule prints its final cumulative interest.
pub fn print_minimal(value: &Value) {
    println!("{}", minimal_line(value));
}

fn minimal_line(value: &Value) -> String {
    let result_obj = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    match result_obj {
        Value::Object(map) => {
            for key in PRIORITY_KEYS {
                if let Some(val) = map.get(key) {
                    if !val.is_null() {
                        return format_cell(val);
                    }
                }
            }
            match map.iter().next() {
                Some((key, val)) => format!("{}: {}", key, format_cell(val)),
                None => String::new(),
            }
        }
        Value::Array(arr) => arr
            .last()
            .and_then(|last| last.get("cumulativeInterest"))
            .map(format_cell)
            .unwrap_or_default(),
        other => format_cell(other),
    }
}
