use serde_json::Value;
use tabled::{builder::Builder, Table};

use super::{format_cell, headers_of, split_sections};

/// Format output as tables using the tabled crate.
///
/// Scalars go into a Field/Value table; each array of objects (the cash-flow
/// schedule) gets a table of its own underneath.
pub fn print_table(value: &Value) {
    match value {
        Value::Object(map) => {
            if let Some(result) = map.get("result") {
                print_result_table(result, map);
            } else {
                print_object(map);
            }
        }
        Value::Array(arr) => print_array_table(arr),
        _ => println!("{}", value),
    }
}

fn print_result_table(result: &Value, envelope: &serde_json::Map<String, Value>) {
    match result {
        Value::Object(res_map) => print_object(res_map),
        other => println!("{}", format_cell(other)),
    }

    if let Some(Value::Array(warnings)) = envelope.get("warnings") {
        if !warnings.is_empty() {
            println!("\nWarnings:");
            for w in warnings {
                if let Value::String(s) = w {
                    println!("  - {}", s);
                }
            }
        }
    }

    if let Some(Value::String(meth)) = envelope.get("methodology") {
        println!("\nMethodology: {}", meth);
    }
}

fn print_object(map: &serde_json::Map<String, Value>) {
    let (rows, tables) = split_sections(map);

    if !rows.is_empty() {
        let mut builder = Builder::default();
        builder.push_record(["Field", "Value"]);
        for (key, val) in rows {
            builder.push_record([key, format_cell(val)]);
        }
        println!("{}", Table::from(builder));
    }

    for (name, items) in tables {
        println!("\n{}:", name);
        print_array_table(items);
    }
}

fn print_array_table(arr: &[Value]) {
    if arr.is_empty() {
        println!("(empty)");
        return;
    }

    let headers = headers_of(arr);
    if headers.is_empty() {
        for item in arr {
            println!("{}", format_cell(item));
        }
        return;
    }

    let mut builder = Builder::default();
    builder.push_record(&headers);
    for item in arr {
        if let Value::Object(map) = item {
            let row: Vec<String> = headers
                .iter()
                .map(|h| map.get(h.as_str()).map(format_cell).unwrap_or_default())
                .collect();
            builder.push_record(row);
        }
    }
    println!("{}", Table::from(builder));
}
