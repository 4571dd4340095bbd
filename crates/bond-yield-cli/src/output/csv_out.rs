use serde_json::Value;
use std::io;

use super::{format_cell, headers_of, split_sections};

/// Write output as CSV to stdout.
///
/// A bare schedule is one header row plus one row per period. Enveloped
/// results write `field,value` pairs first, then a blank line and each
/// embedded schedule with its own header row.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    let mut wtr = csv::WriterBuilder::new()
        .flexible(true)
        .from_writer(stdout.lock());

    match value {
        Value::Object(map) => {
            let body = match map.get("result") {
                Some(Value::Object(result)) => result,
                _ => map,
            };
            write_object_csv(&mut wtr, body);
        }
        Value::Array(arr) => write_array_csv(&mut wtr, arr),
        _ => {
            let _ = wtr.write_record([format_cell(value)]);
        }
    }

    let _ = wtr.flush();
}

fn write_object_csv<W: io::Write>(wtr: &mut csv::Writer<W>, map: &serde_json::Map<String, Value>) {
    let (rows, tables) = split_sections(map);

    let _ = wtr.write_record(["field", "value"]);
    for (key, val) in rows {
        let _ = wtr.write_record([key, format_cell(val)]);
    }

    for (_, items) in tables {
        let _ = wtr.write_record([""]);
        write_array_csv(wtr, items);
    }
}

fn write_array_csv<W: io::Write>(wtr: &mut csv::Writer<W>, arr: &[Value]) {
    let headers = headers_of(arr);
    if headers.is_empty() {
        for item in arr {
            let _ = wtr.write_record([format_cell(item)]);
        }
        return;
    }

    let _ = wtr.write_record(&headers);
    for item in arr {
        if let Value::Object(map) = item {
            let row: Vec<String> = headers
                .iter()
                .map(|h| map.get(h.as_str()).map(format_cell).unwrap_or_default())
                .collect();
            let _ = wtr.write_record(&row);
        }
    }
}
