pub mod csv_out;
pub mod minimal;
pub mod table;

use crate::OutputFormat;
use serde_json::Value;

/// Dispatch output to the appropriate formatter.
pub fn format_output(format: &OutputFormat, value: &Value) {
    match format {
        OutputFormat::Json => print_json(value),
        OutputFormat::Table => table::print_table(value),
        OutputFormat::Csv => csv_out::print_csv(value),
        OutputFormat::Minimal => minimal::print_minimal(value),
    }
}

fn print_json(value: &Value) {
    match serde_json::to_string_pretty(value) {
        Ok(s) => println!("{}", s),
        Err(e) => eprintln!("JSON serialization error: {}", e),
    }
}

/// Render a scalar for a single table or CSV cell.
pub(crate) fn format_cell(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}

/// Split an object into `(dotted key, scalar)` rows and the arrays of
/// objects it carries (e.g. `cashFlowSchedule`), which render as their
/// own tables.
pub(crate) fn split_sections<'a>(
    map: &'a serde_json::Map<String, Value>,
) -> (Vec<(String, &'a Value)>, Vec<(&'a str, &'a [Value])>) {
    let mut rows = Vec::new();
    let mut tables = Vec::new();
    flatten_into("", map, &mut rows, &mut tables);
    (rows, tables)
}

fn flatten_into<'a>(
    prefix: &str,
    map: &'a serde_json::Map<String, Value>,
    rows: &mut Vec<(String, &'a Value)>,
    tables: &mut Vec<(&'a str, &'a [Value])>,
) {
    for (key, val) in map {
        let name = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };
        match val {
            Value::Object(inner) => flatten_into(&name, inner, rows, tables),
            Value::Array(items) if items.iter().all(Value::is_object) && !items.is_empty() => {
                tables.push((key.as_str(), items.as_slice()));
            }
            _ => rows.push((name, val)),
        }
    }
}

/// Column headers for an array of objects, in first-row key order.
pub(crate) fn headers_of(items: &[Value]) -> Vec<String> {
    match items.first() {
        Some(Value::Object(first)) => first.keys().cloned().collect(),
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_split_sections_flattens_nested_objects() {
        let value = json!({
            "ytm": 6.19,
            "raw": { "periods": { "totalPeriods": 5 } },
            "cashFlowSchedule": [{ "period": 1 }, { "period": 2 }]
        });
        let (rows, tables) = split_sections(value.as_object().unwrap());
        let keys: Vec<&str> = rows.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["ytm", "raw.periods.totalPeriods"]);
        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0].0, "cashFlowSchedule");
        assert_eq!(tables[0].1.len(), 2);
    }

    #[test]
    fn test_headers_keep_insertion_order() {
        let value = json!([{ "period": 1, "paymentDate": "x", "couponPayment": 50.0 }]);
        assert_eq!(
            headers_of(value.as_array().unwrap()),
            vec!["period", "paymentDate", "couponPayment"]
        );
    }

    #[test]
    fn test_format_cell_null_is_empty() {
        assert_eq!(format_cell(&Value::Null), "");
        assert_eq!(format_cell(&json!("PAR")), "PAR");
    }
}
