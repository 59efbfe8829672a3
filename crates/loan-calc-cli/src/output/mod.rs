pub mod csv_out;
pub mod json;
pub mod minimal;
pub mod table;

use crate::OutputFormat;
use serde_json::{Map, Value};

/// Dispatch output to the appropriate formatter.
pub fn format_output(format: &OutputFormat, value: &Value) {
    match format {
        OutputFormat::Json => json::print_json(value),
        OutputFormat::Table => table::print_table(value),
        OutputFormat::Csv => csv_out::print_csv(value),
        OutputFormat::Minimal => minimal::print_minimal(value),
    }
}

/// The payload of a computation envelope, or the value itself.
pub(crate) fn result_of(value: &Value) -> &Value {
    value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value)
}

/// A repayment schedule nested anywhere one level down in `result`.
pub(crate) fn find_schedule(result: &Value) -> Option<&Vec<Value>> {
    let map = result.as_object()?;
    if let Some(Value::Array(rows)) = map.get("schedule") {
        return Some(rows);
    }
    map.values()
        .filter_map(|v| v.as_object())
        .find_map(|inner| inner.get("schedule").and_then(Value::as_array))
}

/// Scalar fields of `map`, with nested objects flattened as `outer.inner`.
pub(crate) fn scalar_fields(map: &Map<String, Value>) -> Vec<(String, &Value)> {
    let mut fields = Vec::new();
    for (key, val) in map {
        match val {
            Value::Object(inner) => {
                for (k, v) in inner {
                    if !v.is_array() && !v.is_object() {
                        fields.push((format!("{key}.{k}"), v));
                    }
                }
            }
            Value::Array(_) => {}
            _ => fields.push((key.clone(), val)),
        }
    }
    fields
}

pub(crate) fn format_scalar(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}
