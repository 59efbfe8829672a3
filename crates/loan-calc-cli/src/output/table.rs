use serde_json::{Map, Value};
use tabled::{builder::Builder, Table};

use super::{find_schedule, format_scalar, result_of, scalar_fields};

/// Summary table of the result, followed by the schedule when there is one.
pub fn print_table(value: &Value) {
    let result = result_of(value);
    match result {
        Value::Object(map) => {
            print_fields(map);
            if let Some(rows) = find_schedule(result) {
                println!();
                print_rows(rows);
            }
        }
        Value::Array(rows) => print_rows(rows),
        other => println!("{}", format_scalar(other)),
    }

    if let Some(envelope) = value.as_object() {
        print_notes(envelope);
    }
}

fn print_fields(map: &Map<String, Value>) {
    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    for (key, val) in scalar_fields(map) {
        builder.push_record([key, format_scalar(val)]);
    }
    println!("{}", Table::from(builder));
}

fn print_rows(rows: &[Value]) {
    let Some(Value::Object(first)) = rows.first() else {
        println!("(no rows)");
        return;
    };

    let headers: Vec<String> = first.keys().cloned().collect();
    let mut builder = Builder::default();
    builder.push_record(headers.iter().cloned());
    for row in rows.iter().filter_map(Value::as_object) {
        builder.push_record(
            headers
                .iter()
                .map(|h| row.get(h).map(format_scalar).unwrap_or_default()),
        );
    }
    println!("{}", Table::from(builder));
}

fn print_notes(envelope: &Map<String, Value>) {
    if let Some(Value::Array(warnings)) = envelope.get("warnings") {
        if !warnings.is_empty() {
            println!("\nWarnings:");
            for w in warnings.iter().filter_map(Value::as_str) {
                println!("  - {w}");
            }
        }
    }
    if let Some(Value::String(meth)) = envelope.get("methodology") {
        println!("\nMethodology: {meth}");
    }
}
