use serde_json::Value;
use std::io;

use super::{find_schedule, format_scalar, result_of, scalar_fields};

/// Write output as CSV to stdout.
///
/// Schedules are written row by row; anything else as `field,value` pairs.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    let mut wtr = csv::Writer::from_writer(stdout.lock());

    let result = result_of(value);
    let written = match (result, find_schedule(result)) {
        (Value::Array(rows), _) | (_, Some(rows)) => write_rows(&mut wtr, rows),
        (Value::Object(map), None) => {
            let mut res = wtr.write_record(["field", "value"]);
            for (key, val) in scalar_fields(map) {
                res = res.and_then(|_| wtr.write_record([key, format_scalar(val)]));
            }
            res
        }
        (other, None) => wtr.write_record([format_scalar(other)]),
    };

    if let Err(e) = written.and_then(|_| wtr.flush().map_err(csv::Error::from)) {
        eprintln!("CSV write error: {e}");
    }
}

fn write_rows<W: io::Write>(wtr: &mut csv::Writer<W>, rows: &[Value]) -> csv::Result<()> {
    let Some(Value::Object(first)) = rows.first() else {
        return Ok(());
    };
    let headers: Vec<&str> = first.keys().map(String::as_str).collect();
    wtr.write_record(&headers)?;

    for row in rows.iter().filter_map(Value::as_object) {
        let record: Vec<String> = headers
            .iter()
            .map(|h| row.get(*h).map(format_scalar).unwrap_or_default())
            .collect();
        wtr.write_record(&record)?;
    }
    Ok(())
}
