use serde_json::Value;

use super::{format_scalar, result_of};

/// Headline figure of each command, in priority order.
const PRIORITY_KEYS: [&str; 7] = [
    "monthly_payment",
    "monthly_installment",
    "new_installment",
    "estimated_capacity",
    "decision",
    "state",
    "amortization",
];

/// Print just the key answer value from the output.
pub fn print_minimal(value: &Value) {
    let result = result_of(value);

    if let Value::Object(map) = result {
        for key in PRIORITY_KEYS {
            match map.get(key) {
                Some(Value::Object(inner)) => {
                    if let Some(pmt) = inner.get("monthly_payment") {
                        println!("{}", format_scalar(pmt));
                        return;
                    }
                }
                Some(val) if !val.is_null() => {
                    println!("{}", format_scalar(val));
                    return;
                }
                _ => {}
            }
        }

        if let Some((key, val)) = map.iter().next() {
            println!("{}: {}", key, format_scalar(val));
            return;
        }
    }

    if let Value::Array(rows) = result {
        println!("{} rows", rows.len());
        return;
    }
    println!("{}", format_scalar(result));
}
