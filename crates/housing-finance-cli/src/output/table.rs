use serde_json::Value;
use tabled::{builder::Builder, Table};

/// Format output as tables using the tabled crate.
///
/// Loan reports and schedules nest sections (summary, schedule entries,
/// totals, indicators), so each nested object or array of rows gets its
/// own table under the scalar fields.
pub fn print_table(value: &Value) {
    match value {
        Value::Object(map) => {
            if let Some(result) = map.get("result") {
                print_sections(result);
                print_envelope_footer(map);
            } else {
                print_sections(value);
            }
        }
        Value::Array(arr) => {
            print_array_table(arr);
        }
        _ => {
            println!("{}", value);
        }
    }
}

/// Print an object as a Field/Value table of its scalar fields, followed
/// by one table per nested section.
fn print_sections(value: &Value) {
    let map = match value {
        Value::Object(map) => map,
        Value::Array(arr) => {
            print_array_table(arr);
            return;
        }
        _ => {
            println!("{}", value);
            return;
        }
    };

    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    let mut has_scalars = false;
    let mut sections: Vec<(&String, &Value)> = Vec::new();

    for (key, val) in map {
        match val {
            Value::Object(_) => sections.push((key, val)),
            Value::Array(arr) if arr.first().map_or(false, Value::is_object) => {
                sections.push((key, val))
            }
            _ => {
                builder.push_record([key.as_str(), &format_value(val)]);
                has_scalars = true;
            }
        }
    }

    if has_scalars {
        let table = Table::from(builder);
        println!("{}", table);
    }

    for (name, section) in sections {
        println!("\n{}:", name);
        match section {
            Value::Object(_) => print_flat_object(section),
            Value::Array(arr) => print_array_table(arr),
            _ => println!("{}", section),
        }
    }
}

fn print_envelope_footer(envelope: &serde_json::Map<String, Value>) {
    // Print warnings if any
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

    // Print methodology
    if let Some(Value::String(meth)) = envelope.get("methodology") {
        println!("\nMethodology: {}", meth);
    }
}

fn print_flat_object(value: &Value) {
    if let Value::Object(map) = value {
        let mut builder = Builder::default();
        builder.push_record(["Field", "Value"]);
        for (key, val) in map {
            builder.push_record([key.as_str(), &format_value(val)]);
        }
        let table = Table::from(builder);
        println!("{}", table);
    }
}

fn print_array_table(arr: &[Value]) {
    if arr.is_empty() {
        println!("(empty)");
        return;
    }

    // Collect all keys from first object for headers
    if let Some(Value::Object(first)) = arr.first() {
        let headers: Vec<String> = first.keys().cloned().collect();
        let mut builder = Builder::default();
        builder.push_record(&headers);

        for item in arr {
            if let Value::Object(map) = item {
                let row: Vec<String> = headers
                    .iter()
                    .map(|h| {
                        map.get(h.as_str())
                            .map(|v| format_value(v))
                            .unwrap_or_default()
                    })
                    .collect();
                builder.push_record(row);
            }
        }

        let table = Table::from(builder);
        println!("{}", table);
    } else {
        // Simple array of values
        for item in arr {
            println!("{}", format_value(item));
        }
    }
}

fn format_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        Value::Array(arr) => {
            let items: Vec<String> = arr.iter().map(|v| format_value(v)).collect();
            items.join(", ")
        }
        Value::Object(_) => serde_json::to_string(value).unwrap_or_default(),
    }
}
