//! Heuristic sample-record generation for table detail views.
//!
//! Purely cosmetic: values are picked by field type plus a substring
//! match on the field name so the generated record looks plausible in
//! the UI. Nothing asserts on specific values, only that output is
//! non-empty and type-consistent.

use crate::descriptor::FieldDescriptor;
use crate::types::FieldType;
use serde_json::{json, Map, Value};

const TEXT_SAMPLES: &[(&str, &str)] = &[
    ("name", "John Doe"),
    ("email", "john.doe@example.com"),
    ("phone", "+1-555-123-4567"),
    ("address", "123 Main Street, New York, NY 10001"),
    ("url", "https://example.com"),
    ("image", "https://example.com/image.jpg"),
    ("code", "CODE001"),
    ("category", "General"),
    ("color", "#FF6B35"),
    ("status", "active"),
    ("priority", "high"),
    ("title", "Sample Title"),
    ("description", "This is a sample description for the field"),
    ("message", "This is a sample message"),
    ("content", "This is sample content for the field"),
    ("note", "This is a sample note"),
    ("comment", "This is a sample comment"),
    ("key", "sample_key_123"),
    ("value", "sample_value"),
];

const NUMBER_SAMPLES: &[(&str, f64)] = &[
    ("count", 100.0),
    ("price", 99.99),
    ("score", 4.5),
    ("rank", 1.0),
    ("order", 1.0),
    ("length", 100.0),
    ("width", 50.0),
    ("height", 30.0),
    ("weight", 1.5),
    ("rate", 0.85),
    ("id", 1.0),
];

fn lookup<T: Copy>(table: &[(&str, T)], field_name: &str) -> Option<T> {
    let lower = field_name.to_ascii_lowercase();
    table
        .iter()
        .find(|(keyword, _)| lower.contains(keyword))
        .map(|(_, sample)| *sample)
}

fn sample_value(field: &FieldDescriptor) -> Value {
    match field.field_type {
        FieldType::Text => {
            Value::String(lookup(TEXT_SAMPLES, &field.name).unwrap_or("Sample data").to_string())
        }
        FieldType::Integer => {
            let n = lookup(NUMBER_SAMPLES, &field.name).unwrap_or(42.0);
            json!(n as i64)
        }
        FieldType::Float => json!(lookup(NUMBER_SAMPLES, &field.name).unwrap_or(42.0)),
        FieldType::Boolean => {
            let lower = field.name.to_ascii_lowercase();
            json!(!lower.contains("deleted"))
        }
        FieldType::Timestamp => json!("2025-07-30T08:38:11.630Z"),
        FieldType::Json => {
            let lower = field.name.to_ascii_lowercase();
            if lower.contains("config") || lower.contains("setting") {
                json!({ "key": "value", "enabled": true })
            } else if lower.contains("meta") {
                json!({ "version": "1.0", "author": "system" })
            } else {
                json!({ "data": "example" })
            }
        }
    }
}

/// Build one example record for the given fields, in their order.
pub fn generate_sample_record(fields: &[FieldDescriptor]) -> Map<String, Value> {
    let mut record = Map::new();
    for field in fields {
        record.insert(field.name.clone(), sample_value(field));
    }
    record
}
