//! Semantic field types and the mapping to/from physical Postgres types.
//!
//! The abstract side is a closed enum, so an unrecognized abstract type
//! can only appear at deserialization time and is rejected there. The
//! physical side is open: anything Postgres reports that we do not
//! recognize maps to [`FieldType::Text`] rather than failing.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Semantic type of a user-declared field.
///
/// Serde accepts the legacy wire names (`String`, `Int`, `Number`,
/// `DateTime`) as aliases so existing clients keep working.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldType {
    #[serde(alias = "String")]
    Text,
    #[serde(alias = "Int")]
    Integer,
    #[serde(alias = "Number")]
    Float,
    Boolean,
    #[serde(alias = "DateTime")]
    Timestamp,
    Json,
}

impl FieldType {
    /// The Postgres column type for this field, with the NOT NULL
    /// constraint appended for required fields.
    pub fn postgres_type(&self, required: bool) -> String {
        let base = match self {
            FieldType::Text => "TEXT",
            FieldType::Integer => "INTEGER",
            FieldType::Float => "DOUBLE PRECISION",
            FieldType::Boolean => "BOOLEAN",
            FieldType::Timestamp => "TIMESTAMP",
            FieldType::Json => "JSONB",
        };
        if required {
            format!("{} NOT NULL", base)
        } else {
            base.to_string()
        }
    }

    /// Map an `information_schema.columns.data_type` string back to a
    /// semantic type. Unknown physical types map to `Text`.
    pub fn from_postgres(data_type: &str) -> FieldType {
        let dt = data_type.to_ascii_lowercase();
        match dt.as_str() {
            "text" | "character varying" | "varchar" | "character" | "char" => FieldType::Text,
            "integer" | "int" | "int4" | "bigint" | "int8" | "smallint" | "int2" => {
                FieldType::Integer
            }
            "double precision" | "float" | "float4" | "float8" | "real" | "numeric"
            | "decimal" => FieldType::Float,
            "boolean" | "bool" => FieldType::Boolean,
            "json" | "jsonb" => FieldType::Json,
            _ if dt.contains("timestamp") || dt == "date" || dt.starts_with("time") => {
                FieldType::Timestamp
            }
            _ => FieldType::Text,
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FieldType::Text => "Text",
            FieldType::Integer => "Integer",
            FieldType::Float => "Float",
            FieldType::Boolean => "Boolean",
            FieldType::Timestamp => "Timestamp",
            FieldType::Json => "Json",
        };
        write!(f, "{}", name)
    }
}
