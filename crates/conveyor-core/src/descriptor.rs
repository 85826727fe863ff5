//! Table and field descriptors.
//!
//! A [`TableDescriptor`] is a catalog row: it records that a logical
//! table exists and carries display metadata only. A
//! [`FieldDescriptor`] is a projection of a live physical column,
//! recomputed on every introspection; field shape is never cached.

use crate::types::FieldType;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Lifecycle status of a logical table. Tables are soft-disabled, never
/// physically deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TableStatus {
    Active,
    Inactive,
}

impl TableStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TableStatus::Active => "active",
            TableStatus::Inactive => "inactive",
        }
    }

    /// Parse a status string from the registry. Anything other than
    /// "active" is treated as inactive.
    pub fn from_str_lossy(s: &str) -> TableStatus {
        if s == "active" {
            TableStatus::Active
        } else {
            TableStatus::Inactive
        }
    }
}

/// A logical table as recorded in the schema catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableDescriptor {
    /// Catalog identifier.
    pub id: i64,
    /// Logical name, unique, identifier-safe.
    pub name: String,
    /// Display name.
    pub alias_name: String,
    /// Lifecycle status.
    pub status: TableStatus,
    /// Declared field count at provisioning time.
    pub field_count: i32,
    /// Informational record count, not authoritative.
    pub total_count: i64,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl TableDescriptor {
    pub fn is_active(&self) -> bool {
        self.status == TableStatus::Active
    }
}

/// A field as declared by the operator at provisioning time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldSpec {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A field as observed on the physical table.
///
/// Derived from `information_schema` on every read; the physical store
/// is the sole authority on field shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldDescriptor {
    /// Column name.
    pub name: String,
    /// Semantic type, mapped fail-open from the physical type.
    pub field_type: FieldType,
    /// Raw physical type string as reported by the store.
    pub physical_type: String,
    /// True when the column is NOT NULL.
    pub required: bool,
    /// True when the column has a default expression.
    pub has_default: bool,
    /// Physical ordinal position (1-based, as reported by the store).
    pub ordinal: i32,
}
