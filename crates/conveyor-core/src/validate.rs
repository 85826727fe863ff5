//! Record and schema validation.
//!
//! Validation never touches the store: callers pass in the current
//! [`FieldDescriptor`]s (from introspection) and get typed errors back.
//! Batch validation collects every violation instead of stopping at the
//! first, so a caller can report all problems in one round trip.

use crate::descriptor::{FieldDescriptor, FieldSpec};
use crate::ident::is_valid_identifier;
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::fmt;

/// A single validation failure with a machine-readable kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub kind: ValidationErrorKind,
    pub message: String,
}

impl ValidationError {
    pub fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn invalid_table_name(name: &str) -> Self {
        Self::new(
            ValidationErrorKind::InvalidTableName,
            format!(
                "table name '{}' is invalid: must start with a letter or underscore and contain only letters, digits, and underscores",
                name
            ),
        )
    }

    pub fn invalid_field_name(name: &str) -> Self {
        Self::new(
            ValidationErrorKind::InvalidFieldName,
            format!("field name '{}' is not a valid identifier", name),
        )
    }

    pub fn empty_field_list() -> Self {
        Self::new(
            ValidationErrorKind::EmptyFieldList,
            "at least one field must be declared",
        )
    }

    pub fn duplicate_field(name: &str) -> Self {
        Self::new(
            ValidationErrorKind::DuplicateField,
            format!("field name '{}' is declared more than once", name),
        )
    }

    pub fn unknown_unique_key_field(name: &str) -> Self {
        Self::new(
            ValidationErrorKind::UnknownUniqueKeyField,
            format!("unique key field '{}' is not in the declared field list", name),
        )
    }

    pub fn unknown_fields(fields: &[String]) -> Self {
        Self::new(
            ValidationErrorKind::UnknownField,
            format!("unknown fields: {}", fields.join(", ")),
        )
    }

    pub fn required_fields_missing(fields: &[String]) -> Self {
        Self::new(
            ValidationErrorKind::RequiredFieldMissing,
            format!("missing required fields: {}", fields.join(", ")),
        )
    }

    pub fn unknown_requested_fields(fields: &[String]) -> Self {
        Self::new(
            ValidationErrorKind::UnknownRequestedField,
            format!("requested fields do not exist: {}", fields.join(", ")),
        )
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ValidationError {}

/// Categories of validation failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// Table name violates the identifier pattern.
    InvalidTableName,
    /// Field name violates the identifier pattern.
    InvalidFieldName,
    /// A table must declare at least one field.
    EmptyFieldList,
    /// Field name declared more than once.
    DuplicateField,
    /// Unique-key field not present in the declared field list.
    UnknownUniqueKeyField,
    /// Ingested record carries a field the table does not have.
    UnknownField,
    /// Ingested record is missing a required field without a default.
    RequiredFieldMissing,
    /// Consumer requested a field the table does not have.
    UnknownRequestedField,
}

/// All violations found in one record of an ingestion batch.
#[derive(Debug, Clone)]
pub struct RecordError {
    /// Zero-based position of the record in the batch.
    pub index: usize,
    pub errors: Vec<ValidationError>,
}

/// Validate a table specification before any DDL runs.
///
/// Checks the logical name, the field list (non-empty, valid and unique
/// names), and that every unique-key field is declared.
pub fn validate_table_spec(
    name: &str,
    fields: &[FieldSpec],
    unique_keys: &[String],
) -> Result<(), ValidationError> {
    if !is_valid_identifier(name) {
        return Err(ValidationError::invalid_table_name(name));
    }
    if fields.is_empty() {
        return Err(ValidationError::empty_field_list());
    }

    let mut seen = HashSet::new();
    for field in fields {
        if !is_valid_identifier(&field.name) {
            return Err(ValidationError::invalid_field_name(&field.name));
        }
        if !seen.insert(field.name.as_str()) {
            return Err(ValidationError::duplicate_field(&field.name));
        }
    }

    for key in unique_keys {
        if !seen.contains(key.as_str()) {
            return Err(ValidationError::unknown_unique_key_field(key));
        }
    }

    Ok(())
}

/// Ingestion-mode validation over a whole batch.
///
/// Every record is checked for unknown fields and for missing required
/// fields (required = NOT NULL without a default). Violations are
/// collected per record; valid records in the same batch are unaffected.
pub fn validate_batch(
    records: &[Map<String, Value>],
    fields: &[FieldDescriptor],
) -> Vec<RecordError> {
    let known: HashSet<&str> = fields.iter().map(|f| f.name.as_str()).collect();
    let required: Vec<&str> = fields
        .iter()
        .filter(|f| f.required && !f.has_default)
        .map(|f| f.name.as_str())
        .collect();

    let mut failures = Vec::new();
    for (index, record) in records.iter().enumerate() {
        let mut errors = Vec::new();

        let unknown: Vec<String> = record
            .keys()
            .filter(|k| !known.contains(k.as_str()))
            .cloned()
            .collect();
        if !unknown.is_empty() {
            errors.push(ValidationError::unknown_fields(&unknown));
        }

        let missing: Vec<String> = required
            .iter()
            .filter(|name| !record.contains_key(**name))
            .map(|name| name.to_string())
            .collect();
        if !missing.is_empty() {
            errors.push(ValidationError::required_fields_missing(&missing));
        }

        if !errors.is_empty() {
            failures.push(RecordError { index, errors });
        }
    }
    failures
}

/// Consumption-mode validation of a requested field list.
///
/// An empty request is the valid "all fields, physical order" sentinel.
pub fn validate_requested_fields(
    requested: &[String],
    fields: &[FieldDescriptor],
) -> Result<(), ValidationError> {
    if requested.is_empty() {
        return Ok(());
    }
    let known: HashSet<&str> = fields.iter().map(|f| f.name.as_str()).collect();
    let invalid: Vec<String> = requested
        .iter()
        .filter(|f| !known.contains(f.as_str()))
        .cloned()
        .collect();
    if invalid.is_empty() {
        Ok(())
    } else {
        Err(ValidationError::unknown_requested_fields(&invalid))
    }
}
