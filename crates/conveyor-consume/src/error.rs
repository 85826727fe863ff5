//! Error types for the consume crate.

use conveyor_core::ValidationError;
use conveyor_schema::SchemaError;
use thiserror::Error;

/// Errors that can occur while pulling records.
#[derive(Debug, Error)]
pub enum ConsumeError {
    /// No logical table matches the given name or alias.
    #[error("table '{name}' not found")]
    TableNotFound { name: String },

    /// The table exists but has been soft-disabled.
    #[error("table '{name}' is not active")]
    TableInactive { name: String },

    /// No record with a sequence number beyond this consumer's cursor.
    /// Expected and frequent; callers poll on it. Not a failure.
    #[error("no new data for consumer '{consumer}'")]
    NoNewData { consumer: String },

    /// The requested field list failed validation.
    #[error("{0}")]
    Validation(#[from] ValidationError),

    /// The catalog knows the table but introspection found no columns.
    /// Administrative repair required.
    #[error("table '{table}' has no physical columns; catalog and store are out of sync")]
    NoPhysicalColumns { table: String },

    /// Catalog access failed.
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// Store-level error.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}
