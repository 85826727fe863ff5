//! Error types for the ingest crate.

use conveyor_schema::SchemaError;
use thiserror::Error;

/// Errors that can occur while ingesting records.
#[derive(Debug, Error)]
pub enum IngestError {
    /// No logical table matches the given name or alias.
    #[error("table '{name}' not found")]
    TableNotFound { name: String },

    /// The table exists but has been soft-disabled.
    #[error("table '{name}' is not active")]
    TableInactive { name: String },

    /// An ingestion batch must contain at least one record.
    #[error("batch contains no records")]
    EmptyBatch,

    /// The catalog knows the table but introspection found no columns.
    #[error("table '{table}' has no physical columns; catalog and store are out of sync")]
    NoPhysicalColumns { table: String },

    /// The sink refused a record.
    #[error("sink error: {0}")]
    Sink(String),

    /// Catalog access failed.
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// Store-level error.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}
