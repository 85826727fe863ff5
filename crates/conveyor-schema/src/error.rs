//! Error types for the schema crate.

use conveyor_core::ValidationError;
use thiserror::Error;

/// Errors that can occur while provisioning or inspecting tables.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// The table specification failed validation before any DDL ran.
    #[error("{0}")]
    Validation(#[from] ValidationError),

    /// A physical table with the derived name already exists.
    #[error("table '{name}' already exists")]
    TableExists { name: String },

    /// No catalog row matches the given name, alias, or id.
    #[error("table '{name}' not found")]
    TableNotFound { name: String },

    /// The catalog knows the table but the physical store has no
    /// columns for it. Administrative repair required.
    #[error("table '{table}' has no physical columns; catalog and store are out of sync")]
    NoPhysicalColumns { table: String },

    /// DDL failed after execution started. The physical schema may be
    /// partially applied; there is no automatic rollback.
    #[error(
        "DDL failed while provisioning '{table}'; schema may be partially applied and requires manual cleanup: {source}"
    )]
    DdlFailed {
        table: String,
        #[source]
        source: sqlx::Error,
    },

    /// Store-level error (connection, query execution).
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}
