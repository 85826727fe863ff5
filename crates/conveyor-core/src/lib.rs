//! # conveyor-core
//!
//! Pure types and logic shared across the Conveyor crates:
//!
//! - Semantic field types and the abstract ↔ Postgres type mapping
//! - Identifier rules and physical-name derivation
//! - Table and field descriptors
//! - Record validation (ingestion and consumption modes)
//! - Heuristic sample-record generation
//!
//! Nothing in this crate performs I/O; the store-facing crates
//! (`conveyor-schema`, `conveyor-consume`, `conveyor-ingest`) build on
//! these types.

pub mod descriptor;
pub mod ident;
pub mod sample;
pub mod types;
pub mod validate;

pub use descriptor::{FieldDescriptor, FieldSpec, TableDescriptor, TableStatus};
pub use ident::{is_valid_identifier, physical_table_name, PHYSICAL_PREFIX};
pub use sample::generate_sample_record;
pub use types::FieldType;
pub use validate::{
    validate_batch, validate_requested_fields, validate_table_spec, RecordError, ValidationError,
    ValidationErrorKind,
};
