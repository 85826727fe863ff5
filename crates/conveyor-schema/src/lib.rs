//! # conveyor-schema
//!
//! Control plane for dynamic tables:
//!
//! - [`Catalog`]: the registry of logical tables (existence and
//!   display metadata only)
//! - [`Provisioner`]: DDL synthesis and execution for new tables
//! - [`Introspector`]: live field descriptors from the physical store
//! - [`bootstrap::ensure_registry`]: startup creation of the registry
//!
//! The invariant throughout: the physical store is the sole authority
//! on field shape. The catalog records that a table exists; what its
//! columns look like is always read fresh from `information_schema`.

pub mod bootstrap;
pub mod catalog;
pub mod ddl;
pub mod error;
pub mod introspect;
pub mod provision;

pub use catalog::Catalog;
pub use error::SchemaError;
pub use introspect::Introspector;
pub use provision::{ProvisionedTable, Provisioner, TableSpec};
