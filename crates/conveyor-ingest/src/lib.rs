//! # conveyor-ingest
//!
//! Burst-friendly record ingestion, decoupled from persistence.
//!
//! The [`IngestionGateway`] validates whole batches against the live
//! field shape and hands accepted records to a [`RecordSink`]. Sinks
//! own eventual persistence; the bundled [`DirectSink`] inserts
//! immediately, while queue-backed deployments implement the trait
//! against their broker.

pub mod error;
pub mod gateway;
pub mod sink;

pub use error::IngestError;
pub use gateway::{IngestReport, IngestionGateway, RecordFailure};
pub use sink::{create_sink, DirectSink, MemorySink, RecordSink, SinkBackend};
