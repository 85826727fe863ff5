//! The ingestion gateway.
//!
//! Validates a batch against the table's live field shape, hands every
//! accepted record to the configured sink, and reports per-record
//! outcomes. Rejected records never reach the sink; valid records in
//! the same batch are unaffected by their neighbors' failures.

use crate::error::IngestError;
use crate::sink::RecordSink;
use conveyor_core::{physical_table_name, validate_batch, TableDescriptor};
use conveyor_schema::{Catalog, Introspector};
use serde::Serialize;
use serde_json::{Map, Value};
use sqlx::PgPool;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

/// Why one record of a batch was rejected.
#[derive(Debug, Clone, Serialize)]
pub struct RecordFailure {
    /// Zero-based position in the submitted batch.
    pub index: usize,
    pub messages: Vec<String>,
}

/// Outcome of one ingestion batch.
#[derive(Debug, Clone, Serialize)]
pub struct IngestReport {
    /// Correlation id for this batch, also attached to log lines.
    pub batch_id: Uuid,
    pub table_id: i64,
    pub table_name: String,
    pub total: usize,
    pub accepted: usize,
    pub rejected: usize,
    pub errors: Vec<RecordFailure>,
}

/// Accepts record batches and forwards validated records to the sink.
#[derive(Clone)]
pub struct IngestionGateway {
    catalog: Catalog,
    introspector: Introspector,
    sink: Arc<dyn RecordSink>,
}

impl IngestionGateway {
    pub fn new(pool: PgPool, sink: Arc<dyn RecordSink>) -> Self {
        let catalog = Catalog::new(pool.clone());
        let introspector = Introspector::new(pool);
        Self {
            catalog,
            introspector,
            sink,
        }
    }

    /// Ingest a batch into `table` (logical name or alias).
    ///
    /// Validation failures and sink refusals are reported per record;
    /// the call as a whole only fails when the table itself cannot be
    /// resolved or introspected.
    pub async fn ingest(
        &self,
        table: &str,
        records: &[Map<String, Value>],
    ) -> Result<IngestReport, IngestError> {
        if records.is_empty() {
            return Err(IngestError::EmptyBatch);
        }

        let descriptor = self.resolve_active_table(table).await?;
        let physical = physical_table_name(&descriptor.name);

        let fields = self.introspector.table_fields(&physical).await?;
        if fields.is_empty() {
            return Err(IngestError::NoPhysicalColumns {
                table: descriptor.name.clone(),
            });
        }

        let batch_id = Uuid::new_v4();
        let mut failures: HashMap<usize, Vec<String>> = validate_batch(records, &fields)
            .into_iter()
            .map(|f| {
                let messages = f.errors.iter().map(|e| e.message.clone()).collect();
                (f.index, messages)
            })
            .collect();

        let mut accepted = 0usize;
        for (index, record) in records.iter().enumerate() {
            if failures.contains_key(&index) {
                continue;
            }
            match self.sink.send(&descriptor.name, record).await {
                Ok(()) => accepted += 1,
                Err(e) => {
                    tracing::warn!(
                        table = %descriptor.name,
                        %batch_id,
                        index,
                        error = %e,
                        "sink rejected record"
                    );
                    failures.entry(index).or_default().push(e.to_string());
                }
            }
        }

        let mut errors: Vec<RecordFailure> = failures
            .into_iter()
            .map(|(index, messages)| RecordFailure { index, messages })
            .collect();
        errors.sort_by_key(|f| f.index);

        let report = IngestReport {
            batch_id,
            table_id: descriptor.id,
            table_name: descriptor.name.clone(),
            total: records.len(),
            accepted,
            rejected: errors.len(),
            errors,
        };

        tracing::info!(
            table = %descriptor.name,
            %batch_id,
            total = report.total,
            accepted = report.accepted,
            rejected = report.rejected,
            "ingested batch"
        );

        Ok(report)
    }

    async fn resolve_active_table(&self, table: &str) -> Result<TableDescriptor, IngestError> {
        let descriptor = self
            .catalog
            .find_by_name_or_alias(table)
            .await?
            .ok_or_else(|| IngestError::TableNotFound {
                name: table.to_string(),
            })?;
        if !descriptor.is_active() {
            return Err(IngestError::TableInactive {
                name: table.to_string(),
            });
        }
        Ok(descriptor)
    }
}
