//! Record sinks.
//!
//! The gateway never writes rows itself; it hands validated records to
//! a [`RecordSink`] keyed by logical table name, and the sink owns
//! eventual persistence. Two backends ship here: a direct Postgres
//! insert for single-node deployments, and an in-memory buffer for
//! tests and dry wiring. A queue-backed sink plugs in by implementing
//! the same trait.

use crate::error::IngestError;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime};
use conveyor_core::{physical_table_name, FieldDescriptor, FieldType};
use conveyor_schema::Introspector;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sqlx::PgPool;
use std::sync::{Arc, RwLock};

/// Destination for validated records.
#[async_trait]
pub trait RecordSink: Send + Sync {
    /// Accept one record for the named logical table.
    async fn send(&self, table: &str, record: &Map<String, Value>) -> Result<(), IngestError>;
}

/// Which sink backend to use, from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SinkBackend {
    #[default]
    Direct,
    Memory,
}

/// Create a sink from configuration.
pub fn create_sink(backend: SinkBackend, pool: PgPool) -> Arc<dyn RecordSink> {
    match backend {
        SinkBackend::Direct => Arc::new(DirectSink::new(pool)),
        SinkBackend::Memory => Arc::new(MemorySink::default()),
    }
}

/// Inserts records straight into the physical table.
///
/// Introspects the live column types per call and coerces incoming
/// JSON values accordingly (string timestamps parsed, numeric strings
/// parsed, JSON bound as jsonb).
pub struct DirectSink {
    pool: PgPool,
    introspector: Introspector,
}

impl DirectSink {
    pub fn new(pool: PgPool) -> Self {
        let introspector = Introspector::new(pool.clone());
        Self { pool, introspector }
    }
}

#[async_trait]
impl RecordSink for DirectSink {
    async fn send(&self, table: &str, record: &Map<String, Value>) -> Result<(), IngestError> {
        let physical = physical_table_name(table);
        let fields = self.introspector.table_fields(&physical).await?;
        if fields.is_empty() {
            return Err(IngestError::NoPhysicalColumns {
                table: table.to_string(),
            });
        }

        // Insert only the fields present on the record; validation has
        // already rejected anything unknown.
        let present: Vec<&FieldDescriptor> = fields
            .iter()
            .filter(|f| record.contains_key(&f.name))
            .collect();
        if present.is_empty() {
            return Ok(());
        }

        let columns: Vec<String> = present.iter().map(|f| format!("\"{}\"", f.name)).collect();
        let placeholders: Vec<String> = present
            .iter()
            .enumerate()
            .map(|(i, _)| format!("${}", i + 1))
            .collect();
        let sql = format!(
            "INSERT INTO \"{}\" ({}) VALUES ({})",
            physical,
            columns.join(", "),
            placeholders.join(", ")
        );

        let mut query = sqlx::query(&sql);
        for field in &present {
            let value = &record[&field.name];
            query = match field.field_type {
                FieldType::Integer => query.bind(coerce_integer(value)),
                FieldType::Float => query.bind(coerce_float(value)),
                FieldType::Boolean => query.bind(coerce_boolean(value)),
                FieldType::Timestamp => query.bind(coerce_timestamp(value)),
                FieldType::Json => query.bind(coerce_json(value)),
                FieldType::Text => query.bind(coerce_text(value)),
            };
        }

        tracing::debug!(table, sql = %sql, "direct insert");
        query.execute(&self.pool).await?;
        Ok(())
    }
}

/// Buffers records in memory. For tests and dry wiring only.
#[derive(Default)]
pub struct MemorySink {
    records: RwLock<Vec<(String, Map<String, Value>)>>,
}

impl MemorySink {
    /// Snapshot of everything accepted so far.
    pub fn records(&self) -> Vec<(String, Map<String, Value>)> {
        self.records.read().map(|r| r.clone()).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.records.read().map(|r| r.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl RecordSink for MemorySink {
    async fn send(&self, table: &str, record: &Map<String, Value>) -> Result<(), IngestError> {
        self.records
            .write()
            .map_err(|e| IngestError::Sink(format!("memory sink poisoned: {}", e)))?
            .push((table.to_string(), record.clone()));
        Ok(())
    }
}

fn coerce_integer(value: &Value) -> Option<i32> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)).map(|v| v as i32),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn coerce_float(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn coerce_boolean(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::String(s) => match s.to_ascii_lowercase().as_str() {
            "true" | "1" => Some(true),
            "false" | "0" => Some(false),
            _ => None,
        },
        Value::Number(n) => n.as_i64().map(|v| v != 0),
        _ => None,
    }
}

fn coerce_timestamp(value: &Value) -> Option<NaiveDateTime> {
    let s = value.as_str()?;
    if let Ok(ts) = DateTime::parse_from_rfc3339(s) {
        return Some(ts.naive_utc());
    }
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").ok()
}

fn coerce_json(value: &Value) -> Option<Value> {
    match value {
        Value::Null => None,
        // A string holding JSON is unwrapped; anything else is stored
        // as the JSON value it already is.
        Value::String(s) => Some(serde_json::from_str(s).unwrap_or_else(|_| value.clone())),
        other => Some(other.clone()),
    }
}

fn coerce_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}
