//! The consumption engine: deliver the oldest unseen record to a named
//! consumer and advance its cursor, atomically.
//!
//! Steps 4-7 of a pull (cursor resolution, row fetch, cursor advance)
//! run in one Postgres transaction with the cursor row locked by the
//! get-or-create upsert. Two concurrent pulls for the same (consumer,
//! table) pair therefore serialize on the row lock instead of both
//! reading the same "next" row. A pull abandoned before commit rolls
//! back and delivers nothing; there is no replay of committed
//! deliveries.

use crate::cursor::CursorStore;
use crate::error::ConsumeError;
use conveyor_core::{
    physical_table_name, validate_requested_fields, FieldDescriptor, FieldType, TableDescriptor,
};
use conveyor_schema::{Catalog, Introspector};
use serde_json::{Map, Value};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

/// One delivered record, projected to the requested fields.
#[derive(Debug, Clone)]
pub struct DeliveredRecord {
    pub consumer: String,
    /// Sequence number the consumer's cursor now rests on.
    pub sequence: i64,
    pub record: Map<String, Value>,
}

/// Orchestrates catalog lookup, introspection, validation, cursor
/// state, and the physical row fetch.
#[derive(Clone)]
pub struct ConsumptionEngine {
    pool: PgPool,
    catalog: Catalog,
    introspector: Introspector,
}

impl ConsumptionEngine {
    pub fn new(pool: PgPool) -> Self {
        let catalog = Catalog::new(pool.clone());
        let introspector = Introspector::new(pool.clone());
        Self {
            pool,
            catalog,
            introspector,
        }
    }

    /// Pull the next unseen record for `consumer` from `table` (logical
    /// name or alias).
    ///
    /// `requested_fields` projects the result; an empty list means all
    /// declared fields in physical ordinal order. Delivery is
    /// at-most-once: once the cursor advances past a sequence number
    /// there is no way to see it again.
    pub async fn pull_next(
        &self,
        table: &str,
        consumer: &str,
        requested_fields: &[String],
    ) -> Result<DeliveredRecord, ConsumeError> {
        let descriptor = self.resolve_active_table(table).await?;
        let physical = physical_table_name(&descriptor.name);

        let fields = self.introspector.table_fields(&physical).await?;
        if fields.is_empty() {
            return Err(ConsumeError::NoPhysicalColumns {
                table: descriptor.name.clone(),
            });
        }

        validate_requested_fields(requested_fields, &fields)?;

        let mut tx = self.pool.begin().await?;

        let cursor =
            CursorStore::get_or_create_on(&mut *tx, consumer, descriptor.id, &descriptor.name)
                .await?;

        let fetch_sql = format!(
            "SELECT * FROM \"{}\" WHERE id > $1 ORDER BY id ASC LIMIT 1",
            physical
        );
        let row = sqlx::query(&fetch_sql)
            .bind(cursor.cursor_id)
            .fetch_optional(&mut *tx)
            .await?;

        let Some(row) = row else {
            // Commit so a lazily created cursor row survives the
            // empty pull.
            tx.commit().await?;
            tracing::debug!(table = %descriptor.name, consumer, "no new data");
            return Err(ConsumeError::NoNewData {
                consumer: consumer.to_string(),
            });
        };

        let sequence: i64 = row.try_get("id")?;
        CursorStore::advance_on(&mut *tx, consumer, descriptor.id, sequence).await?;
        tx.commit().await?;

        let projection = ordered_projection(&fields, requested_fields);
        let record = project_row(&row, &projection);

        tracing::debug!(
            table = %descriptor.name,
            consumer,
            sequence,
            "delivered record"
        );

        Ok(DeliveredRecord {
            consumer: consumer.to_string(),
            sequence,
            record,
        })
    }

    /// Most recent records in the table, newest first, projected to
    /// the declared fields in physical ordinal order. Read-only:
    /// cursors are neither consulted nor moved.
    pub async fn recent_records(
        &self,
        table: &str,
        limit: i64,
    ) -> Result<Vec<Map<String, Value>>, ConsumeError> {
        let descriptor = self.resolve_active_table(table).await?;
        let physical = physical_table_name(&descriptor.name);

        let fields = self.introspector.table_fields(&physical).await?;
        if fields.is_empty() {
            return Err(ConsumeError::NoPhysicalColumns {
                table: descriptor.name.clone(),
            });
        }

        let sql = format!(
            "SELECT * FROM \"{}\" ORDER BY id DESC LIMIT $1",
            physical
        );
        let rows = sqlx::query(&sql)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        let projection = ordered_projection(&fields, &[]);
        Ok(rows.iter().map(|row| project_row(row, &projection)).collect())
    }

    async fn resolve_active_table(&self, table: &str) -> Result<TableDescriptor, ConsumeError> {
        let descriptor = self
            .catalog
            .find_by_name_or_alias(table)
            .await?
            .ok_or_else(|| ConsumeError::TableNotFound {
                name: table.to_string(),
            })?;
        if !descriptor.is_active() {
            return Err(ConsumeError::TableInactive {
                name: table.to_string(),
            });
        }
        Ok(descriptor)
    }
}

/// Order the fields to deliver: the requested order for an explicit
/// subset, physical ordinal order for the empty sentinel.
fn ordered_projection<'a>(
    fields: &'a [FieldDescriptor],
    requested: &[String],
) -> Vec<&'a FieldDescriptor> {
    if requested.is_empty() {
        fields.iter().collect()
    } else {
        requested
            .iter()
            .filter_map(|name| fields.iter().find(|f| &f.name == name))
            .collect()
    }
}

fn project_row(row: &PgRow, projection: &[&FieldDescriptor]) -> Map<String, Value> {
    let mut record = Map::new();
    for field in projection {
        record.insert(field.name.clone(), column_value(row, field));
    }
    record
}

/// Extract one column as JSON, directed by the field's semantic type.
/// Decode failures fall open to null rather than failing the delivery;
/// the physical store may hold types outside the provisioned set.
fn column_value(row: &PgRow, field: &FieldDescriptor) -> Value {
    let name = field.name.as_str();
    match field.field_type {
        FieldType::Integer => {
            if let Ok(v) = row.try_get::<Option<i32>, _>(name) {
                return v.map(Value::from).unwrap_or(Value::Null);
            }
            if let Ok(v) = row.try_get::<Option<i64>, _>(name) {
                return v.map(Value::from).unwrap_or(Value::Null);
            }
            decode_fallback(row, name)
        }
        FieldType::Float => {
            if let Ok(v) = row.try_get::<Option<f64>, _>(name) {
                return v.map(Value::from).unwrap_or(Value::Null);
            }
            if let Ok(v) = row.try_get::<Option<f32>, _>(name) {
                return v.map(|f| Value::from(f as f64)).unwrap_or(Value::Null);
            }
            decode_fallback(row, name)
        }
        FieldType::Boolean => {
            if let Ok(v) = row.try_get::<Option<bool>, _>(name) {
                return v.map(Value::from).unwrap_or(Value::Null);
            }
            decode_fallback(row, name)
        }
        FieldType::Timestamp => {
            if let Ok(v) = row.try_get::<Option<chrono::NaiveDateTime>, _>(name) {
                return v
                    .map(|ts| serde_json::json!(ts))
                    .unwrap_or(Value::Null);
            }
            if let Ok(v) = row.try_get::<Option<chrono::DateTime<chrono::Utc>>, _>(name) {
                return v.map(|ts| serde_json::json!(ts)).unwrap_or(Value::Null);
            }
            decode_fallback(row, name)
        }
        FieldType::Json => {
            if let Ok(v) = row.try_get::<Option<Value>, _>(name) {
                return v.unwrap_or(Value::Null);
            }
            decode_fallback(row, name)
        }
        FieldType::Text => decode_fallback(row, name),
    }
}

/// Forgiving extraction used for Text fields and as the last resort for
/// anything whose physical type does not match its semantic type.
fn decode_fallback(row: &PgRow, name: &str) -> Value {
    if let Ok(v) = row.try_get::<Option<String>, _>(name) {
        return v.map(Value::from).unwrap_or(Value::Null);
    }
    if let Ok(v) = row.try_get::<Option<i64>, _>(name) {
        return v.map(Value::from).unwrap_or(Value::Null);
    }
    if let Ok(v) = row.try_get::<Option<f64>, _>(name) {
        return v.map(Value::from).unwrap_or(Value::Null);
    }
    if let Ok(v) = row.try_get::<Option<bool>, _>(name) {
        return v.map(Value::from).unwrap_or(Value::Null);
    }
    if let Ok(v) = row.try_get::<Option<Value>, _>(name) {
        return v.unwrap_or(Value::Null);
    }
    tracing::debug!(column = name, "could not decode column value, returning null");
    Value::Null
}
