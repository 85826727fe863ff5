//! API request and response types.
//!
//! Wire names are camelCase to match the clients this service already
//! has. Internal types stay snake_case; the conversion lives here and
//! nowhere else.

use conveyor_core::{FieldDescriptor, TableDescriptor};
use conveyor_ingest::{IngestReport, RecordFailure};
use conveyor_schema::ProvisionedTable;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

// =============================================================================
// Table Management Types
// =============================================================================

/// Response for a successful table creation.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTableResponse {
    pub table_id: i64,
    pub table_name: String,
    pub table_alias_name: String,
    pub field_count: i32,
    pub unique_keys: Vec<String>,
}

impl From<ProvisionedTable> for CreateTableResponse {
    fn from(p: ProvisionedTable) -> Self {
        Self {
            table_id: p.table_id,
            table_name: p.name,
            table_alias_name: p.alias_name,
            field_count: p.field_count,
            unique_keys: p.unique_keys,
        }
    }
}

/// One row in the table listing.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TableListEntry {
    pub id: i64,
    pub name: String,
    pub alias_name: String,
    pub status: String,
    pub field_count: i32,
    pub total_count: i64,
    /// Whether consumers may currently pull from this table.
    pub can_consume: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl From<&TableDescriptor> for TableListEntry {
    fn from(t: &TableDescriptor) -> Self {
        Self {
            id: t.id,
            name: t.name.clone(),
            alias_name: t.alias_name.clone(),
            status: t.status.as_str().to_string(),
            field_count: t.field_count,
            total_count: t.total_count,
            can_consume: t.is_active(),
            created_at: t.created_at.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string(),
            updated_at: t.updated_at.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string(),
        }
    }
}

/// Query parameters for the table detail endpoint. Exactly one of
/// `tableId` / `tableName` is expected.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailQuery {
    pub table_id: Option<i64>,
    pub table_name: Option<String>,
}

/// One field in the table detail view, freshly introspected.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldView {
    /// Field name doubles as the stable identifier.
    pub id: String,
    pub name: String,
    pub field_type: String,
    /// Raw physical type string as the store reports it.
    pub original_type: String,
    pub required: bool,
    pub has_default: bool,
}

impl From<&FieldDescriptor> for FieldView {
    fn from(f: &FieldDescriptor) -> Self {
        Self {
            id: f.name.clone(),
            name: f.name.clone(),
            field_type: f.field_type.to_string(),
            original_type: f.physical_type.clone(),
            required: f.required,
            has_default: f.has_default,
        }
    }
}

/// Response for the table detail endpoint.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TableDetailResponse {
    pub table: TableListEntry,
    pub fields: Vec<FieldView>,
    pub unique_keys: Vec<String>,
    /// Heuristic sample record derived from field names and types.
    pub template_data: Map<String, Value>,
}

/// Compact entry in the active-table listing.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveTableEntry {
    pub id: i64,
    pub name: String,
    pub alias_name: String,
}

impl From<&TableDescriptor> for ActiveTableEntry {
    fn from(t: &TableDescriptor) -> Self {
        Self {
            id: t.id,
            name: t.name.clone(),
            alias_name: t.alias_name.clone(),
        }
    }
}

/// Response for the record-browsing endpoint.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TableDataResponse {
    pub table: TableListEntry,
    pub fields: Vec<FieldView>,
    pub unique_keys: Vec<String>,
    /// Most recent records, newest first.
    pub records: Vec<Map<String, Value>>,
    pub total: usize,
    pub limit: i64,
}

// =============================================================================
// Ingestion Types
// =============================================================================

/// Request body for a batch upload.
#[derive(Debug, Deserialize)]
pub struct UploadRequest {
    pub data: Vec<Map<String, Value>>,
}

/// Per-record rejection detail.
#[derive(Debug, Serialize)]
pub struct UploadFailure {
    pub index: usize,
    pub messages: Vec<String>,
}

impl From<RecordFailure> for UploadFailure {
    fn from(f: RecordFailure) -> Self {
        Self {
            index: f.index,
            messages: f.messages,
        }
    }
}

/// Response for a batch upload.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub batch_id: Uuid,
    pub table_id: i64,
    pub table_name: String,
    pub total: usize,
    pub accepted: usize,
    pub rejected: usize,
    pub errors: Vec<UploadFailure>,
}

impl From<IngestReport> for UploadResponse {
    fn from(r: IngestReport) -> Self {
        Self {
            batch_id: r.batch_id,
            table_id: r.table_id,
            table_name: r.table_name,
            total: r.total,
            accepted: r.accepted,
            rejected: r.rejected,
            errors: r.errors.into_iter().map(UploadFailure::from).collect(),
        }
    }
}

/// Response for the upload info endpoint (table plus raw column view).
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadInfoResponse {
    pub table: TableListEntry,
    pub fields: Vec<FieldView>,
}

// =============================================================================
// Consumption Types
// =============================================================================

/// Query parameters for the consume endpoint.
#[derive(Debug, Deserialize)]
pub struct ConsumeQuery {
    pub consumer: String,
    /// Comma-separated field subset; empty or absent means all fields.
    #[serde(default)]
    pub fields: String,
}

impl ConsumeQuery {
    /// Requested field names, trimmed, empties dropped.
    pub fn requested_fields(&self) -> Vec<String> {
        self.fields
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect()
    }
}

/// Response for a successful pull.
#[derive(Debug, Serialize)]
pub struct ConsumeResponse {
    pub consumer: String,
    /// Sequence number the consumer's cursor now rests on.
    pub sequence: i64,
    /// Single-element array; the contract delivers one record per pull.
    pub data: Vec<Map<String, Value>>,
}
