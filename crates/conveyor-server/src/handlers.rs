//! Request handlers.
//!
//! Successful responses use the `{ "success": true, "data": ... }`
//! envelope; failures go through [`ApiError`].

use crate::api_types::*;
use crate::error::ApiError;
use crate::state::AppState;
use axum::{
    extract::{Path, Query, State},
    Json,
};
use conveyor_core::{generate_sample_record, physical_table_name, TableDescriptor};
use conveyor_schema::{SchemaError, TableSpec};
use serde::Serialize;
use serde_json::{json, Value};

fn ok<T: Serialize>(data: T) -> Json<Value> {
    Json(json!({ "success": true, "data": data }))
}

// =============================================================================
// Table Management
// =============================================================================

/// `POST /api/v1/tables/create`
pub async fn create_table(
    State(state): State<AppState>,
    Json(spec): Json<TableSpec>,
) -> Result<Json<Value>, ApiError> {
    let provisioned = state.provisioner.provision(&spec).await?;
    Ok(ok(CreateTableResponse::from(provisioned)))
}

/// `GET /api/v1/tables/list`
pub async fn list_tables(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let tables = state.catalog.list().await?;
    let entries: Vec<TableListEntry> = tables.iter().map(TableListEntry::from).collect();
    Ok(ok(entries))
}

/// `GET /api/v1/tables/detail?tableId=` or `?tableName=`
pub async fn table_detail(
    State(state): State<AppState>,
    Query(query): Query<DetailQuery>,
) -> Result<Json<Value>, ApiError> {
    let descriptor = match (query.table_id, query.table_name.as_deref()) {
        (Some(id), _) => state.catalog.find_by_id(id).await?.ok_or_else(|| {
            ApiError::NotFound(format!("table with id {} not found", id))
        })?,
        (None, Some(name)) => resolve_table(&state, name).await?,
        (None, None) => {
            return Err(ApiError::BadRequest(
                "either tableId or tableName is required".to_string(),
            ));
        }
    };

    let physical = physical_table_name(&descriptor.name);
    let fields = state.introspector.table_fields(&physical).await?;
    if fields.is_empty() {
        return Err(SchemaError::NoPhysicalColumns {
            table: descriptor.name.clone(),
        }
        .into());
    }
    let unique_keys = state.introspector.unique_constraint_fields(&physical).await?;
    let template_data = generate_sample_record(&fields);

    Ok(ok(TableDetailResponse {
        table: TableListEntry::from(&descriptor),
        fields: fields.iter().map(FieldView::from).collect(),
        unique_keys,
        template_data,
    }))
}

/// `GET /api/v1/tables/data?tableId=` or `?tableName=`
///
/// Browsing view: the latest records alongside the live field shape.
/// Cursors are not involved; nothing here counts as a delivery.
pub async fn table_data(
    State(state): State<AppState>,
    Query(query): Query<DetailQuery>,
) -> Result<Json<Value>, ApiError> {
    const BROWSE_LIMIT: i64 = 100;

    let descriptor = match (query.table_id, query.table_name.as_deref()) {
        (Some(id), _) => state.catalog.find_by_id(id).await?.ok_or_else(|| {
            ApiError::NotFound(format!("table with id {} not found", id))
        })?,
        (None, Some(name)) => resolve_table(&state, name).await?,
        (None, None) => {
            return Err(ApiError::BadRequest(
                "either tableId or tableName is required".to_string(),
            ));
        }
    };

    let physical = physical_table_name(&descriptor.name);
    let fields = state.introspector.table_fields(&physical).await?;
    if fields.is_empty() {
        return Err(SchemaError::NoPhysicalColumns {
            table: descriptor.name.clone(),
        }
        .into());
    }
    let unique_keys = state.introspector.unique_constraint_fields(&physical).await?;
    let records = state
        .engine
        .recent_records(&descriptor.name, BROWSE_LIMIT)
        .await?;

    Ok(ok(TableDataResponse {
        table: TableListEntry::from(&descriptor),
        fields: fields.iter().map(FieldView::from).collect(),
        unique_keys,
        total: records.len(),
        records,
        limit: BROWSE_LIMIT,
    }))
}

/// `GET /api/v1/tables/active`
pub async fn active_tables(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let tables = state.catalog.list_active().await?;
    let entries: Vec<ActiveTableEntry> = tables.iter().map(ActiveTableEntry::from).collect();
    Ok(ok(entries))
}

// =============================================================================
// Ingestion
// =============================================================================

/// `POST /api/v1/upload/{table}`
pub async fn upload(
    State(state): State<AppState>,
    Path(table): Path<String>,
    Json(request): Json<UploadRequest>,
) -> Result<Json<Value>, ApiError> {
    let report = state.gateway.ingest(&table, &request.data).await?;
    if report.accepted > 0 {
        // Informational count only; the physical table stays
        // authoritative.
        state
            .catalog
            .add_to_total(report.table_id, report.accepted as i64)
            .await?;
    }
    Ok(ok(UploadResponse::from(report)))
}

/// `GET /api/v1/upload/{table}`
///
/// Table plus raw column view, for clients preparing a batch.
pub async fn upload_info(
    State(state): State<AppState>,
    Path(table): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let descriptor = resolve_table(&state, &table).await?;
    let physical = physical_table_name(&descriptor.name);
    let fields = state.introspector.table_fields(&physical).await?;

    Ok(ok(UploadInfoResponse {
        table: TableListEntry::from(&descriptor),
        fields: fields.iter().map(FieldView::from).collect(),
    }))
}

// =============================================================================
// Consumption
// =============================================================================

/// `GET /api/v1/consume/{table}?consumer=...&fields=a,b`
pub async fn consume(
    State(state): State<AppState>,
    Path(table): Path<String>,
    Query(query): Query<ConsumeQuery>,
) -> Result<Json<Value>, ApiError> {
    if query.consumer.trim().is_empty() {
        return Err(ApiError::BadRequest(
            "consumer query parameter is required".to_string(),
        ));
    }

    let requested = query.requested_fields();
    let delivered = state
        .engine
        .pull_next(&table, query.consumer.trim(), &requested)
        .await?;

    Ok(ok(ConsumeResponse {
        consumer: delivered.consumer,
        sequence: delivered.sequence,
        data: vec![delivered.record],
    }))
}

// =============================================================================
// Helpers
// =============================================================================

async fn resolve_table(state: &AppState, name: &str) -> Result<TableDescriptor, ApiError> {
    state
        .catalog
        .find_by_name_or_alias(name)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("table '{}' not found", name)))
}
