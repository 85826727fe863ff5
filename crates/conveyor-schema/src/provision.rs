//! Table provisioning: turn a validated table specification into a live
//! physical table plus a catalog row.
//!
//! All checks run before the first DDL statement executes, so a
//! rejected request leaves no partial schema. Multi-statement DDL is
//! not transactional in this design: a failure mid-sequence is
//! surfaced as [`SchemaError::DdlFailed`] and requires manual cleanup.

use crate::catalog::Catalog;
use crate::ddl;
use crate::error::SchemaError;
use crate::introspect::Introspector;
use conveyor_core::{physical_table_name, validate_table_spec, FieldSpec};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

/// Operator-supplied description of a new logical table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableSpec {
    /// Logical name, identifier-safe, unique.
    #[serde(rename = "tableName")]
    pub name: String,
    /// Display name.
    #[serde(rename = "tableAliasName")]
    pub alias_name: String,
    /// Declared fields, at least one.
    pub fields: Vec<FieldSpec>,
    /// Fields that together must be unique per row. Optional.
    #[serde(default, rename = "uniqueKeys")]
    pub unique_keys: Vec<String>,
}

/// Result of a successful provisioning run.
#[derive(Debug, Clone, Serialize)]
pub struct ProvisionedTable {
    pub table_id: i64,
    pub name: String,
    pub alias_name: String,
    pub field_count: i32,
    pub unique_keys: Vec<String>,
}

/// Synthesizes and executes DDL for new tables and registers them in
/// the catalog.
#[derive(Clone)]
pub struct Provisioner {
    pool: PgPool,
    catalog: Catalog,
    introspector: Introspector,
}

impl Provisioner {
    pub fn new(pool: PgPool) -> Self {
        let catalog = Catalog::new(pool.clone());
        let introspector = Introspector::new(pool.clone());
        Self {
            pool,
            catalog,
            introspector,
        }
    }

    /// Provision a new table.
    ///
    /// Order of operations: validate the spec, check for a physical
    /// name collision, execute DDL (table, trigger function, trigger,
    /// optional unique constraint), then insert the catalog row.
    pub async fn provision(&self, spec: &TableSpec) -> Result<ProvisionedTable, SchemaError> {
        validate_table_spec(&spec.name, &spec.fields, &spec.unique_keys)?;

        let physical = physical_table_name(&spec.name);
        if self.introspector.table_exists(&physical).await? {
            return Err(SchemaError::TableExists {
                name: spec.name.clone(),
            });
        }

        self.execute_ddl(&physical, &spec.fields, &spec.unique_keys)
            .await?;

        let alias = if spec.alias_name.is_empty() {
            spec.name.as_str()
        } else {
            spec.alias_name.as_str()
        };
        let descriptor = self
            .catalog
            .insert(&spec.name, alias, spec.fields.len() as i32)
            .await?;

        tracing::info!(
            table = %spec.name,
            physical = %physical,
            fields = spec.fields.len(),
            unique_keys = spec.unique_keys.len(),
            "provisioned table"
        );

        Ok(ProvisionedTable {
            table_id: descriptor.id,
            name: descriptor.name,
            alias_name: descriptor.alias_name,
            field_count: descriptor.field_count,
            unique_keys: spec.unique_keys.clone(),
        })
    }

    async fn execute_ddl(
        &self,
        physical: &str,
        fields: &[FieldSpec],
        unique_keys: &[String],
    ) -> Result<(), SchemaError> {
        let mut statements = vec![
            ddl::create_table_sql(physical, fields),
            ddl::update_trigger_function_sql().to_string(),
            ddl::create_trigger_sql(physical),
        ];
        if let Some(constraint) = ddl::unique_constraint_sql(physical, unique_keys) {
            statements.push(constraint);
        }

        for (i, sql) in statements.iter().enumerate() {
            tracing::debug!(table = %physical, statement = i, "executing DDL: {}", sql);
            if let Err(source) = sqlx::query(sql).execute(&self.pool).await {
                // The first statement failing leaves no schema behind;
                // anything later leaves a partially applied table.
                if i == 0 {
                    return Err(SchemaError::Database(source));
                }
                tracing::error!(
                    table = %physical,
                    statement = i,
                    error = %source,
                    "DDL failed after partial application; manual cleanup required"
                );
                return Err(SchemaError::DdlFailed {
                    table: physical.to_string(),
                    source,
                });
            }
        }
        Ok(())
    }
}
