//! Schema catalog access.
//!
//! The catalog (`conveyor_tables`) is the single source of truth for
//! which logical tables exist and their display metadata. It never
//! stores field shape; that is always re-derived from the physical
//! store by [`crate::introspect`].

use crate::error::SchemaError;
use conveyor_core::{TableDescriptor, TableStatus};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

/// Read/write access to the table registry.
#[derive(Clone)]
pub struct Catalog {
    pool: PgPool,
}

impl Catalog {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a freshly provisioned table and return its descriptor.
    pub async fn insert(
        &self,
        name: &str,
        alias_name: &str,
        field_count: i32,
    ) -> Result<TableDescriptor, SchemaError> {
        let row = sqlx::query(
            r#"
            INSERT INTO conveyor_tables (name, alias_name, status, field_count, total_count)
            VALUES ($1, $2, 'active', $3, 0)
            RETURNING id, name, alias_name, status, field_count, total_count, created_at, updated_at
            "#,
        )
        .bind(name)
        .bind(alias_name)
        .bind(field_count)
        .fetch_one(&self.pool)
        .await?;

        row_to_descriptor(&row)
    }

    /// Look up a table by catalog id.
    pub async fn find_by_id(&self, id: i64) -> Result<Option<TableDescriptor>, SchemaError> {
        let row = sqlx::query(
            r#"
            SELECT id, name, alias_name, status, field_count, total_count, created_at, updated_at
            FROM conveyor_tables
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| row_to_descriptor(&r)).transpose()
    }

    /// Look up a table by logical name or alias.
    pub async fn find_by_name_or_alias(
        &self,
        name: &str,
    ) -> Result<Option<TableDescriptor>, SchemaError> {
        let row = sqlx::query(
            r#"
            SELECT id, name, alias_name, status, field_count, total_count, created_at, updated_at
            FROM conveyor_tables
            WHERE name = $1 OR alias_name = $1
            LIMIT 1
            "#,
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| row_to_descriptor(&r)).transpose()
    }

    /// All registered tables, newest first.
    pub async fn list(&self) -> Result<Vec<TableDescriptor>, SchemaError> {
        let rows = sqlx::query(
            r#"
            SELECT id, name, alias_name, status, field_count, total_count, created_at, updated_at
            FROM conveyor_tables
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_descriptor).collect()
    }

    /// Active tables only, newest first. Used for downstream wiring
    /// (which tables may be consumed or targeted by triggers).
    pub async fn list_active(&self) -> Result<Vec<TableDescriptor>, SchemaError> {
        let rows = sqlx::query(
            r#"
            SELECT id, name, alias_name, status, field_count, total_count, created_at, updated_at
            FROM conveyor_tables
            WHERE status = 'active'
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_descriptor).collect()
    }

    /// Soft-enable or soft-disable a table. Rows are never deleted.
    pub async fn set_status(&self, id: i64, status: TableStatus) -> Result<(), SchemaError> {
        sqlx::query(
            "UPDATE conveyor_tables SET status = $1, updated_at = NOW() WHERE id = $2",
        )
        .bind(status.as_str())
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Bump the informational record count. Display-only; the physical
    /// table remains authoritative for actual row counts.
    pub async fn add_to_total(&self, id: i64, delta: i64) -> Result<(), SchemaError> {
        sqlx::query(
            "UPDATE conveyor_tables SET total_count = total_count + $1, updated_at = NOW() WHERE id = $2",
        )
        .bind(delta)
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

fn row_to_descriptor(row: &PgRow) -> Result<TableDescriptor, SchemaError> {
    let status: String = row.try_get("status")?;
    Ok(TableDescriptor {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        alias_name: row.try_get("alias_name")?,
        status: TableStatus::from_str_lossy(&status),
        field_count: row.try_get("field_count")?,
        total_count: row.try_get("total_count")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}
