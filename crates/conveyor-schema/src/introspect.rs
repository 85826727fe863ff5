//! Live schema introspection.
//!
//! Field descriptors are a projection of the physical store, recomputed
//! on every call. There is no cache and therefore no invalidation: the
//! small per-call cost buys the invariant that the catalog can never
//! drift from physical reality.

use crate::ddl::HIDDEN_COLUMNS;
use conveyor_core::{FieldDescriptor, FieldType};
use sqlx::{PgPool, Row};

/// Reads live column definitions for user data tables.
#[derive(Clone)]
pub struct Introspector {
    pool: PgPool,
}

impl Introspector {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Field descriptors for a physical table, in ordinal order,
    /// excluding the surrogate key and bookkeeping timestamp columns.
    ///
    /// An empty result means the physical table does not exist: a
    /// provisioned table always has at least one user column.
    pub async fn table_fields(
        &self,
        physical_name: &str,
    ) -> Result<Vec<FieldDescriptor>, sqlx::Error> {
        let rows = sqlx::query(
            r#"
            SELECT column_name, data_type, is_nullable, column_default, ordinal_position
            FROM information_schema.columns
            WHERE table_schema = 'public'
              AND table_name = $1
            ORDER BY ordinal_position
            "#,
        )
        .bind(physical_name)
        .fetch_all(&self.pool)
        .await?;

        let mut fields = Vec::new();
        for row in rows {
            let name: String = row.try_get("column_name")?;
            if HIDDEN_COLUMNS.contains(&name.as_str()) {
                continue;
            }
            let data_type: String = row.try_get("data_type")?;
            let is_nullable: String = row.try_get("is_nullable")?;
            let column_default: Option<String> = row.try_get("column_default")?;
            let ordinal: i32 = row.try_get("ordinal_position")?;

            fields.push(FieldDescriptor {
                name,
                field_type: FieldType::from_postgres(&data_type),
                physical_type: data_type,
                required: is_nullable == "NO",
                has_default: column_default.is_some(),
                ordinal,
            });
        }
        Ok(fields)
    }

    /// Field names covered by declared UNIQUE constraints on a physical
    /// table, in constraint ordinal order. The surrogate primary key is
    /// not included (it is a PRIMARY KEY constraint, not UNIQUE).
    pub async fn unique_constraint_fields(
        &self,
        physical_name: &str,
    ) -> Result<Vec<String>, sqlx::Error> {
        let rows = sqlx::query(
            r#"
            SELECT kcu.column_name
            FROM information_schema.table_constraints tc
            JOIN information_schema.key_column_usage kcu
              ON tc.constraint_name = kcu.constraint_name
             AND tc.table_schema = kcu.table_schema
            WHERE tc.constraint_type = 'UNIQUE'
              AND tc.table_schema = 'public'
              AND tc.table_name = $1
            ORDER BY tc.constraint_name, kcu.ordinal_position
            "#,
        )
        .bind(physical_name)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|r| r.try_get::<String, _>("column_name"))
            .collect()
    }

    /// Whether a physical table with this name exists.
    pub async fn table_exists(&self, physical_name: &str) -> Result<bool, sqlx::Error> {
        let row = sqlx::query(
            r#"
            SELECT table_name
            FROM information_schema.tables
            WHERE table_schema = 'public'
              AND table_name = $1
            "#,
        )
        .bind(physical_name)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.is_some())
    }
}
