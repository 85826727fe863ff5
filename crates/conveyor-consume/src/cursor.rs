//! Durable per-(consumer, table) cursors.
//!
//! A cursor holds the highest sequence number already delivered to one
//! consumer of one table. Cursors are created lazily on first pull with
//! the sentinel value 0, below any BIGSERIAL-assigned sequence number.
//!
//! Methods come in pairs: pool-backed for standalone use, and
//! `*_on` variants taking any [`sqlx::PgExecutor`] so the consumption
//! engine can run them inside its delivery transaction. Inside a
//! transaction the get-or-create upsert takes the cursor's row lock,
//! which is what serializes concurrent pulls for the same pair.

use sqlx::postgres::PgRow;
use sqlx::{PgExecutor, PgPool, Row};

/// One consumer's position in one table. A fresh cursor holds 0,
/// below the minimum BIGSERIAL sequence number (1).
#[derive(Debug, Clone)]
pub struct Cursor {
    pub consumer: String,
    pub table_id: i64,
    pub table_name: String,
    /// Highest sequence number already delivered.
    pub cursor_id: i64,
}

/// Access to the `conveyor_cursors` registry table.
#[derive(Clone)]
pub struct CursorStore {
    pool: PgPool,
}

impl CursorStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Return the cursor for this (consumer, table) pair, creating it
    /// with the sentinel value on first access.
    pub async fn get_or_create(
        &self,
        consumer: &str,
        table_id: i64,
        table_name: &str,
    ) -> Result<Cursor, sqlx::Error> {
        Self::get_or_create_on(&self.pool, consumer, table_id, table_name).await
    }

    /// Unconditionally set the cursor to `sequence`. Callers pass only
    /// sequence numbers of just-delivered records; the store itself
    /// does not enforce monotonicity.
    pub async fn advance(
        &self,
        consumer: &str,
        table_id: i64,
        sequence: i64,
    ) -> Result<(), sqlx::Error> {
        Self::advance_on(&self.pool, consumer, table_id, sequence).await
    }

    /// Executor-generic get-or-create. A single upsert, so concurrent
    /// first access by the same pair is race-free: whichever insert
    /// wins, both callers read the identical sentinel row. Run inside
    /// a transaction this also locks the cursor row until commit.
    pub async fn get_or_create_on<'e>(
        executor: impl PgExecutor<'e>,
        consumer: &str,
        table_id: i64,
        table_name: &str,
    ) -> Result<Cursor, sqlx::Error> {
        let row: PgRow = sqlx::query(
            r#"
            INSERT INTO conveyor_cursors (consumer, table_id, table_name)
            VALUES ($1, $2, $3)
            ON CONFLICT (consumer, table_id)
            DO UPDATE SET updated_at = NOW()
            RETURNING consumer, table_id, table_name, cursor_id
            "#,
        )
        .bind(consumer)
        .bind(table_id)
        .bind(table_name)
        .fetch_one(executor)
        .await?;

        Ok(Cursor {
            consumer: row.try_get("consumer")?,
            table_id: row.try_get("table_id")?,
            table_name: row.try_get("table_name")?,
            cursor_id: row.try_get("cursor_id")?,
        })
    }

    /// Executor-generic advance.
    pub async fn advance_on<'e>(
        executor: impl PgExecutor<'e>,
        consumer: &str,
        table_id: i64,
        sequence: i64,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            UPDATE conveyor_cursors
            SET cursor_id = $1, updated_at = NOW()
            WHERE consumer = $2 AND table_id = $3
            "#,
        )
        .bind(sequence)
        .bind(consumer)
        .bind(table_id)
        .execute(executor)
        .await?;
        Ok(())
    }
}
