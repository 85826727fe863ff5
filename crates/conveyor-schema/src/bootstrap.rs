//! Registry bootstrap.
//!
//! Creates the control-plane tables on startup if they are missing:
//! `conveyor_tables` (the schema catalog) and `conveyor_cursors`
//! (per-consumer positions, owned by the consume crate). Both use
//! `IF NOT EXISTS`, so running this on every startup is safe.

use sqlx::PgPool;

const REGISTRY_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS conveyor_tables (
  id BIGSERIAL PRIMARY KEY,
  name TEXT NOT NULL UNIQUE,
  alias_name TEXT NOT NULL,
  status TEXT NOT NULL DEFAULT 'active',
  field_count INTEGER NOT NULL DEFAULT 0,
  total_count BIGINT NOT NULL DEFAULT 0,
  created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
  updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
);

CREATE TABLE IF NOT EXISTS conveyor_cursors (
  id BIGSERIAL PRIMARY KEY,
  consumer TEXT NOT NULL,
  table_id BIGINT NOT NULL,
  table_name TEXT NOT NULL,
  cursor_id BIGINT NOT NULL DEFAULT 0,
  created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
  updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
  UNIQUE (consumer, table_id)
);
"#;

/// Ensure the registry tables exist.
pub async fn ensure_registry(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::raw_sql(REGISTRY_SQL).execute(pool).await?;
    tracing::debug!("registry tables ensured");
    Ok(())
}
